use crate::common::{Binder, Name};

/// A parsed program: a sequence of top-level commands.
#[derive(Debug, Clone)]
pub struct Program {
	pub commands: Vec<Command>,
}

#[derive(Debug, Clone)]
pub struct Command {
	pub range: (usize, usize),
	pub statement: Statement,
}

#[derive(Debug, Clone)]
pub enum Statement {
	Constant(Name, Expression),
	Define(Name, Expression),
	Infer(Expression),
	Normalize(Expression),
}

/// A preterm together with the range of tokens it was parsed from.
#[derive(Debug, Clone)]
pub struct Expression {
	pub range: (usize, usize),
	pub preterm: Preterm,
}

/// Untyped syntax trees. Every construct with arguments is a [`Preterm::Node`], whose shape is only
/// validated when it is lowered into a term.
#[derive(Debug, Clone)]
pub enum Preterm {
	Variable(Name),
	Constant(Name),
	Universe,
	Bind(Binder<Box<Expression>>),
	Node(Head, Vec<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
	// Dependent functions.
	Pi,
	Lambda,
	Apply,

	// Dependent pairs.
	Sg,
	Pair,
	Fst,
	Snd,

	// Paths.
	Id,
	Ap,
}

impl Head {
	pub fn name(self) -> &'static str {
		match self {
			Self::Pi => "Π",
			Self::Lambda => "λ",
			Self::Apply => "application",
			Self::Sg => "Σ",
			Self::Pair => "pair",
			Self::Fst => "fst",
			Self::Snd => "snd",
			Self::Id => "Id",
			Self::Ap => "ap",
		}
	}
}

impl Preterm {
	pub fn at(self, range: (usize, usize)) -> Expression { Expression { range, preterm: self } }
}

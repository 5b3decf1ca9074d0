use std::{fmt::Write, rc::Rc};

use lasso::Resolver;

use crate::{
	common::{Binder, Field, Name},
	ir::{syntax::Term, telescope::Telescope},
};

// Binding strength of each syntactic form, loosest first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
	Term,
	Pair,
	Application,
	Projection,
	Atom,
}

fn level(term: &Term) -> Level {
	match term {
		Term::Pi { .. } | Term::Lambda { .. } | Term::Sg { .. } => Level::Term,
		Term::Pair { .. } => Level::Pair,
		Term::Apply { .. } => Level::Application,
		Term::Project(..) => Level::Projection,
		Term::Variable(_) | Term::Constant(_) | Term::Universe | Term::Id { .. } | Term::Ap { .. } => Level::Atom,
	}
}

pub fn print(term: &Term, f: &mut impl Write, interner: &impl Resolver) -> std::fmt::Result {
	match term {
		Term::Variable(name) | Term::Constant(name) => print_name(*name, f, interner)?,
		Term::Universe => write!(f, "U")?,
		Term::Pi { base, family } => print_quantifier("Π", base, family, f, interner)?,
		Term::Lambda { base, body } => print_quantifier("λ", base, body, f, interner)?,
		Term::Sg { base, family } => print_quantifier("Σ", base, family, f, interner)?,
		Term::Apply { scrutinee, argument } => {
			print_at(scrutinee, Level::Application, f, interner)?;
			write!(f, " ")?;
			print_at(argument, Level::Atom, f, interner)?;
		}
		Term::Pair { motive, basepoint, fiberpoint } => {
			print_at(basepoint, Level::Application, f, interner)?;
			write!(f, " {{")?;
			print_parameters(&motive.parameters, f, interner)?;
			write!(f, " => ")?;
			print(&motive.body, f, interner)?;
			write!(f, "}} ")?;
			print_at(fiberpoint, Level::Pair, f, interner)?;
		}
		Term::Project(scrutinee, field) => {
			write!(f, "{} ", match field {
				Field::Base => "fst",
				Field::Fiber => "snd",
			})?;
			print_at(scrutinee, Level::Projection, f, interner)?;
		}
		Term::Id { family, telescope, left, right } => {
			write!(f, "Id")?;
			print_scope(family, telescope, f, interner)?;
			write!(f, "[")?;
			print(left, f, interner)?;
			write!(f, ", ")?;
			print(right, f, interner)?;
			write!(f, "]")?;
		}
		Term::Ap { family, telescope } => {
			write!(f, "ap")?;
			print_scope(family, telescope, f, interner)?;
		}
	}

	Ok(())
}

fn print_at(term: &Term, at: Level, f: &mut impl Write, interner: &impl Resolver) -> std::fmt::Result {
	if level(term) < at {
		write!(f, "(")?;
		print(term, f, interner)?;
		write!(f, ")")
	} else {
		print(term, f, interner)
	}
}

fn print_quantifier(
	symbol: &str,
	base: &Term,
	family: &Binder<Rc<Term>>,
	f: &mut impl Write,
	interner: &impl Resolver,
) -> std::fmt::Result {
	write!(f, "{symbol}(")?;
	print_parameters(&family.parameters, f, interner)?;
	write!(f, " : ")?;
	print(base, f, interner)?;
	write!(f, ") => ")?;
	print(&family.body, f, interner)
}

fn print_scope(
	family: &Binder<Rc<Term>>,
	telescope: &Telescope,
	f: &mut impl Write,
	interner: &impl Resolver,
) -> std::fmt::Result {
	write!(f, "[")?;
	for (i, column) in telescope.iter().enumerate() {
		if i > 0 {
			write!(f, "; ")?;
		}
		match family.parameters.get(i) {
			Some(parameter) => print_name(*parameter, f, interner)?,
			None => write!(f, "_")?,
		}
		write!(f, " : ")?;
		print(&column.ty, f, interner)?;
		write!(f, " / ")?;
		print(&column.witness, f, interner)?;
		write!(f, " : ")?;
		print(&column.left, f, interner)?;
		write!(f, " == ")?;
		print(&column.right, f, interner)?;
	}
	if !telescope.is_empty() {
		write!(f, " ")?;
	}
	write!(f, ". ")?;
	print(&family.body, f, interner)?;
	write!(f, "]")
}

fn print_parameters(parameters: &[Name], f: &mut impl Write, interner: &impl Resolver) -> std::fmt::Result {
	let mut parameters = parameters.iter();
	if let Some(first) = parameters.next() {
		print_name(*first, f, interner)?;
		for parameter in parameters {
			write!(f, " ")?;
			print_name(*parameter, f, interner)?;
		}
	}
	Ok(())
}

fn print_name(name: Name, f: &mut impl Write, interner: &impl Resolver) -> std::fmt::Result {
	write!(f, "{}", interner.resolve(&name.symbol))?;
	if !name.is_source() {
		write!(f, "#{}", name.tag)?;
	}
	Ok(())
}

pub fn pretty_print(term: &Term, interner: &impl Resolver) -> String {
	let mut s = String::new();
	// Writing into a `String` cannot fail.
	let _ = print(term, &mut s, interner);
	s
}

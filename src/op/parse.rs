use lasso::Rodeo;
use peg::error::ParseError;

use crate::{
	common::{bind, Name},
	ir::{
		presyntax::{Command, Expression, Head, Preterm, Program, Statement},
		source::{Command as CommandToken, Keyword, LexedSource, Token},
	},
	op::environment::BUILTIN_CONSTANTS,
};

/// Parses a program from a lexed source, interning names into `interner`.
pub fn parse(source: &LexedSource, interner: &mut Rodeo) -> Result<Program, ParseError<usize>> {
	let mut parser = Parser { source: source.source, interner, ranges: &source.ranges };
	presyntax_parse::program(&source.tokens, &mut parser)
}

pub struct Parser<'s> {
	source: &'s str,
	interner: &'s mut Rodeo,
	ranges: &'s [(usize, usize)],
}

impl<'s> Parser<'s> {
	fn span(&self, token_index: usize) -> &'s str {
		let range = self.ranges[token_index];
		&self.source[range.0..range.1]
	}

	fn identifier(&mut self, token_index: usize) -> Name {
		let span = self.span(token_index);
		Name::new(self.interner.get_or_intern(span))
	}

	fn reference(&mut self, token_index: usize) -> Preterm {
		let span = self.span(token_index);
		let name = Name::new(self.interner.get_or_intern(span));
		if BUILTIN_CONSTANTS.contains(&span) {
			Preterm::Constant(name)
		} else {
			Preterm::Variable(name)
		}
	}

	fn star(&mut self) -> Preterm { Preterm::Constant(Name::new(self.interner.get_or_intern_static("*"))) }
}

// Binder heads fold right-to-left over their parameters.
fn quantify(heads: Vec<(Head, Vec<(usize, Name, Expression)>)>, body: Expression, fini: usize) -> Expression {
	heads.into_iter().rev().flat_map(|(head, parameters)| parameters.into_iter().rev().map(move |p| (head, p))).fold(
		body,
		|body, (head, (init, name, base))| {
			Preterm::Node(head, vec![base, Preterm::Bind(bind([name], Box::new(body))).at((init, fini))]).at((init, fini))
		},
	)
}

// A telescope column `x : A / p : a == b`.
type Row = (Name, Expression, Expression, Expression, Expression);

// Flattens a telescope into its bound names and `types ++ lefts ++ rights ++ witnesses`.
fn flatten(rows: Vec<Row>) -> (Vec<Name>, Vec<Expression>) {
	let mut names = Vec::with_capacity(rows.len());
	let mut columns = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
	for (name, ty, witness, left, right) in rows {
		names.push(name);
		for (column, expression) in columns.iter_mut().zip([ty, left, right, witness]) {
			column.push(expression);
		}
	}
	(names, columns.into_iter().flatten().collect())
}

peg::parser! {
  grammar presyntax_parse(parser: &mut Parser) for [Token] {
		rule _ = [Token::Whitespace]*

		rule identifier() -> Name
			= pos:position!() [Token::Identifier] {parser.identifier(pos)}

		rule head() -> Head
			= [Token::Keyword(Keyword::Pi)] {Head::Pi}
			/ [Token::Keyword(Keyword::Sg)] {Head::Sg}
			/ [Token::Keyword(Keyword::Lambda)] {Head::Lambda}

		rule parameter() -> (usize, Name, Expression)
			= init:position!() [Token::ParenL] _ name:identifier() _ [Token::Colon] _ base:term() _ [Token::ParenR] {(init, name, base)}

		rule binder_head() -> (Head, Vec<(usize, Name, Expression)>)
			= head:head() _ parameters:(p:parameter() _ {p})+ {(head, parameters)}

		rule row() -> Row
			= name:identifier() _ [Token::Colon] _ ty:term() _ [Token::Slash] _ witness:term() _ [Token::Colon] _ left:term() _ [Token::EqualEqual] _ right:term() {(name, ty, witness, left, right)}

		rule telescope() -> (Vec<Name>, Vec<Expression>)
			= rows:(row() ** (_ [Token::Semi] _)) {flatten(rows)}

		rule scope() -> (usize, (Vec<Name>, Vec<Expression>), Expression, usize)
			= init:position!() [Token::SquareL] _ telescope:telescope() _ [Token::Period] _ body:term() _ [Token::SquareR] fini:position!() {(init, telescope, body, fini)}

		rule atom() -> Expression
			= [Token::ParenL] _ term:term() _ [Token::ParenR] {term}
			/ init:position!() preterm:(
				  [Token::Keyword(Keyword::Universe)] {Preterm::Universe}
				/ [Token::Ast] {parser.star()}
				/ pos:position!() [Token::Identifier] {parser.reference(pos)}
				/ [Token::Keyword(Keyword::Id)] _ scope:scope() _ [Token::SquareL] _ left:term() _ [Token::Comma] _ right:term() _ [Token::SquareR] {
					let (family_init, (names, mut arguments), body, family_fini) = scope;
					arguments.insert(0, Preterm::Bind(bind(names, Box::new(body))).at((family_init, family_fini)));
					arguments.extend([left, right]);
					Preterm::Node(Head::Id, arguments)
				}
				/ [Token::Keyword(Keyword::Ap)] _ scope:scope() {
					let (family_init, (names, mut arguments), body, family_fini) = scope;
					arguments.insert(0, Preterm::Bind(bind(names, Box::new(body))).at((family_init, family_fini)));
					Preterm::Node(Head::Ap, arguments)
				}
			) fini:position!() {preterm.at((init, fini))}

		rule projection() -> Expression
			= init:position!() head:(
				  [Token::Keyword(Keyword::Fst)] {Head::Fst}
				/ [Token::Keyword(Keyword::Snd)] {Head::Snd}
			) _ scrutinee:projection() fini:position!() {Preterm::Node(head, vec![scrutinee]).at((init, fini))}
			/ atom()

		rule application() -> Expression
			= scrutinee:projection() arguments:(_ a:projection() {a})* {
				arguments.into_iter().fold(scrutinee, |scrutinee, argument| {
					let range = (scrutinee.range.0, argument.range.1);
					Preterm::Node(Head::Apply, vec![scrutinee, argument]).at(range)
				})
			}

		#[cache]
		rule pair() -> Expression
			= init:position!() basepoint:application() _ motive:(
				binder_init:position!() [Token::CurlyL] _ name:identifier() _ [Token::DoubleArrow] _ motive:term() _ [Token::CurlyR] binder_fini:position!()
					{Preterm::Bind(bind([name], Box::new(motive))).at((binder_init, binder_fini))}
			) _ fiberpoint:pair() fini:position!() {Preterm::Node(Head::Pair, vec![motive, basepoint, fiberpoint]).at((init, fini))}
			/ application()

		pub rule term() -> Expression
			= heads:(h:binder_head() _ {h})+ [Token::DoubleArrow] _ body:term() fini:position!() {quantify(heads, body, fini)}
			/ pair()

		rule statement() -> Command
			= init:position!() statement:(
				  [Token::Command(CommandToken::Constant)] _ name:identifier() _ ty:term() {Statement::Constant(name, ty)}
				/ [Token::Command(CommandToken::Define)] _ name:identifier() _ body:term() {Statement::Define(name, body)}
				/ [Token::Command(CommandToken::Infer)] _ term:term() {Statement::Infer(term)}
				/ [Token::Command(CommandToken::Normalize)] _ term:term() {Statement::Normalize(term)}
			) fini:position!() {Command { range: (init, fini), statement }}

		pub rule program() -> Program
			= _ commands:(c:statement() _ {c})* {Program { commands }}
  }
}

/// Parses a single term, for use where no commands are expected.
pub fn parse_term(source: &LexedSource, interner: &mut Rodeo) -> Result<Expression, ParseError<usize>> {
	let mut parser = Parser { source: source.source, interner, ranges: &source.ranges };
	presyntax_parse::term(&source.tokens, &mut parser)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ir::source::lex;

	fn term(source: &str) -> (Rodeo, Expression) {
		let mut interner = Rodeo::new();
		let lexed = lex(source).unwrap();
		let expression = parse_term(&lexed, &mut interner).unwrap();
		(interner, expression)
	}

	#[test]
	fn binder_heads_nest_to_the_right() {
		let (_, expression) = term("Π(A : U)(x : A) => A");
		let Preterm::Node(Head::Pi, arguments) = &expression.preterm else { panic!("expected Π") };
		let Preterm::Bind(family) = &arguments[1].preterm else { panic!("expected a binder") };
		assert!(matches!(family.body.preterm, Preterm::Node(Head::Pi, _)));
	}

	#[test]
	fn application_associates_to_the_left() {
		let (_, expression) = term("f a b");
		let Preterm::Node(Head::Apply, arguments) = &expression.preterm else { panic!("expected application") };
		assert!(matches!(arguments[0].preterm, Preterm::Node(Head::Apply, _)));
		assert!(matches!(arguments[1].preterm, Preterm::Variable(_)));
	}

	#[test]
	fn builtin_names_are_constants() {
		let (_, expression) = term("absurd 0");
		let Preterm::Node(Head::Apply, arguments) = &expression.preterm else { panic!("expected application") };
		assert!(arguments.iter().all(|argument| matches!(argument.preterm, Preterm::Constant(_))));
	}

	#[test]
	fn path_types_flatten_their_telescope() {
		let (_, expression) = term("Id[x : A / p : a == b . B x][c, d]");
		let Preterm::Node(Head::Id, arguments) = &expression.preterm else { panic!("expected Id") };
		// The family, one column of four, and the two endpoints.
		assert_eq!(arguments.len(), 7);
		assert!(matches!(&arguments[0].preterm, Preterm::Bind(family) if family.arity() == 1));
	}

	#[test]
	fn reflexivity_is_ap_over_the_empty_telescope() {
		let (_, expression) = term("ap[. a]");
		let Preterm::Node(Head::Ap, arguments) = &expression.preterm else { panic!("expected ap") };
		assert_eq!(arguments.len(), 1);
	}

	#[test]
	fn pairs_carry_their_motive() {
		let (_, expression) = term("a {x => B} b");
		let Preterm::Node(Head::Pair, arguments) = &expression.preterm else { panic!("expected a pair") };
		assert!(matches!(arguments[0].preterm, Preterm::Bind(_)));
	}

	#[test]
	fn programs_split_into_commands() {
		let mut interner = Rodeo::new();
		let source = "\\constant A U\n\\define a A % unused\n\\infer a";
		let lexed = lex(source).unwrap();
		let program = parse(&lexed, &mut interner).unwrap();
		assert_eq!(program.commands.len(), 3);
		assert!(matches!(program.commands[2].statement, Statement::Infer(_)));
	}
}

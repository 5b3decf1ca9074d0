use std::rc::Rc;

use crate::{
	common::{bind, Binder},
	ir::{
		presyntax::{Expression, Head, Preterm},
		syntax::Term,
		telescope::Telescope,
	},
	op::error::KernelError,
	utility::rc,
};

/// Turns a parsed expression into a core term, validating the shape of every node.
pub fn lower(expression: &Expression) -> Result<Rc<Term>, KernelError> {
	match &expression.preterm {
		Preterm::Variable(name) => Ok(Term::var(*name)),
		Preterm::Constant(name) => Ok(Term::constant(*name)),
		Preterm::Universe => Ok(Term::universe()),
		Preterm::Bind(binder) => Err(KernelError::MalformedBind { arity: binder.arity(), expected: 0 }),
		Preterm::Node(head, arguments) => lower_node(*head, arguments),
	}
}

fn lower_node(head: Head, arguments: &[Expression]) -> Result<Rc<Term>, KernelError> {
	Ok(match (head, arguments) {
		// Dependent functions.
		(Head::Pi, [base, family]) => rc!(Term::Pi { base: lower(base)?, family: lower_unary(family)? }),
		(Head::Lambda, [base, body]) => rc!(Term::Lambda { base: lower(base)?, body: lower_unary(body)? }),
		(Head::Apply, [scrutinee, argument]) => Term::apply(lower(scrutinee)?, lower(argument)?),

		// Dependent pairs.
		(Head::Sg, [base, family]) => rc!(Term::Sg { base: lower(base)?, family: lower_unary(family)? }),
		(Head::Pair, [motive, basepoint, fiberpoint]) =>
			rc!(Term::Pair { motive: lower_unary(motive)?, basepoint: lower(basepoint)?, fiberpoint: lower(fiberpoint)? }),
		(Head::Fst, [scrutinee]) => Term::fst(lower(scrutinee)?),
		(Head::Snd, [scrutinee]) => Term::snd(lower(scrutinee)?),

		// Paths.
		(Head::Id, [family, columns @ .., left, right]) =>
			Term::id(lower_binder(family)?, lower_telescope(columns)?, lower(left)?, lower(right)?),
		(Head::Ap, [family, columns @ ..]) => Term::ap(lower_binder(family)?, lower_telescope(columns)?),

		_ => return Err(KernelError::UnexpectedTerm(format!("{} with {} arguments", head.name(), arguments.len()))),
	})
}

fn lower_binder(expression: &Expression) -> Result<Binder<Rc<Term>>, KernelError> {
	match &expression.preterm {
		Preterm::Bind(binder) => Ok(bind(binder.parameters.clone(), lower(&binder.body)?)),
		// A bare term in binder position binds nothing.
		_ => Err(KernelError::MalformedBind { arity: 0, expected: 1 }),
	}
}

fn lower_unary(expression: &Expression) -> Result<Binder<Rc<Term>>, KernelError> {
	let binder = lower_binder(expression)?;
	match binder.arity() {
		1 => Ok(binder),
		arity => Err(KernelError::MalformedBind { arity, expected: 1 }),
	}
}

fn lower_telescope(columns: &[Expression]) -> Result<Telescope, KernelError> {
	Telescope::from_flat(columns.iter().map(lower).collect::<Result<_, _>>()?)
}

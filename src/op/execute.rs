use std::rc::Rc;

use tracing::debug;

use crate::{
	common::Name,
	ir::{
		presyntax::{Command, Program, Statement},
		syntax::Term,
	},
	op::{check::Checker, error::KernelError, lower::lower},
};

/// The result of running one command.
#[derive(Clone, Debug)]
pub enum Outcome {
	Declared(Name),
	Defined { name: Name, ty: Rc<Term> },
	Inferred(Rc<Term>),
	Normalized(Rc<Term>),
}

/// A kernel error raised by the command at `index`, whose tokens span `range`.
#[derive(Debug)]
pub struct ExecutionError {
	pub index: usize,
	pub range: (usize, usize),
	pub error: KernelError,
}

pub fn execute_command(checker: &mut Checker, command: &Command) -> Result<Outcome, KernelError> {
	match &command.statement {
		Statement::Constant(name, ty) => {
			checker.declare_constant(*name, lower(ty)?)?;
			Ok(Outcome::Declared(*name))
		}
		Statement::Define(name, body) => {
			let ty = checker.declare_definition(*name, lower(body)?)?;
			Ok(Outcome::Defined { name: *name, ty })
		}
		Statement::Infer(term) => Ok(Outcome::Inferred(checker.infer(&lower(term)?)?)),
		Statement::Normalize(term) => {
			let term = lower(term)?;
			// Only well-typed terms are normalized.
			checker.infer(&term)?;
			Ok(Outcome::Normalized(checker.normalize(&term)?))
		}
	}
}

/// Runs every command of a program in order, stopping at the first failure.
pub fn execute(checker: &mut Checker, program: &Program) -> Result<Vec<Outcome>, ExecutionError> {
	program
		.commands
		.iter()
		.enumerate()
		.map(|(index, command)| {
			debug!(index, "executing command");
			execute_command(checker, command).map_err(|error| ExecutionError { index, range: command.range, error })
		})
		.collect()
}

use std::rc::Rc;

use thiserror::Error;

use crate::{common::Name, ir::syntax::Term};

/// Failures of the kernel. Every one of them is terminal for the enclosing operation.
#[derive(Error, Clone, Debug)]
pub enum KernelError {
	#[error("unbound variable: {0:?}")]
	UnboundVariable(Name),
	#[error("unknown constant: {0:?}")]
	UnknownConstant(Name),
	#[error("expected a function type, found {0:?}")]
	NotAFunctionType(Rc<Term>),
	#[error("expected a pair type, found {0:?}")]
	NotAPairType(Rc<Term>),
	#[error("type mismatch: expected {expected:?}, found {found:?}")]
	TypeMismatch { expected: Rc<Term>, found: Rc<Term> },
	#[error("binder of {arity} parameters where {expected} is admissible")]
	MalformedBind { arity: usize, expected: usize },
	#[error("malformed telescope: expected {expected} columns, found {found}")]
	MalformedTelescope { expected: usize, found: usize },
	#[error("no rule applies to {0}")]
	UnexpectedTerm(String),
	#[error("could not decide whether {left:?} and {right:?} are equal at {ty:?}")]
	UndecidedEquality { left: Rc<Term>, right: Rc<Term>, ty: Rc<Term> },
	#[error("normalization ran out of fuel after {0} rewrite steps")]
	OutOfFuel(usize),
}

impl KernelError {
	pub fn mismatch(expected: Rc<Term>, found: Rc<Term>) -> Self { Self::TypeMismatch { expected, found } }
}

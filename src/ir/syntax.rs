use std::rc::Rc;

use crate::{
	common::{bind, Binder, Field, Name},
	ir::telescope::Telescope,
};

/// A term of the core language. Types are terms of type `Universe`.
#[derive(Clone, PartialEq, Debug)]
pub enum Term {
	// Variables.
	Variable(Name),
	Constant(Name),

	// Types.
	Universe,

	// Dependent functions.
	Pi {
		base: Rc<Self>,
		family: Binder<Rc<Self>>,
	},
	Lambda {
		base: Rc<Self>,
		body: Binder<Rc<Self>>,
	},
	Apply {
		scrutinee: Rc<Self>,
		argument: Rc<Self>,
	},

	// Dependent pairs.
	Sg {
		base: Rc<Self>,
		family: Binder<Rc<Self>>,
	},
	Pair {
		motive: Binder<Rc<Self>>,
		basepoint: Rc<Self>,
		fiberpoint: Rc<Self>,
	},
	Project(Rc<Self>, Field),

	// Paths.
	// NOTE: The family's parameters also scope over the telescope's column types.
	Id {
		family: Binder<Rc<Self>>,
		telescope: Telescope,
		left: Rc<Self>,
		right: Rc<Self>,
	},
	Ap {
		family: Binder<Rc<Self>>,
		telescope: Telescope,
	},
}

impl Term {
	pub fn var(name: Name) -> Rc<Self> { Rc::new(Self::Variable(name)) }

	pub fn constant(name: Name) -> Rc<Self> { Rc::new(Self::Constant(name)) }

	pub fn universe() -> Rc<Self> { Rc::new(Self::Universe) }

	pub fn pi(base: Rc<Self>, parameter: Name, family: Rc<Self>) -> Rc<Self> {
		Rc::new(Self::Pi { base, family: bind([parameter], family) })
	}

	pub fn sg(base: Rc<Self>, parameter: Name, family: Rc<Self>) -> Rc<Self> {
		Rc::new(Self::Sg { base, family: bind([parameter], family) })
	}

	pub fn lambda(base: Rc<Self>, parameter: Name, body: Rc<Self>) -> Rc<Self> {
		Rc::new(Self::Lambda { base, body: bind([parameter], body) })
	}

	pub fn apply(scrutinee: Rc<Self>, argument: Rc<Self>) -> Rc<Self> {
		Rc::new(Self::Apply { scrutinee, argument })
	}

	pub fn apply_all(scrutinee: Rc<Self>, arguments: impl IntoIterator<Item = Rc<Self>>) -> Rc<Self> {
		arguments.into_iter().fold(scrutinee, Self::apply)
	}

	pub fn pair(parameter: Name, motive: Rc<Self>, basepoint: Rc<Self>, fiberpoint: Rc<Self>) -> Rc<Self> {
		Rc::new(Self::Pair { motive: bind([parameter], motive), basepoint, fiberpoint })
	}

	pub fn fst(scrutinee: Rc<Self>) -> Rc<Self> { Rc::new(Self::Project(scrutinee, Field::Base)) }

	pub fn snd(scrutinee: Rc<Self>) -> Rc<Self> { Rc::new(Self::Project(scrutinee, Field::Fiber)) }

	pub fn id(family: Binder<Rc<Self>>, telescope: Telescope, left: Rc<Self>, right: Rc<Self>) -> Rc<Self> {
		Rc::new(Self::Id { family, telescope, left, right })
	}

	pub fn ap(family: Binder<Rc<Self>>, telescope: Telescope) -> Rc<Self> { Rc::new(Self::Ap { family, telescope }) }

	/// Returns the name of the head constructor, for diagnostics.
	pub fn head(&self) -> &'static str {
		match self {
			Self::Variable(_) => "variable",
			Self::Constant(_) => "constant",
			Self::Universe => "U",
			Self::Pi { .. } => "Π",
			Self::Lambda { .. } => "λ",
			Self::Apply { .. } => "application",
			Self::Sg { .. } => "Σ",
			Self::Pair { .. } => "pair",
			Self::Project(_, Field::Base) => "fst",
			Self::Project(_, Field::Fiber) => "snd",
			Self::Id { .. } => "Id",
			Self::Ap { .. } => "ap",
		}
	}
}

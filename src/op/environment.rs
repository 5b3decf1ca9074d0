use std::{collections::HashMap, rc::Rc};

use lasso::Rodeo;

use crate::{common::Name, ir::syntax::Term};

/// Spellings of the constants every environment starts with.
pub const BUILTIN_CONSTANTS: [&str; 7] = ["0", "1", "*", "2", "tt", "ff", "absurd"];

/// Names of the builtin constants the kernel gives special treatment.
#[derive(Clone, Copy, Debug)]
pub struct Builtins {
	pub empty: Name,
	pub unit: Name,
	pub star: Name,
	pub bool: Name,
	pub tt: Name,
	pub ff: Name,
	pub absurd: Name,
}

impl Builtins {
	pub fn intern(interner: &mut Rodeo) -> Self {
		let [empty, unit, star, bool, tt, ff, absurd] =
			BUILTIN_CONSTANTS.map(|spelling| Name::new(interner.get_or_intern_static(spelling)));
		Self { empty, unit, star, bool, tt, ff, absurd }
	}
}

#[derive(Clone, Debug)]
pub struct Definition {
	pub body: Rc<Term>,
	pub ty: Rc<Term>,
}

/// Global signatures and delta-reducible definitions.
#[derive(Clone, Debug)]
pub struct Environment {
	constants: HashMap<Name, Rc<Term>>,
	definitions: HashMap<Name, Definition>,
	builtins: Builtins,
}

impl Environment {
	/// Creates an environment holding the builtin constants.
	pub fn new(interner: &mut Rodeo) -> Self {
		let builtins = Builtins::intern(interner);
		let mut environment = Self { constants: HashMap::new(), definitions: HashMap::new(), builtins };

		let Builtins { empty, unit, star, bool, tt, ff, absurd } = builtins;
		environment.declare_constant(empty, Term::universe());
		environment.declare_constant(unit, Term::universe());
		environment.declare_constant(star, Term::constant(unit));
		environment.declare_constant(bool, Term::universe());
		environment.declare_constant(tt, Term::constant(bool));
		environment.declare_constant(ff, Term::constant(bool));

		// absurd : Π(A : U) => Π(z : 0) => A
		let a = Name::new(interner.get_or_intern_static("A"));
		let z = Name::new(interner.get_or_intern_static("z"));
		environment.declare_constant(
			absurd,
			Term::pi(Term::universe(), a, Term::pi(Term::constant(empty), z, Term::var(a))),
		);

		environment
	}

	pub fn builtins(&self) -> &Builtins { &self.builtins }

	pub fn declare_constant(&mut self, name: Name, ty: Rc<Term>) { self.constants.insert(name, ty); }

	pub fn declare_definition(&mut self, name: Name, body: Rc<Term>, ty: Rc<Term>) {
		self.definitions.insert(name, Definition { body, ty });
	}

	pub fn constant(&self, name: Name) -> Option<&Rc<Term>> { self.constants.get(&name) }

	pub fn definition(&self, name: Name) -> Option<&Definition> { self.definitions.get(&name) }

	pub fn is_declared(&self, name: Name) -> bool {
		self.constants.contains_key(&name) || self.definitions.contains_key(&name)
	}

	/// Whether all inhabitants of `ty` are equal: the empty and unit types.
	pub fn is_proof_irrelevant(&self, ty: &Term) -> bool {
		matches!(ty, Term::Constant(c) if *c == self.builtins.empty || *c == self.builtins.unit)
	}
}

/// Local hypotheses, innermost last. Later entries shadow earlier entries of the same name.
#[derive(Clone, Debug, Default)]
pub struct Context {
	entries: Vec<(Name, Rc<Term>)>,
}

impl Context {
	pub fn empty() -> Self { Self::default() }

	pub fn len(&self) -> usize { self.entries.len() }

	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	pub fn lookup(&self, name: Name) -> Option<&Rc<Term>> {
		self.entries.iter().rev().find(|(entry, _)| *entry == name).map(|(_, ty)| ty)
	}

	/// The hypotheses in the order they were assumed.
	pub fn iter(&self) -> impl Iterator<Item = (Name, Rc<Term>)> + '_ {
		self.entries.iter().map(|(name, ty)| (*name, ty.clone()))
	}

	pub(crate) fn push(&mut self, name: Name, ty: Rc<Term>) { self.entries.push((name, ty)); }

	// Removes every entry pushed since the context had length `len`, uncovering what they shadowed.
	pub(crate) fn truncate(&mut self, len: usize) { self.entries.truncate(len); }
}

use std::{
	collections::{HashMap, HashSet},
	rc::Rc,
};

use crate::{
	common::{Binder, Name},
	ir::{
		syntax::Term,
		telescope::{Column, Telescope},
	},
	utility::rc,
};

/// A supply of fresh names. Each checking session owns its own.
#[derive(Clone, Debug, Default)]
pub struct Supply {
	issued: u32,
}

impl Supply {
	pub fn new() -> Self { Self::default() }

	/// Returns a name that has never been issued before, sharing the printable base of `name`.
	pub fn fresh(&mut self, name: Name) -> Name {
		self.issued += 1;
		Name { symbol: name.symbol, tag: self.issued }
	}
}

pub type Substitution = HashMap<Name, Rc<Term>>;

pub fn substitution(pairs: impl IntoIterator<Item = (Name, Rc<Term>)>) -> Substitution { pairs.into_iter().collect() }

pub trait Substitute {
	/// Replaces free variables according to `substitution`, renaming every binder passed under.
	fn substitute(&self, supply: &mut Supply, substitution: &Substitution) -> Self;
}

impl Substitute for Rc<Term> {
	fn substitute(&self, supply: &mut Supply, substitution: &Substitution) -> Self {
		if substitution.is_empty() {
			return self.clone();
		}

		match self.as_ref() {
			// Variables.
			Term::Variable(name) => substitution.get(name).cloned().unwrap_or_else(|| self.clone()),
			Term::Constant(_) => self.clone(),

			// Types.
			Term::Universe => self.clone(),

			// Dependent functions.
			Term::Pi { base, family } => rc!(Term::Pi {
				base: base.substitute(supply, substitution),
				family: family.substitute(supply, substitution),
			}),
			Term::Lambda { base, body } => rc!(Term::Lambda {
				base: base.substitute(supply, substitution),
				body: body.substitute(supply, substitution),
			}),
			Term::Apply { scrutinee, argument } => rc!(Term::Apply {
				scrutinee: scrutinee.substitute(supply, substitution),
				argument: argument.substitute(supply, substitution),
			}),

			// Dependent pairs.
			Term::Sg { base, family } => rc!(Term::Sg {
				base: base.substitute(supply, substitution),
				family: family.substitute(supply, substitution),
			}),
			Term::Pair { motive, basepoint, fiberpoint } => rc!(Term::Pair {
				motive: motive.substitute(supply, substitution),
				basepoint: basepoint.substitute(supply, substitution),
				fiberpoint: fiberpoint.substitute(supply, substitution),
			}),
			Term::Project(scrutinee, field) => rc!(Term::Project(scrutinee.substitute(supply, substitution), *field)),

			// Paths.
			Term::Id { family, telescope, left, right } => {
				let (family, telescope) = substitute_scope(supply, substitution, family, telescope);
				rc!(Term::Id {
					family,
					telescope,
					left: left.substitute(supply, substitution),
					right: right.substitute(supply, substitution),
				})
			}
			Term::Ap { family, telescope } => {
				let (family, telescope) = substitute_scope(supply, substitution, family, telescope);
				rc!(Term::Ap { family, telescope })
			}
		}
	}
}

impl Substitute for Binder<Rc<Term>> {
	fn substitute(&self, supply: &mut Supply, substitution: &Substitution) -> Self {
		let mut extended = substitution.clone();
		let parameters = self
			.parameters
			.iter()
			.map(|&parameter| {
				let fresh = supply.fresh(parameter);
				extended.insert(parameter, Term::var(fresh));
				fresh
			})
			.collect();
		Binder::new(parameters, self.body.substitute(supply, &extended))
	}
}

/// Substitutes into a binder together with the telescope whose column types it scopes over.
pub fn substitute_scope(
	supply: &mut Supply,
	substitution: &Substitution,
	family: &Binder<Rc<Term>>,
	telescope: &Telescope,
) -> (Binder<Rc<Term>>, Telescope) {
	let mut extended = substitution.clone();
	let mut parameters = Vec::with_capacity(family.arity());
	let mut columns = Vec::with_capacity(telescope.len());
	for (i, &parameter) in family.parameters.iter().enumerate() {
		if let Some(column) = telescope.column(i) {
			columns.push(Column::new(
				column.ty.substitute(supply, &extended),
				column.left.substitute(supply, substitution),
				column.right.substitute(supply, substitution),
				column.witness.substitute(supply, substitution),
			));
		}
		let fresh = supply.fresh(parameter);
		extended.insert(parameter, Term::var(fresh));
		parameters.push(fresh);
	}
	// Columns beyond the binder's arity only occur in malformed nodes; their types see every parameter.
	for column in telescope.iter().skip(family.arity()) {
		columns.push(Column::new(
			column.ty.substitute(supply, &extended),
			column.left.substitute(supply, substitution),
			column.right.substitute(supply, substitution),
			column.witness.substitute(supply, substitution),
		));
	}
	(Binder::new(parameters.into(), family.body.substitute(supply, &extended)), Telescope(columns))
}

/// Substitutes `arguments` for the parameters of `binder` in its body.
pub fn instantiate(
	supply: &mut Supply,
	binder: &Binder<Rc<Term>>,
	arguments: impl IntoIterator<Item = Rc<Term>>,
) -> Rc<Term> {
	let substitution = binder.parameters.iter().copied().zip(arguments).collect();
	binder.body.substitute(supply, &substitution)
}

/// Computes the set of names occurring free in a term.
pub fn free_variables(term: &Term) -> HashSet<Name> {
	let mut free = HashSet::new();
	collect_free(term, &mut Vec::new(), &mut free);
	free
}

fn collect_free(term: &Term, bound: &mut Vec<Name>, free: &mut HashSet<Name>) {
	fn under(binder: &Binder<Rc<Term>>, bound: &mut Vec<Name>, free: &mut HashSet<Name>) {
		let depth = bound.len();
		bound.extend(binder.parameters.iter().copied());
		collect_free(&binder.body, bound, free);
		bound.truncate(depth);
	}

	match term {
		Term::Variable(name) =>
			if !bound.contains(name) {
				free.insert(*name);
			},
		Term::Constant(_) | Term::Universe => (),
		Term::Pi { base, family } | Term::Sg { base, family } | Term::Lambda { base, body: family } => {
			collect_free(base, bound, free);
			under(family, bound, free);
		}
		Term::Apply { scrutinee, argument } => {
			collect_free(scrutinee, bound, free);
			collect_free(argument, bound, free);
		}
		Term::Pair { motive, basepoint, fiberpoint } => {
			under(motive, bound, free);
			collect_free(basepoint, bound, free);
			collect_free(fiberpoint, bound, free);
		}
		Term::Project(scrutinee, _) => collect_free(scrutinee, bound, free),
		Term::Id { family, telescope, left, right } => {
			collect_free_scope(family, telescope, bound, free);
			collect_free(left, bound, free);
			collect_free(right, bound, free);
		}
		Term::Ap { family, telescope } => collect_free_scope(family, telescope, bound, free),
	}
}

fn collect_free_scope(
	family: &Binder<Rc<Term>>,
	telescope: &Telescope,
	bound: &mut Vec<Name>,
	free: &mut HashSet<Name>,
) {
	for column in telescope.iter() {
		collect_free(&column.left, bound, free);
		collect_free(&column.right, bound, free);
		collect_free(&column.witness, bound, free);
	}
	let depth = bound.len();
	for (i, column) in telescope.iter().enumerate() {
		bound.truncate(depth);
		bound.extend(family.parameters.iter().take(i).copied());
		collect_free(&column.ty, bound, free);
	}
	bound.truncate(depth);
	bound.extend(family.parameters.iter().copied());
	collect_free(&family.body, bound, free);
	bound.truncate(depth);
}

/// Decides whether `name` occurs free in `term`.
pub fn occurs_free(term: &Term, name: Name) -> bool { free_variables(term).contains(&name) }

/// Decides whether two terms are equal up to consistent renaming of bound names.
pub fn alpha_equivalent(left: &Term, right: &Term) -> bool { Alpha::default().terms(left, right) }

/// Decides whether two telescopes are alpha-equivalent, where the column types of each are scoped by
/// the corresponding parameter list.
pub fn alpha_equivalent_telescopes(
	(left_parameters, left): (&[Name], &Telescope),
	(right_parameters, right): (&[Name], &Telescope),
) -> bool {
	left_parameters.len() == right_parameters.len()
		&& Alpha::default().telescopes((left_parameters, left), (right_parameters, right))
}

// Pairs of names bound on the left and right sides; the innermost pair is last.
#[derive(Default)]
struct Alpha {
	bound: Vec<(Name, Name)>,
}

impl Alpha {
	fn variables(&self, left: Name, right: Name) -> bool {
		let l = self.bound.iter().rposition(|&(name, _)| name == left);
		let r = self.bound.iter().rposition(|&(_, name)| name == right);
		match (l, r) {
			(None, None) => left == right,
			(Some(l), Some(r)) => l == r,
			_ => false,
		}
	}

	fn binders(&mut self, left: &Binder<Rc<Term>>, right: &Binder<Rc<Term>>) -> bool {
		if left.arity() != right.arity() {
			return false;
		}
		let depth = self.bound.len();
		self.bound.extend(left.parameters.iter().copied().zip(right.parameters.iter().copied()));
		let result = self.terms(&left.body, &right.body);
		self.bound.truncate(depth);
		result
	}

	fn telescopes(
		&mut self,
		(left_parameters, left): (&[Name], &Telescope),
		(right_parameters, right): (&[Name], &Telescope),
	) -> bool {
		if left.len() != right.len() {
			return false;
		}
		for (l, r) in left.iter().zip(right.iter()) {
			if !(self.terms(&l.left, &r.left) && self.terms(&l.right, &r.right) && self.terms(&l.witness, &r.witness))
			{
				return false;
			}
		}
		let depth = self.bound.len();
		let pairs: Vec<_> = left_parameters.iter().copied().zip(right_parameters.iter().copied()).collect();
		let mut result = true;
		for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
			self.bound.truncate(depth);
			self.bound.extend(pairs.iter().take(i).copied());
			if !self.terms(&l.ty, &r.ty) {
				result = false;
				break;
			}
		}
		self.bound.truncate(depth);
		result
	}

	fn scopes(
		&mut self,
		(left_family, left_telescope): (&Binder<Rc<Term>>, &Telescope),
		(right_family, right_telescope): (&Binder<Rc<Term>>, &Telescope),
	) -> bool {
		left_family.arity() == right_family.arity()
			&& self.telescopes(
				(&left_family.parameters[..], left_telescope),
				(&right_family.parameters[..], right_telescope),
			) && self.binders(left_family, right_family)
	}

	fn terms(&mut self, left: &Term, right: &Term) -> bool {
		use Term::*;
		match (left, right) {
			(Variable(l), Variable(r)) => self.variables(*l, *r),
			(Constant(l), Constant(r)) => l == r,
			(Universe, Universe) => true,
			(Pi { base: lb, family: lf }, Pi { base: rb, family: rf })
			| (Sg { base: lb, family: lf }, Sg { base: rb, family: rf })
			| (Lambda { base: lb, body: lf }, Lambda { base: rb, body: rf }) =>
				self.terms(lb, rb) && self.binders(lf, rf),
			(Apply { scrutinee: ls, argument: la }, Apply { scrutinee: rs, argument: ra }) =>
				self.terms(ls, rs) && self.terms(la, ra),
			(
				Pair { motive: lm, basepoint: lb, fiberpoint: lf },
				Pair { motive: rm, basepoint: rb, fiberpoint: rf },
			) => self.binders(lm, rm) && self.terms(lb, rb) && self.terms(lf, rf),
			(Project(l, lf), Project(r, rf)) => lf == rf && self.terms(l, r),
			(
				Id { family: lf, telescope: lt, left: ll, right: lr },
				Id { family: rf, telescope: rt, left: rl, right: rr },
			) => self.terms(ll, rl) && self.terms(lr, rr) && self.scopes((lf, lt), (rf, rt)),
			(Ap { family: lf, telescope: lt }, Ap { family: rf, telescope: rt }) =>
				self.scopes((lf, lt), (rf, rt)),
			_ => false,
		}
	}
}

//! Terms defined in terms of the core constructors.

use std::{collections::HashSet, rc::Rc};

use lasso::Rodeo;

use crate::{
	common::{Binder, Name},
	ir::{syntax::Term, telescope::Telescope},
	op::substitute::free_variables,
};

// A name spelled `spelling` that occurs free in none of `terms`.
fn avoiding(interner: &mut Rodeo, spelling: &'static str, terms: &[&Rc<Term>]) -> Name {
	let free: HashSet<Name> = terms.iter().flat_map(|term| free_variables(term)).collect();
	let mut name = Name::new(interner.get_or_intern_static(spelling));
	while free.contains(&name) {
		name.tag += 1;
	}
	name
}

/// The reflexivity path `ap[. a]`.
pub fn refl(point: Rc<Term>) -> Rc<Term> { Term::ap(Binder::closed(point), Telescope::empty()) }

/// The non-dependent path type `Id[. A][a, b]`.
pub fn path(ty: Rc<Term>, left: Rc<Term>, right: Rc<Term>) -> Rc<Term> {
	Term::id(Binder::closed(ty), Telescope::empty(), left, right)
}

/// `Σ(c : A) => Π(x : A) => Id[. A][c, x]`
pub fn is_contr(interner: &mut Rodeo, ty: Rc<Term>) -> Rc<Term> {
	let (center, x) = (avoiding(interner, "c", &[&ty]), avoiding(interner, "x", &[&ty]));
	Term::sg(ty.clone(), center, Term::pi(ty.clone(), x, path(ty, Term::var(center), Term::var(x))))
}

/// One-to-one correspondences between `A` and `B`: relations in which every element of either side is
/// related to a contractible space of elements of the other.
pub fn one_one_corr(interner: &mut Rodeo, a: Rc<Term>, b: Rc<Term>) -> Rc<Term> {
	let [relation, x, y, anonymous] = ["R", "a", "b", "_"].map(|spelling| avoiding(interner, spelling, &[&a, &b]));
	let related = |x, y| Term::apply_all(Term::var(relation), [Term::var(x), Term::var(y)]);

	let relation_ty = Term::pi(a.clone(), anonymous, Term::pi(b.clone(), anonymous, Term::universe()));
	let left_unique = Term::pi(a.clone(), x, is_contr(interner, Term::sg(b.clone(), y, related(x, y))));
	let right_unique = Term::pi(b, y, is_contr(interner, Term::sg(a, x, related(x, y))));
	Term::sg(relation_ty, relation, Term::sg(left_unique, anonymous, right_unique))
}

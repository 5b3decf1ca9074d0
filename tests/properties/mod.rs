//! Property-based tests of substitution and normalization over untyped terms.

use std::{collections::HashSet, rc::Rc};

use idtt::{
	common::{Field, Name},
	ir::syntax::Term,
	op::{
		environment::Environment,
		normalize::Normalizer,
		substitute::{alpha_equivalent, free_variables, substitution, Substitute as _, Supply},
	},
};
use lasso::Rodeo;
use proptest::prelude::*;

const NAMES: [&str; 3] = ["x", "y", "z"];

// Terms over the names in `NAMES`, by index.
#[derive(Clone, Debug)]
enum Shape {
	Variable(usize),
	Universe,
	Pi(usize, Box<Shape>, Box<Shape>),
	Lambda(usize, Box<Shape>, Box<Shape>),
	Apply(Box<Shape>, Box<Shape>),
	Sg(usize, Box<Shape>, Box<Shape>),
	Pair(usize, Box<Shape>, Box<Shape>, Box<Shape>),
	Project(Box<Shape>, Field),
}

fn shape() -> impl Strategy<Value = Shape> {
	let leaf = prop_oneof![(0..NAMES.len()).prop_map(Shape::Variable), Just(Shape::Universe)];
	leaf.prop_recursive(5, 48, 3, |inner| {
		let name = 0..NAMES.len();
		prop_oneof![
			(name.clone(), inner.clone(), inner.clone()).prop_map(|(x, a, b)| Shape::Pi(x, Box::new(a), Box::new(b))),
			(name.clone(), inner.clone(), inner.clone())
				.prop_map(|(x, a, b)| Shape::Lambda(x, Box::new(a), Box::new(b))),
			(inner.clone(), inner.clone()).prop_map(|(f, a)| Shape::Apply(Box::new(f), Box::new(a))),
			(name.clone(), inner.clone(), inner.clone()).prop_map(|(x, a, b)| Shape::Sg(x, Box::new(a), Box::new(b))),
			(name, inner.clone(), inner.clone(), inner.clone())
				.prop_map(|(x, m, a, b)| Shape::Pair(x, Box::new(m), Box::new(a), Box::new(b))),
			(inner, prop_oneof![Just(Field::Base), Just(Field::Fiber)])
				.prop_map(|(p, field)| Shape::Project(Box::new(p), field)),
		]
	})
}

fn build(shape: &Shape, names: &[Name]) -> Rc<Term> {
	match shape {
		Shape::Variable(x) => Term::var(names[*x]),
		Shape::Universe => Term::universe(),
		Shape::Pi(x, a, b) => Term::pi(build(a, names), names[*x], build(b, names)),
		Shape::Lambda(x, a, b) => Term::lambda(build(a, names), names[*x], build(b, names)),
		Shape::Apply(f, a) => Term::apply(build(f, names), build(a, names)),
		Shape::Sg(x, a, b) => Term::sg(build(a, names), names[*x], build(b, names)),
		Shape::Pair(x, m, a, b) => Term::pair(names[*x], build(m, names), build(a, names), build(b, names)),
		Shape::Project(p, Field::Base) => Term::fst(build(p, names)),
		Shape::Project(p, Field::Fiber) => Term::snd(build(p, names)),
	}
}

fn names(interner: &mut Rodeo) -> Vec<Name> {
	NAMES.iter().map(|spelling| Name::new(interner.get_or_intern(spelling))).collect()
}

proptest! {
	#[test]
	fn substitution_avoids_capture(shape in shape(), x in 0..NAMES.len(), y in 0..NAMES.len()) {
		let mut interner = Rodeo::new();
		let names = names(&mut interner);
		let (x, y) = (names[x], names[y]);
		let term = build(&shape, &names);

		let result = term.substitute(&mut Supply::new(), &substitution([(x, Term::var(y))]));

		let free = free_variables(&term);
		let expected: HashSet<Name> = if free.contains(&x) {
			free.iter().copied().filter(|&name| name != x).chain([y]).collect()
		} else {
			free
		};
		prop_assert_eq!(free_variables(&result), expected);
	}

	#[test]
	fn renaming_binders_preserves_alpha_equivalence(shape in shape()) {
		let mut interner = Rodeo::new();
		let names = names(&mut interner);
		let term = build(&shape, &names);

		// Substituting for a name that never occurs still renames every binder.
		let w = Name::new(interner.get_or_intern("w"));
		let renamed = term.substitute(&mut Supply::new(), &substitution([(w, Term::universe())]));
		prop_assert!(alpha_equivalent(&term, &renamed));
	}

	#[test]
	fn substitution_preserves_alpha_equivalence(shape in shape(), argument in shape(), x in 0..NAMES.len()) {
		let mut interner = Rodeo::new();
		let names = names(&mut interner);
		let w = Name::new(interner.get_or_intern("w"));
		let mut supply = Supply::new();
		let term = build(&shape, &names);
		let renamed = term.substitute(&mut supply, &substitution([(w, Term::universe())]));

		let assignment = substitution([(names[x], build(&argument, &names))]);
		let left = term.substitute(&mut supply, &assignment);
		let right = renamed.substitute(&mut supply, &assignment);
		prop_assert!(alpha_equivalent(&left, &right));
	}

	#[test]
	fn normal_forms_are_stable(shape in shape()) {
		let mut interner = Rodeo::new();
		let names = names(&mut interner);
		let environment = Environment::new(&mut interner);
		let mut supply = Supply::new();
		let term = build(&shape, &names);

		let normal = Normalizer::new(&environment, &mut supply).with_fuel(Some(64)).normalize(&term);
		prop_assume!(normal.is_ok());
		let normal = normal.unwrap();

		let mut normalizer = Normalizer::new(&environment, &mut supply).with_fuel(Some(64));
		let again = normalizer.normalize(&normal).unwrap();
		prop_assert!(alpha_equivalent(&normal, &again));
		prop_assert_eq!(normalizer.steps(), 0);
	}
}

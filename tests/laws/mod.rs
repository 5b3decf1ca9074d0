use idtt::{
	common::{bind, Name},
	ir::{
		syntax::Term,
		telescope::{Column, Telescope},
	},
	op::{execute::Outcome, substitute::alpha_equivalent, unparse::pretty_print, Checker, KernelError},
};
use lasso::Rodeo;

use crate::common::{last, run, run_with_fuel};

const PRELUDE: &str = r"
	\constant A U
	\constant B Π(x : A) => U
	\constant a A
	\constant c A
	\constant b B a
	\constant f Π(x : A) => A
";

fn after_prelude(command: &str) -> String { last(&format!("{PRELUDE}\n{command}")) }

#[test]
fn beta() {
	assert_eq!(after_prelude(r"\infer (λ(x : A) => f x) a"), "A");
	assert_eq!(after_prelude(r"\normalize (λ(x : A) => f x) a"), "f a");
}

#[test]
fn beta_for_the_polymorphic_identity() {
	let identity = r"(λ(t : U) => λ(x : t) => x)";
	assert_eq!(after_prelude(&format!(r"\infer {identity} A a")), "A");
	assert_eq!(after_prelude(&format!(r"\normalize {identity} A a")), "a");

	for (ty, term) in [("Σ(x : A) => B x", "a {x => B x} b"), ("Π(x : A) => A", "f"), ("U", "A")] {
		let source = format!(
			"{PRELUDE}
			\\infer {identity} ({ty}) ({term})
			\\normalize {ty}
			\\normalize {identity} ({ty}) ({term})
			\\normalize {term}"
		);
		let (_, mut checker, result) = run(&source);
		let outcomes = result.unwrap();
		let [
			..,
			Outcome::Inferred(inferred),
			Outcome::Normalized(ty),
			Outcome::Normalized(normal),
			Outcome::Normalized(term),
		] = &outcomes[..]
		else {
			panic!("unexpected outcomes for {source}")
		};
		assert!(alpha_equivalent(&checker.normalize(inferred).unwrap(), ty), "{source}");
		assert!(alpha_equivalent(normal, term), "{source}");
	}
}

#[test]
fn binders_do_not_capture_globals() {
	const GLOBALS: &str = "\\constant T U\n\\constant t T\n";

	let ty = last(&format!(r"{GLOBALS}\infer λ(T : U) => t"));
	assert!(ty.starts_with("Π(T#") && ty.ends_with(": U) => T"), "{ty}");
	assert_eq!(last(&format!(r"{GLOBALS}\infer (λ(T : U) => t) 2")), "T");

	let ty = last(&format!(r"{GLOBALS}\infer ap[T : U / ap[. T] : T == T . t]"));
	assert!(ty.starts_with("Id[T#") && ty.ends_with(" : U / ap[. T] : T == T . T][t, t]"), "{ty}");
}

#[test]
fn projections_of_a_pair() {
	assert_eq!(after_prelude(r"\normalize fst (a {x => B x} b)"), "a");
	assert_eq!(after_prelude(r"\normalize snd (a {x => B x} b)"), "b");
}

#[test]
fn pairs_inhabit_pointed_types() {
	assert_eq!(last(r"\infer λ(T : U) => λ(x : T) => T {t' => t'} x"), "Π(T : U) => Π(x : T) => Σ(t' : U) => t'");
}

#[test]
fn reflexivity() {
	assert_eq!(after_prelude(r"\infer ap[. a]"), "Id[. A][a, a]");
	assert_eq!(after_prelude(r"\normalize ap[. f a]"), "ap[. f a]");
}

#[test]
fn paths_in_the_unit_type_are_trivial() {
	assert_eq!(after_prelude(r"\normalize Id[. 1][*, *]"), "1");
}

#[test]
fn paths_in_a_sigma_type_split() {
	let normal = after_prelude(r"\normalize Id[. Σ(x : A) => B x][a {x => B x} b, a {x => B x} b]");
	assert!(normal.starts_with("Σ(x#"), "{normal}");
	assert!(normal.contains(": Id[. A][a, a]) => Id[x : A / x#"), "{normal}");
	assert!(normal.ends_with(": a == a . B x][b, b]"), "{normal}");
}

#[test]
fn paths_in_a_pi_type_are_pointwise() {
	let normal = after_prelude(r"\normalize Id[. Π(x : A) => A][f, f]");
	assert!(normal.starts_with("Π(x#"), "{normal}");
	// The codomain does not depend on the domain, so the inner path type loses its column.
	assert!(normal.contains("=> Id[. A][f x#"), "{normal}");
}

#[test]
fn unused_columns_collapse() {
	assert_eq!(after_prelude(r"\normalize ap[x : A / ap[. a] : a == a . c]"), "ap[. c]");
}

#[test]
fn reflexive_columns_contract() {
	assert_eq!(after_prelude(r"\normalize ap[x : A / ap[. a] : a == a . f x]"), "ap[. f a]");
	assert_eq!(after_prelude(r"\normalize ap[x : A / ap[. a] : a == a . x]"), "ap[. a]");
}

#[test]
fn ap_distributes_over_application() {
	assert_eq!(
		after_prelude(r"\normalize λ(p : Id[. A][a, a]) => ap[x : A / p : a == a . f x]"),
		"λ(p : Id[. A][a, a]) => ap[. f] a a p"
	);
}

#[test]
fn ap_over_a_pair_keeps_its_type() {
	let term = r"λ(p : Id[. A][a, c]) => ap[x : A / p : a == c . x {y => B y} (g x)]";
	let source = format!(
		"{PRELUDE}
		\\constant g Π(x : A) => B x
		\\infer {term}
		\\normalize {term}"
	);
	let (interner, mut checker, result) = run(&source);
	let outcomes = result.unwrap();
	let [.., Outcome::Inferred(ty), Outcome::Normalized(normal)] = &outcomes[..] else { panic!("{source}") };

	let printed = pretty_print(normal, &interner);
	assert!(printed.starts_with("λ(p : Id[. A][a, c]) => p {y#"), "{printed}");
	assert!(printed.contains(" => Id[y : A / y#"), "{printed}");
	assert!(printed.ends_with(" : a == c . B y][g a, g c]} ap[. g] a c p"), "{printed}");
	checker.check(normal, ty).unwrap();
}

#[test]
fn definitions_unfold() {
	let source = format!(
		"{PRELUDE}
		\\define cong λ(T : U)(S : U)(g : Π(x : T) => S)(s : T)(t : T)(p : Id[. T][s, t]) => ap[x : T / p : s == t . g x]
		\\normalize cong A A f a a ap[. a]"
	);
	assert_eq!(last(&source), "ap[. f] a a ap[. a]");
}

#[test]
fn ill_formed_telescopes_are_rejected_before_their_columns() {
	let mut interner = Rodeo::new();
	let mut checker = Checker::new(&mut interner);
	let builtins = *checker.environment().builtins();
	let [x, y] = ["x", "y"].map(|spelling| Name::new(interner.get_or_intern(spelling)));

	// None of these columns is well-typed.
	let junk = Term::constant(builtins.tt);
	let column = Column::new(junk.clone(), junk.clone(), junk.clone(), junk);
	let term = Term::ap(bind([x, y], Term::var(x)), Telescope(vec![column]));
	assert!(matches!(checker.infer(&term), Err(KernelError::MalformedTelescope { expected: 2, found: 1 })));
}

#[test]
fn normalization_is_idempotent() {
	for command in [
		r"\normalize (λ(x : A) => f x) a",
		r"\normalize Id[. Σ(x : A) => B x][a {x => B x} b, a {x => B x} b]",
		r"\normalize Id[. Π(x : A) => A][f, f]",
		r"\normalize ap[x : A / ap[. a] : a == a . f x]",
		r"\normalize λ(p : Σ(x : A) => B x) => (fst p) {x => B x} (snd p)",
	] {
		let (_, mut checker, result) = run(&format!("{PRELUDE}\n{command}"));
		let outcomes = result.unwrap();
		let Some(Outcome::Normalized(normal)) = outcomes.last() else { panic!("expected a normal form") };
		let again = checker.normalize(normal).unwrap();
		assert!(alpha_equivalent(normal, &again), "{command}");
	}
}

#[test]
fn fuel_bounds_normalization() {
	let source = "\\constant A U\n\\constant a A\n\\normalize (λ(x : A) => x) a";
	let (_, _, result) = run_with_fuel(source, Some(0));
	let error = result.unwrap_err();
	assert_eq!(error.index, 2);
	assert!(matches!(error.error, KernelError::OutOfFuel(0)));

	let (_, _, result) = run_with_fuel(source, None);
	assert!(result.is_ok());
}

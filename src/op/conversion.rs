use std::rc::Rc;

use tracing::trace;

use crate::{
	common::{Binder, Name},
	ir::syntax::Term,
	op::{
		check::Checker,
		error::KernelError,
		substitute::{alpha_equivalent, instantiate},
	},
};

impl Checker {
	/// Decides whether `left` and `right` are definitionally equal as inhabitants of `ty`.
	pub fn convertible(&mut self, left: &Rc<Term>, right: &Rc<Term>, ty: &Rc<Term>) -> Result<(), KernelError> {
		if left == right {
			return Ok(());
		}

		let ty = self.normalize(ty)?;
		trace!(at = ty.head(), "convertible");
		match ty.as_ref() {
			Term::Universe => self.convertible_types(left, right),

			// Function extensionality.
			Term::Pi { base, family } => {
				let (variable, codomain) = self.open(family)?;
				let mut scope = self.extend();
				scope.assume(variable, base.clone());
				scope.convertible(
					&Term::apply(left.clone(), Term::var(variable)),
					&Term::apply(right.clone(), Term::var(variable)),
					&codomain,
				)
			}

			// Surjective pairing.
			Term::Sg { base, family } => {
				self.convertible(&Term::fst(left.clone()), &Term::fst(right.clone()), base)?;
				let basepoint = self.normalize(&Term::fst(left.clone()))?;
				let fiber = instantiate(&mut self.supply, family, [basepoint]);
				self.convertible(&Term::snd(left.clone()), &Term::snd(right.clone()), &fiber)
			}

			ty if self.environment.is_proof_irrelevant(ty) => Ok(()),

			_ => {
				let left = self.normalize(left)?;
				let right = self.normalize(right)?;
				if alpha_equivalent(&left, &right) {
					Ok(())
				} else {
					Err(KernelError::UndecidedEquality { left, right, ty: ty.clone() })
				}
			}
		}
	}

	// Compares two types structurally, descending into Π- and Σ-types.
	fn convertible_types(&mut self, left: &Rc<Term>, right: &Rc<Term>) -> Result<(), KernelError> {
		let left = self.normalize(left)?;
		let right = self.normalize(right)?;
		match (left.as_ref(), right.as_ref()) {
			(Term::Pi { base: left_base, family: left_family }, Term::Pi { base: right_base, family: right_family })
			| (Term::Sg { base: left_base, family: left_family }, Term::Sg { base: right_base, family: right_family }) => {
				self.convertible(left_base, right_base, &Term::universe())?;
				let (variable, left_family) = self.open(left_family)?;
				let right_family = instantiate(&mut self.supply, right_family, [Term::var(variable)]);
				let mut scope = self.extend();
				scope.assume(variable, left_base.clone());
				scope.convertible(&left_family, &right_family, &Term::universe())
			}
			_ if alpha_equivalent(&left, &right) => Ok(()),
			// The left side is the type found, the right side the type expected.
			_ => Err(KernelError::mismatch(right.clone(), left.clone())),
		}
	}

	// Instantiates a unary binder with a variable fresh for this session.
	fn open(&mut self, binder: &Binder<Rc<Term>>) -> Result<(Name, Rc<Term>), KernelError> {
		let parameter =
			binder.parameter().ok_or(KernelError::MalformedBind { arity: binder.arity(), expected: 1 })?;
		let variable = self.supply.fresh(parameter);
		Ok((variable, instantiate(&mut self.supply, binder, [Term::var(variable)])))
	}
}

#[cfg(test)]
mod tests {
	use lasso::Rodeo;

	use super::*;
	use crate::ir::telescope::Telescope;

	fn setup() -> (Rodeo, Checker) {
		let mut interner = Rodeo::new();
		let checker = Checker::new(&mut interner).with_fuel(Some(10_000));
		(interner, checker)
	}

	#[test]
	fn alpha_equivalent_types_are_convertible() {
		let (mut interner, mut checker) = setup();
		let (x, y) = (Name::new(interner.get_or_intern("x")), Name::new(interner.get_or_intern("y")));
		let left = Term::pi(Term::universe(), x, Term::var(x));
		let right = Term::pi(Term::universe(), y, Term::var(y));
		assert!(checker.convertible(&left, &right, &Term::universe()).is_ok());
	}

	#[test]
	fn distinct_types_mismatch() {
		let (_, mut checker) = setup();
		let builtins = *checker.environment().builtins();
		let result =
			checker.convertible(&Term::constant(builtins.bool), &Term::constant(builtins.unit), &Term::universe());
		assert!(matches!(
			result,
			Err(KernelError::TypeMismatch { expected, found })
				if expected == Term::constant(builtins.unit) && found == Term::constant(builtins.bool)
		));
	}

	#[test]
	fn unit_inhabitants_are_all_equal() {
		let (mut interner, mut checker) = setup();
		let builtins = *checker.environment().builtins();
		let u = Name::new(interner.get_or_intern("u"));
		checker.assume(u, Term::constant(builtins.unit));
		let unit = Term::constant(builtins.unit);
		assert!(checker.convertible(&Term::var(u), &Term::constant(builtins.star), &unit).is_ok());
	}

	#[test]
	fn functions_are_compared_pointwise() {
		let (mut interner, mut checker) = setup();
		let builtins = *checker.environment().builtins();
		let (f, x, y) =
			(Name::new(interner.get_or_intern("f")), Name::new(interner.get_or_intern("x")), Name::new(interner.get_or_intern("y")));
		let boolean = Term::constant(builtins.bool);
		let function = Term::pi(boolean.clone(), x, boolean.clone());
		checker.assume(f, function.clone());

		// f and λ(y : 2) => f y are equal by extensionality.
		let expanded = Term::lambda(boolean, y, Term::apply(Term::var(f), Term::var(y)));
		assert!(checker.convertible(&Term::var(f), &expanded, &function).is_ok());
	}

	#[test]
	fn distinct_booleans_are_undecided() {
		let (_, mut checker) = setup();
		let builtins = *checker.environment().builtins();
		let result = checker.convertible(
			&Term::constant(builtins.tt),
			&Term::constant(builtins.ff),
			&Term::constant(builtins.bool),
		);
		assert!(matches!(result, Err(KernelError::UndecidedEquality { .. })));
	}

	#[test]
	fn refl_paths_in_the_unit_type_are_trivial() {
		let (_, mut checker) = setup();
		let builtins = *checker.environment().builtins();
		let star = Term::constant(builtins.star);
		let path = Term::id(Binder::closed(Term::constant(builtins.unit)), Telescope::empty(), star.clone(), star);
		assert!(checker.convertible(&path, &Term::constant(builtins.unit), &Term::universe()).is_ok());
	}
}

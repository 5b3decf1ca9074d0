use std::{
	ops::{Deref, DerefMut},
	rc::Rc,
};

use lasso::Rodeo;
use tracing::{debug, trace};

use crate::{
	common::{Binder, Field, Name},
	ir::{syntax::Term, telescope::Telescope},
	op::{
		environment::{Context, Environment},
		error::KernelError,
		normalize::Normalizer,
		substitute::{instantiate, substitute_scope, Substitute as _, Substitution, Supply},
	},
	utility::rc,
};

/// A checking session: the global environment, the local context, and the fresh-name supply.
pub struct Checker {
	pub(super) environment: Environment,
	pub(super) supply: Supply,
	pub(super) context: Context,
	fuel: Option<usize>,
}

/// A region of the context that is discarded when the guard is dropped.
pub struct Scope<'c> {
	checker: &'c mut Checker,
	len: usize,
}

impl<'c> Scope<'c> {
	fn new(checker: &'c mut Checker) -> Self {
		let len = checker.context.len();
		Self { checker, len }
	}
}

impl<'c> Deref for Scope<'c> {
	type Target = Checker;

	fn deref(&self) -> &Self::Target { self.checker }
}

impl<'c> DerefMut for Scope<'c> {
	fn deref_mut(&mut self) -> &mut Self::Target { self.checker }
}

impl<'c> Drop for Scope<'c> {
	fn drop(&mut self) { self.checker.context.truncate(self.len) }
}

impl Checker {
	pub fn new(interner: &mut Rodeo) -> Self {
		Self { environment: Environment::new(interner), supply: Supply::new(), context: Context::empty(), fuel: None }
	}

	/// Bounds every normalization this checker performs by `fuel` rewrite steps.
	pub fn with_fuel(mut self, fuel: Option<usize>) -> Self {
		self.fuel = fuel;
		self
	}

	pub fn environment(&self) -> &Environment { &self.environment }

	pub fn context(&self) -> &Context { &self.context }

	/// Opens a scope; hypotheses assumed through the guard are removed when it is dropped.
	pub fn extend(&mut self) -> Scope<'_> { Scope::new(self) }

	/// Adds a local hypothesis `name : ty`, shadowing any previous hypothesis of the same name.
	pub fn assume(&mut self, name: Name, ty: Rc<Term>) { self.context.push(name, ty) }

	/// Declares an opaque constant after checking that its type is a type.
	pub fn declare_constant(&mut self, name: Name, ty: Rc<Term>) -> Result<(), KernelError> {
		self.check(&ty, &Term::universe())?;
		debug!(?name, "declared constant");
		self.environment.declare_constant(name, ty);
		Ok(())
	}

	/// Declares a delta-reducible definition and returns its inferred type.
	pub fn declare_definition(&mut self, name: Name, body: Rc<Term>) -> Result<Rc<Term>, KernelError> {
		let ty = self.infer(&body)?;
		debug!(?name, "declared definition");
		self.environment.declare_definition(name, body, ty.clone());
		Ok(ty)
	}

	pub fn normalize(&mut self, term: &Rc<Term>) -> Result<Rc<Term>, KernelError> {
		let mut normalizer = Normalizer::new(&self.environment, &mut self.supply)
			.with_fuel(self.fuel)
			.with_context(self.context.iter());
		let normal = normalizer.normalize(term)?;
		trace!(steps = normalizer.steps(), "normalized");
		Ok(normal)
	}

	pub fn check(&mut self, term: &Rc<Term>, ty: &Rc<Term>) -> Result<(), KernelError> {
		let inferred = self.infer(term)?;
		self.convertible(&inferred, ty, &Term::universe())
	}

	pub fn infer(&mut self, term: &Rc<Term>) -> Result<Rc<Term>, KernelError> {
		trace!(head = term.head(), "infer");
		match term.as_ref() {
			Term::Variable(name) => self
				.context
				.lookup(*name)
				.or_else(|| self.environment.definition(*name).map(|definition| &definition.ty))
				.or_else(|| self.environment.constant(*name))
				.cloned()
				.ok_or(KernelError::UnboundVariable(*name)),
			Term::Constant(name) =>
				self.environment.constant(*name).cloned().ok_or(KernelError::UnknownConstant(*name)),
			Term::Universe => Ok(Term::universe()),

			Term::Pi { base, family } | Term::Sg { base, family } => {
				let (parameter, family) = self.open_local(family)?;
				self.check(base, &Term::universe())?;
				let mut scope = self.extend();
				scope.assume(parameter, base.clone());
				scope.check(&family, &Term::universe())?;
				Ok(Term::universe())
			}
			Term::Lambda { base, body } => {
				let (parameter, body) = self.open_local(body)?;
				self.check(base, &Term::universe())?;
				let codomain = {
					let mut scope = self.extend();
					scope.assume(parameter, base.clone());
					scope.infer(&body)?
				};
				Ok(Term::pi(base.clone(), parameter, codomain))
			}
			Term::Apply { scrutinee, argument } => {
				let scrutinee_ty = self.infer(scrutinee)?;
				let scrutinee_ty = self.normalize(&scrutinee_ty)?;
				let Term::Pi { base, family } = scrutinee_ty.as_ref() else {
					return Err(KernelError::NotAFunctionType(scrutinee_ty.clone()));
				};
				unary(family)?;
				self.check(argument, base)?;
				Ok(instantiate(&mut self.supply, family, [argument.clone()]))
			}

			Term::Pair { motive, basepoint, fiberpoint } => {
				let (parameter, family) = self.open_local(motive)?;
				let base = self.infer(basepoint)?;
				{
					let mut scope = self.extend();
					scope.assume(parameter, base.clone());
					scope.check(&family, &Term::universe())?;
				}
				let fiber = instantiate(&mut self.supply, motive, [basepoint.clone()]);
				self.check(fiberpoint, &fiber)?;
				Ok(rc!(Term::Sg { base, family: motive.clone() }))
			}
			Term::Project(scrutinee, field) => {
				let scrutinee_ty = self.infer(scrutinee)?;
				let scrutinee_ty = self.normalize(&scrutinee_ty)?;
				let Term::Sg { base, family } = scrutinee_ty.as_ref() else {
					return Err(KernelError::NotAPairType(scrutinee_ty.clone()));
				};
				unary(family)?;
				match field {
					Field::Base => Ok(base.clone()),
					Field::Fiber => Ok(instantiate(&mut self.supply, family, [Term::fst(scrutinee.clone())])),
				}
			}

			Term::Id { family, telescope, left, right } => {
				let (family, telescope) = &self.open_scope(family, telescope);
				self.check_telescope(&family.parameters, telescope)?;
				{
					let mut scope = self.extend();
					for (&parameter, column) in family.parameters.iter().zip(telescope.iter()) {
						scope.assume(parameter, column.ty.clone());
					}
					scope.check(&family.body, &Term::universe())?;
				}
				let left_ty = self.restrict(family, telescope.lefts());
				self.check(left, &left_ty)?;
				let right_ty = self.restrict(family, telescope.rights());
				self.check(right, &right_ty)?;
				Ok(Term::universe())
			}
			Term::Ap { family, telescope } => {
				let (family, telescope) = &self.open_scope(family, telescope);
				self.check_telescope(&family.parameters, telescope)?;
				let motive = {
					let mut scope = self.extend();
					for (&parameter, column) in family.parameters.iter().zip(telescope.iter()) {
						scope.assume(parameter, column.ty.clone());
					}
					scope.infer(&family.body)?
				};
				let left = self.restrict(family, telescope.lefts());
				let right = self.restrict(family, telescope.rights());
				Ok(Term::id(Binder::new(family.parameters.clone(), motive), telescope.clone(), left, right))
			}
		}
	}

	// Checks the columns of a telescope in order. Each column's type is checked under the earlier
	// parameters, its endpoints at that type restricted to the earlier endpoints, and its witness
	// against the path type over the earlier columns.
	fn check_telescope(&mut self, parameters: &[Name], telescope: &Telescope) -> Result<(), KernelError> {
		if parameters.len() != telescope.len() {
			return Err(KernelError::MalformedTelescope { expected: parameters.len(), found: telescope.len() });
		}
		for (i, column) in telescope.iter().enumerate() {
			{
				let mut scope = self.extend();
				for (&parameter, earlier) in parameters.iter().zip(telescope.iter()).take(i) {
					scope.assume(parameter, earlier.ty.clone());
				}
				scope.check(&column.ty, &Term::universe())?;
			}
			let earlier = Binder::new(parameters[..i].into(), column.ty.clone());
			let prefix = telescope.prefix(i);
			let left_ty = self.restrict(&earlier, prefix.lefts());
			self.check(&column.left, &left_ty)?;
			let right_ty = self.restrict(&earlier, prefix.rights());
			self.check(&column.right, &right_ty)?;
			let witness_ty = Term::id(earlier, prefix, column.left.clone(), column.right.clone());
			self.check(&column.witness, &witness_ty)?;
		}
		Ok(())
	}

	fn in_scope(&self, name: Name) -> bool { self.context.lookup(name).is_some() || self.environment.is_declared(name) }

	// Opens a unary binder for checking its body. The parameter keeps its own name unless that name
	// is already in scope, where assuming it would capture references to the outer binding.
	fn open_local(&mut self, binder: &Binder<Rc<Term>>) -> Result<(Name, Rc<Term>), KernelError> {
		let parameter = unary(binder)?;
		if !self.in_scope(parameter) {
			return Ok((parameter, binder.body.clone()));
		}
		let local = self.supply.fresh(parameter);
		Ok((local, instantiate(&mut self.supply, binder, [Term::var(local)])))
	}

	// Renames the parameters of an `Id` or `ap` node apart from the context when any of them clashes
	// with a name in scope or with an earlier parameter.
	fn open_scope(&mut self, family: &Binder<Rc<Term>>, telescope: &Telescope) -> (Binder<Rc<Term>>, Telescope) {
		let parameters = &family.parameters;
		let clashes = parameters.iter().enumerate().any(|(i, &parameter)| {
			self.in_scope(parameter) || parameters[..i].contains(&parameter)
		});
		if clashes {
			substitute_scope(&mut self.supply, &Substitution::new(), family, telescope)
		} else {
			(family.clone(), telescope.clone())
		}
	}

	// Substitutes one endpoint of each column for the corresponding parameter.
	fn restrict<'t>(&mut self, family: &Binder<Rc<Term>>, endpoints: impl Iterator<Item = &'t Rc<Term>>) -> Rc<Term> {
		let substitution: Substitution = family.parameters.iter().copied().zip(endpoints.cloned()).collect();
		family.body.substitute(&mut self.supply, &substitution)
	}
}

fn unary(binder: &Binder<Rc<Term>>) -> Result<Name, KernelError> {
	binder.parameter().ok_or(KernelError::MalformedBind { arity: binder.arity(), expected: 1 })
}

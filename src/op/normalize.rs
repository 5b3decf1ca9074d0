use std::rc::Rc;

use tracing::trace;

use crate::{
	common::{bind, Binder, Field, Name},
	ir::{
		syntax::Term,
		telescope::{Column, Telescope},
	},
	op::{
		environment::Environment,
		error::KernelError,
		substitute::{
			alpha_equivalent_telescopes, free_variables, instantiate, occurs_free, substitution, Substitute as _,
			Substitution, Supply,
		},
	},
	utility::rc,
};

/// Reduces terms to normal form by innermost-first rewriting.
pub struct Normalizer<'a> {
	environment: &'a Environment,
	supply: &'a mut Supply,
	// Names that are locally bound and so must not be unfolded as globals, with their types when known.
	locals: Vec<(Name, Option<Rc<Term>>)>,
	fuel: Option<usize>,
	steps: usize,
}

impl<'a> Normalizer<'a> {
	pub fn new(environment: &'a Environment, supply: &'a mut Supply) -> Self {
		Self { environment, supply, locals: Vec::new(), fuel: None, steps: 0 }
	}

	/// Caps the number of rewrite steps a single normalizer may take.
	pub fn with_fuel(mut self, fuel: Option<usize>) -> Self {
		self.fuel = fuel;
		self
	}

	/// Adds local hypotheses, innermost last. They shadow global definitions and constants, and their
	/// types let the normalizer read off the types some rewrites need.
	pub fn with_context(mut self, hypotheses: impl IntoIterator<Item = (Name, Rc<Term>)>) -> Self {
		self.locals.extend(hypotheses.into_iter().map(|(name, ty)| (name, Some(ty))));
		self
	}

	pub fn steps(&self) -> usize { self.steps }

	pub fn normalize(&mut self, term: &Rc<Term>) -> Result<Rc<Term>, KernelError> {
		let term = self.normalize_children(term)?;
		match self.rewrite(&term)? {
			Some(reduct) => {
				self.spend()?;
				self.normalize(&reduct)
			}
			None => Ok(term),
		}
	}

	fn spend(&mut self) -> Result<(), KernelError> {
		if self.fuel.is_some_and(|fuel| self.steps >= fuel) {
			return Err(KernelError::OutOfFuel(self.steps));
		}
		self.steps += 1;
		Ok(())
	}

	// Normalizes the body of a binder whose parameters have the given types, as far as they are known.
	fn normalize_binder(
		&mut self,
		binder: &Binder<Rc<Term>>,
		types: &[Rc<Term>],
	) -> Result<Binder<Rc<Term>>, KernelError> {
		let locals = binder.parameters.iter().enumerate().map(|(i, &parameter)| (parameter, types.get(i).cloned()));
		let locals: Vec<_> = locals.collect();
		let body = self.assuming(locals, |this| this.normalize(&binder.body))?;
		Ok(Binder::new(binder.parameters.clone(), body))
	}

	fn assuming<T>(
		&mut self,
		locals: impl IntoIterator<Item = (Name, Option<Rc<Term>>)>,
		f: impl FnOnce(&mut Self) -> T,
	) -> T {
		let depth = self.locals.len();
		self.locals.extend(locals);
		let result = f(self);
		self.locals.truncate(depth);
		result
	}

	fn is_local(&self, name: Name) -> bool { self.locals.iter().any(|(local, _)| *local == name) }

	fn normalize_scope(
		&mut self,
		family: &Binder<Rc<Term>>,
		telescope: &Telescope,
	) -> Result<(Binder<Rc<Term>>, Telescope), KernelError> {
		let mut columns: Vec<Column> = Vec::with_capacity(telescope.len());
		for (i, column) in telescope.iter().enumerate() {
			let left = self.normalize(&column.left)?;
			let right = self.normalize(&column.right)?;
			let witness = self.normalize(&column.witness)?;
			let earlier: Vec<_> =
				family.parameters.iter().copied().zip(columns.iter().map(|column| Some(column.ty.clone()))).collect();
			let ty = self.assuming(earlier, |this| this.normalize(&column.ty))?;
			columns.push(Column::new(ty, left, right, witness));
		}
		let types: Vec<_> = columns.iter().map(|column| column.ty.clone()).collect();
		Ok((self.normalize_binder(family, &types)?, Telescope(columns)))
	}

	fn normalize_children(&mut self, term: &Rc<Term>) -> Result<Rc<Term>, KernelError> {
		Ok(match term.as_ref() {
			Term::Variable(_) | Term::Constant(_) | Term::Universe => term.clone(),
			Term::Pi { base, family } => {
				let base = self.normalize(base)?;
				let family = self.normalize_binder(family, &[base.clone()])?;
				rc!(Term::Pi { base, family })
			}
			Term::Lambda { base, body } => {
				let base = self.normalize(base)?;
				let body = self.normalize_binder(body, &[base.clone()])?;
				rc!(Term::Lambda { base, body })
			}
			Term::Apply { scrutinee, argument } =>
				rc!(Term::Apply { scrutinee: self.normalize(scrutinee)?, argument: self.normalize(argument)? }),
			Term::Sg { base, family } => {
				let base = self.normalize(base)?;
				let family = self.normalize_binder(family, &[base.clone()])?;
				rc!(Term::Sg { base, family })
			}
			Term::Pair { motive, basepoint, fiberpoint } => rc!(Term::Pair {
				motive: self.normalize_binder(motive, &[])?,
				basepoint: self.normalize(basepoint)?,
				fiberpoint: self.normalize(fiberpoint)?,
			}),
			Term::Project(scrutinee, field) => rc!(Term::Project(self.normalize(scrutinee)?, *field)),
			Term::Id { family, telescope, left, right } => {
				let (family, telescope) = self.normalize_scope(family, telescope)?;
				rc!(Term::Id { family, telescope, left: self.normalize(left)?, right: self.normalize(right)? })
			}
			Term::Ap { family, telescope } => {
				let (family, telescope) = self.normalize_scope(family, telescope)?;
				rc!(Term::Ap { family, telescope })
			}
		})
	}

	/// Attempts a single rewrite at the root of a term whose children are already normal.
	fn rewrite(&mut self, term: &Rc<Term>) -> Result<Option<Rc<Term>>, KernelError> {
		Ok(match term.as_ref() {
			// Delta-reduction.
			Term::Variable(name) if !self.is_local(*name) => {
				if let Some(definition) = self.environment.definition(*name) {
					trace!(rule = "delta", "rewrite");
					Some(definition.body.clone())
				} else if self.environment.constant(*name).is_some() {
					Some(Term::constant(*name))
				} else {
					None
				}
			}

			// Beta-reduction.
			Term::Apply { scrutinee, argument } => match scrutinee.as_ref() {
				Term::Lambda { body, .. } => {
					trace!(rule = "beta", "rewrite");
					Some(instantiate(self.supply, body, [argument.clone()]))
				}
				_ => None,
			},

			// Projections.
			Term::Project(scrutinee, field) => match (scrutinee.as_ref(), field) {
				(Term::Pair { basepoint, .. }, Field::Base) => Some(basepoint.clone()),
				(Term::Pair { fiberpoint, .. }, Field::Fiber) => Some(fiberpoint.clone()),
				_ => None,
			},

			// Paths.
			Term::Id { family, telescope, left, right } if family.arity() == telescope.len() =>
				if let Some((family, telescope)) = self.shrink(family, telescope) {
					Some(Term::id(family, telescope, left.clone(), right.clone()))
				} else {
					self.compute_id(family, telescope, left, right)
				},
			Term::Ap { family, telescope } if family.arity() == telescope.len() && !telescope.is_empty() =>
				if let Some((family, telescope)) = self.shrink(family, telescope) {
					Some(Term::ap(family, telescope))
				} else {
					self.compute_ap(family, telescope)
				},

			_ => None,
		})
	}

	/// Drops a telescope column by weakening, or the last one by contraction along an `ap` witness.
	fn shrink(&mut self, family: &Binder<Rc<Term>>, telescope: &Telescope) -> Option<(Binder<Rc<Term>>, Telescope)> {
		let parameters = &family.parameters;

		// Weakening: a variable that neither the motive nor the type of a later column mentions.
		let unused = (0..parameters.len()).rev().find(|&i| {
			!occurs_free(&family.body, parameters[i])
				&& telescope.iter().skip(i + 1).all(|column| !occurs_free(&column.ty, parameters[i]))
		});
		if let Some(i) = unused {
			trace!(rule = "collapse", "rewrite");
			let mut parameters = parameters.to_vec();
			parameters.remove(i);
			let mut columns = telescope.0.clone();
			columns.remove(i);
			return Some((bind(parameters, family.body.clone()), Telescope(columns)));
		}

		let (&last, init) = parameters.split_last()?;
		let (prefix, column) = telescope.split_last()?;

		// Contraction: the last path is itself the action of a family over the remaining telescope.
		let Term::Ap { family: inner, telescope: inner_telescope } = column.witness.as_ref() else {
			return None;
		};
		if !alpha_equivalent_telescopes((&inner.parameters[..], inner_telescope), (init, &prefix)) {
			return None;
		}
		trace!(rule = "contract", "rewrite");
		let replacement = instantiate(self.supply, inner, init.iter().copied().map(Term::var));
		let body = family.body.substitute(self.supply, &substitution([(last, replacement)]));
		Some((bind(init, body), prefix))
	}

	fn compute_id(
		&mut self,
		family: &Binder<Rc<Term>>,
		telescope: &Telescope,
		left: &Rc<Term>,
		right: &Rc<Term>,
	) -> Option<Rc<Term>> {
		let parameters = &family.parameters;
		match family.body.as_ref() {
			Term::Sg { base, family: fiber } => {
				let (y, fiber) = self.open_beside(parameters, fiber)?;
				trace!(rule = "id-sigma", "rewrite");
				let e = self.supply.fresh(y);
				let (base_left, base_right) = (Term::fst(left.clone()), Term::fst(right.clone()));
				let base_path =
					Term::id(bind(parameters.clone(), base.clone()), telescope.clone(), base_left.clone(), base_right.clone());
				let fiber_path = Term::id(
					bind(extend(parameters, y), fiber),
					telescope.extended(Column::new(base.clone(), base_left, base_right, Term::var(e))),
					Term::snd(left.clone()),
					Term::snd(right.clone()),
				);
				Some(Term::sg(base_path, e, fiber_path))
			}
			Term::Pi { base, family: fiber } => {
				let (y, fiber) = self.open_beside(parameters, fiber)?;
				trace!(rule = "id-pi", "rewrite");
				let (u, v, e) = (self.supply.fresh(y), self.supply.fresh(y), self.supply.fresh(y));
				let base_left = base.substitute(self.supply, &endpoints(parameters, telescope.lefts()));
				let base_right = base.substitute(self.supply, &endpoints(parameters, telescope.rights()));
				let base_path =
					Term::id(bind(parameters.clone(), base.clone()), telescope.clone(), Term::var(u), Term::var(v));
				let fiber_path = Term::id(
					bind(extend(parameters, y), fiber),
					telescope.extended(Column::new(base.clone(), Term::var(u), Term::var(v), Term::var(e))),
					Term::apply(left.clone(), Term::var(u)),
					Term::apply(right.clone(), Term::var(v)),
				);
				Some(Term::pi(base_left, u, Term::pi(base_right, v, Term::pi(base_path, e, fiber_path))))
			}
			ty if self.environment.is_proof_irrelevant(ty) => {
				trace!(rule = "id-truncated", "rewrite");
				Some(Term::constant(self.environment.builtins().unit))
			}
			// NOTE: Paths over a variable family, the universe, or another path type are stuck.
			_ => None,
		}
	}

	fn compute_ap(&mut self, family: &Binder<Rc<Term>>, telescope: &Telescope) -> Option<Rc<Term>> {
		let parameters = &family.parameters;
		let under = |body: &Rc<Term>| Term::ap(bind(parameters.clone(), body.clone()), telescope.clone());
		match family.body.as_ref() {
			Term::Variable(x) => {
				let i = parameters.iter().position(|p| p == x)?;
				trace!(rule = "ap-variable", "rewrite");
				Some(telescope.column(i)?.witness.clone())
			}
			Term::Project(scrutinee, field) => {
				trace!(rule = "ap-project", "rewrite");
				Some(rc!(Term::Project(under(scrutinee), *field)))
			}
			// The fiber path runs over the base path, so the column it adds needs the type of the basepoint.
			Term::Pair { motive, basepoint, fiberpoint } => {
				let types = telescope.iter().map(|column| Some(column.ty.clone()));
				let columns = parameters.iter().copied().zip(types);
				let base = self.assuming(columns.collect::<Vec<_>>(), |this| this.synthesize(basepoint))?;
				let (y, fiber) = self.open_beside(parameters, motive)?;
				trace!(rule = "ap-pair", "rewrite");
				let e = self.supply.fresh(y);
				let base_left = basepoint.substitute(self.supply, &endpoints(parameters, telescope.lefts()));
				let base_right = basepoint.substitute(self.supply, &endpoints(parameters, telescope.rights()));
				let fiber_left = fiberpoint.substitute(self.supply, &endpoints(parameters, telescope.lefts()));
				let fiber_right = fiberpoint.substitute(self.supply, &endpoints(parameters, telescope.rights()));
				let fiber_path = Term::id(
					bind(extend(parameters, y), fiber),
					telescope.extended(Column::new(base, base_left, base_right, Term::var(e))),
					fiber_left,
					fiber_right,
				);
				Some(Term::pair(e, fiber_path, under(basepoint), under(fiberpoint)))
			}
			Term::Apply { scrutinee, argument } => {
				trace!(rule = "ap-apply", "rewrite");
				let argument_left = argument.substitute(self.supply, &endpoints(parameters, telescope.lefts()));
				let argument_right = argument.substitute(self.supply, &endpoints(parameters, telescope.rights()));
				Some(Term::apply_all(under(scrutinee), [argument_left, argument_right, under(argument)]))
			}
			Term::Lambda { base, body } => {
				let (y, body) = self.open_beside(parameters, body)?;
				trace!(rule = "ap-lambda", "rewrite");
				let (u, v, e) = (self.supply.fresh(y), self.supply.fresh(y), self.supply.fresh(y));
				let base_left = base.substitute(self.supply, &endpoints(parameters, telescope.lefts()));
				let base_right = base.substitute(self.supply, &endpoints(parameters, telescope.rights()));
				let base_path =
					Term::id(bind(parameters.clone(), base.clone()), telescope.clone(), Term::var(u), Term::var(v));
				let body_path = Term::ap(
					bind(extend(parameters, y), body),
					telescope.extended(Column::new(base.clone(), Term::var(u), Term::var(v), Term::var(e))),
				);
				Some(Term::lambda(base_left, u, Term::lambda(base_right, v, Term::lambda(base_path, e, body_path))))
			}
			_ => None,
		}
	}

	// Opens a unary binder whose parameter is about to join `parameters`, renaming it on a clash.
	fn open_beside(&mut self, parameters: &[Name], binder: &Binder<Rc<Term>>) -> Option<(Name, Rc<Term>)> {
		let parameter = binder.parameter()?;
		if !parameters.contains(&parameter) {
			return Some((parameter, binder.body.clone()));
		}
		let fresh = self.supply.fresh(parameter);
		Some((fresh, instantiate(self.supply, binder, [Term::var(fresh)])))
	}

	/// Reads the type of a normal term off its annotations and the types of the names it mentions.
	///
	/// Returns `None` when some name has no known type, when the term is ill-typed, or when the type
	/// would mention a name that has since been rebound.
	fn synthesize(&mut self, term: &Rc<Term>) -> Option<Rc<Term>> {
		match term.as_ref() {
			Term::Variable(name) => match self.locals.iter().rposition(|(local, _)| local == name) {
				Some(position) => {
					let ty = self.locals[position].1.clone()?;
					self.unshadowed(ty, position + 1)
				}
				None => {
					let definition = self.environment.definition(*name).map(|definition| &definition.ty);
					let ty = definition.or_else(|| self.environment.constant(*name))?.clone();
					self.unshadowed(ty, 0)
				}
			},
			Term::Constant(name) => {
				let ty = self.environment.constant(*name)?.clone();
				self.unshadowed(ty, 0)
			}
			Term::Universe | Term::Pi { .. } | Term::Sg { .. } | Term::Id { .. } => Some(Term::universe()),

			Term::Lambda { base, body } => {
				let parameter = body.parameter()?;
				let codomain = self.assuming([(parameter, Some(base.clone()))], |this| this.synthesize(&body.body))?;
				Some(Term::pi(base.clone(), parameter, codomain))
			}
			Term::Apply { scrutinee, argument } => {
				let ty = self.synthesize(scrutinee)?;
				let ty = self.expose(&ty)?;
				let Term::Pi { family, .. } = ty.as_ref() else { return None };
				Some(instantiate(self.supply, family, [argument.clone()]))
			}

			Term::Pair { motive, basepoint, .. } =>
				Some(rc!(Term::Sg { base: self.synthesize(basepoint)?, family: motive.clone() })),
			Term::Project(scrutinee, field) => {
				let ty = self.synthesize(scrutinee)?;
				let ty = self.expose(&ty)?;
				let Term::Sg { base, family } = ty.as_ref() else { return None };
				match field {
					Field::Base => Some(base.clone()),
					Field::Fiber => Some(instantiate(self.supply, family, [Term::fst(scrutinee.clone())])),
				}
			}

			Term::Ap { family, telescope } => {
				let types = telescope.iter().map(|column| Some(column.ty.clone()));
				let columns = family.parameters.iter().copied().zip(types);
				let motive = self.assuming(columns.collect::<Vec<_>>(), |this| this.synthesize(&family.body))?;
				let left = family.body.substitute(self.supply, &endpoints(&family.parameters, telescope.lefts()));
				let right = family.body.substitute(self.supply, &endpoints(&family.parameters, telescope.rights()));
				Some(Term::id(bind(family.parameters.clone(), motive), telescope.clone(), left, right))
			}
		}
	}

	// Keeps `ty` only if no local from `from` onwards rebinds a name it mentions.
	fn unshadowed(&self, ty: Rc<Term>, from: usize) -> Option<Rc<Term>> {
		let free = free_variables(&ty);
		self.locals[from..].iter().all(|(local, _)| !free.contains(local)).then_some(ty)
	}

	// Normalizes a synthesized type with its own step count.
	fn expose(&mut self, ty: &Rc<Term>) -> Option<Rc<Term>> {
		let mut normalizer = Normalizer {
			environment: self.environment,
			supply: &mut *self.supply,
			locals: self.locals.clone(),
			fuel: self.fuel,
			steps: 0,
		};
		normalizer.normalize(ty).ok()
	}
}

fn extend(parameters: &[Name], parameter: Name) -> Vec<Name> {
	let mut parameters = parameters.to_vec();
	parameters.push(parameter);
	parameters
}

// Sends each parameter to the corresponding endpoint of the telescope.
fn endpoints<'t>(parameters: &[Name], endpoints: impl Iterator<Item = &'t Rc<Term>>) -> Substitution {
	parameters.iter().copied().zip(endpoints.cloned()).collect()
}

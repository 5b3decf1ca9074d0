use std::rc::Rc;

use crate::{ir::syntax::Term, op::error::KernelError};

/// One position of a telescope: a type, two inhabitants of it, and a path between them.
#[derive(Clone, PartialEq, Debug)]
pub struct Column {
	pub ty: Rc<Term>,
	pub left: Rc<Term>,
	pub right: Rc<Term>,
	pub witness: Rc<Term>,
}

impl Column {
	pub fn new(ty: Rc<Term>, left: Rc<Term>, right: Rc<Term>, witness: Rc<Term>) -> Self {
		Self { ty, left, right, witness }
	}
}

/// The chain of columns attached to an `Id` or `ap` node.
///
/// The type of column `i` may mention the first `i` parameters of the node's binder; the remaining
/// components live outside the binder.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Telescope(pub Vec<Column>);

impl Telescope {
	pub fn empty() -> Self { Self(Vec::new()) }

	pub fn len(&self) -> usize { self.0.len() }

	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	pub fn iter(&self) -> std::slice::Iter<'_, Column> { self.0.iter() }

	pub fn column(&self, index: usize) -> Option<&Column> { self.0.get(index) }

	/// Zips four parallel sequences into columns; all four must have the same length.
	pub fn from_columns(
		types: Vec<Rc<Term>>,
		lefts: Vec<Rc<Term>>,
		rights: Vec<Rc<Term>>,
		witnesses: Vec<Rc<Term>>,
	) -> Result<Self, KernelError> {
		let expected = types.len();
		for found in [lefts.len(), rights.len(), witnesses.len()] {
			if found != expected {
				return Err(KernelError::MalformedTelescope { expected, found });
			}
		}
		Ok(Self(
			types
				.into_iter()
				.zip(lefts)
				.zip(rights)
				.zip(witnesses)
				.map(|(((ty, left), right), witness)| Column::new(ty, left, right, witness))
				.collect(),
		))
	}

	/// Splits a flat argument list `types ++ lefts ++ rights ++ witnesses` into columns.
	pub fn from_flat(mut terms: Vec<Rc<Term>>) -> Result<Self, KernelError> {
		if terms.len() % 4 != 0 {
			return Err(KernelError::MalformedTelescope {
				expected: terms.len() / 4 * 4,
				found: terms.len(),
			});
		}
		let n = terms.len() / 4;
		let witnesses = terms.split_off(3 * n);
		let rights = terms.split_off(2 * n);
		let lefts = terms.split_off(n);
		Self::from_columns(terms, lefts, rights, witnesses)
	}

	pub fn lefts(&self) -> impl Iterator<Item = &Rc<Term>> { self.iter().map(|column| &column.left) }

	pub fn rights(&self) -> impl Iterator<Item = &Rc<Term>> { self.iter().map(|column| &column.right) }

	/// The first `len` columns.
	pub fn prefix(&self, len: usize) -> Self { Self(self.0[..len.min(self.len())].to_vec()) }

	pub fn split_last(&self) -> Option<(Self, &Column)> {
		let (last, init) = self.0.split_last()?;
		Some((Self(init.to_vec()), last))
	}

	pub fn extended(&self, column: Column) -> Self {
		let mut columns = self.0.clone();
		columns.push(column);
		Self(columns)
	}
}

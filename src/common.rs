use lasso::Spur;

pub type Symbol = Spur;

/// A variable name: an interned base symbol and a tag distinguishing renamed copies of it.
///
/// Names written in source carry tag zero; the fresh-name supply only hands out nonzero tags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Name {
	pub symbol: Symbol,
	pub tag: u32,
}

impl Name {
	pub fn new(symbol: Symbol) -> Self { Self { symbol, tag: 0 } }

	pub fn is_source(self) -> bool { self.tag == 0 }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
	Base,
	Fiber,
}

/// A scope introducing any number of names over a body.
#[derive(Clone, PartialEq, Debug)]
pub struct Binder<T> {
	pub parameters: Box<[Name]>,
	pub body: T,
}

impl<T> Binder<T> {
	pub fn new(parameters: Box<[Name]>, body: T) -> Self { Self { parameters, body } }

	/// A binder introducing no names.
	pub fn closed(body: T) -> Self { Self::new(Box::default(), body) }

	pub fn arity(&self) -> usize { self.parameters.len() }

	/// Returns the parameter of a binder that should bind exactly one name.
	pub fn parameter(&self) -> Option<Name> {
		match *self.parameters {
			[parameter] => Some(parameter),
			_ => None,
		}
	}
}

pub fn bind<T>(parameters: impl Into<Box<[Name]>>, body: impl Into<T>) -> Binder<T> {
	Binder::new(parameters.into(), body.into())
}

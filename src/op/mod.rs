pub mod check;
pub mod conversion;
pub mod environment;
pub mod error;
pub mod execute;
pub mod lower;
pub mod normalize;
pub mod parse;
pub mod substitute;
pub mod unparse;

pub use check::Checker;
pub use error::KernelError;

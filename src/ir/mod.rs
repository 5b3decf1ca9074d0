pub mod derived;
pub mod presyntax;
pub mod source;
pub mod syntax;
pub mod telescope;

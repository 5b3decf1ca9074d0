use std::fs;

use idtt::{
	ir::source::lex,
	op::{execute::execute, parse::parse, Checker},
};
use lasso::Rodeo;

use crate::common::{programs, FUEL};

/// Ensures every program in `tests/fail/programs` lexes and parses, but is rejected by the checker.
#[test]
fn run_fail_tests() {
	for path in programs("tests/fail/programs") {
		let path_str = path.as_os_str().to_str().unwrap().to_owned();
		let source = fs::read_to_string(path).expect(&path_str);
		let lexed_source = lex(&source).ok().expect(&path_str);
		let mut interner = Rodeo::new();
		let program = parse(&lexed_source, &mut interner).expect(&path_str);
		let mut checker = Checker::new(&mut interner).with_fuel(FUEL);
		assert!(execute(&mut checker, &program).is_err(), "{path_str}");
	}
}

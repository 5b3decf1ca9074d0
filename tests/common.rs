use std::{
	ffi::OsStr,
	fs,
	path::{Path, PathBuf},
};

use idtt::{
	ir::source::lex,
	op::{
		execute::{execute, ExecutionError, Outcome},
		parse::parse,
		unparse::pretty_print,
		Checker,
	},
	report::report_execution_error,
};
use lasso::Rodeo;

pub const EXTENSION: &str = "tt";

pub const FUEL: Option<usize> = Some(100_000);

pub fn programs(directory: impl AsRef<Path>) -> impl Iterator<Item = PathBuf> {
	fs::read_dir(directory)
		.unwrap()
		.flatten()
		.map(|x| x.path())
		.filter(|x| x.extension() == Some(OsStr::new(EXTENSION)))
}

/// Runs a program, returning the interner, the session it ran in, and the outcome of its commands.
pub fn run_with_fuel(source: &str, fuel: Option<usize>) -> (Rodeo, Checker, Result<Vec<Outcome>, ExecutionError>) {
	let lexed_source = lex(source).ok().expect(source);
	let mut interner = Rodeo::new();
	let program = parse(&lexed_source, &mut interner).expect(source);
	let mut checker = Checker::new(&mut interner).with_fuel(fuel);
	let result = execute(&mut checker, &program);
	(interner, checker, result)
}

pub fn run(source: &str) -> (Rodeo, Checker, Result<Vec<Outcome>, ExecutionError>) { run_with_fuel(source, FUEL) }

pub fn pass_program(path: PathBuf) -> (Vec<Outcome>, Rodeo) {
	let path_str = path.as_os_str().to_str().unwrap().to_owned();
	let source = fs::read_to_string(path).expect(&path_str);
	let lexed_source = lex(&source).ok().expect(&path_str);
	let mut interner = Rodeo::new();
	let program = parse(&lexed_source, &mut interner).expect(&path_str);
	let mut checker = Checker::new(&mut interner).with_fuel(FUEL);
	match execute(&mut checker, &program) {
		Ok(outcomes) => (outcomes, interner),
		Err(error) => {
			report_execution_error(&lexed_source, &interner, error);
			panic!("{}", path_str);
		}
	}
}

/// Prints the result of a program's last command.
pub fn last(source: &str) -> String {
	let (interner, _, result) = run(source);
	let outcomes = result.unwrap_or_else(|error| panic!("{source}: {:?}", error.error));
	match outcomes.last().expect(source) {
		Outcome::Declared(name) | Outcome::Defined { name, .. } => interner.resolve(&name.symbol).to_owned(),
		Outcome::Inferred(term) | Outcome::Normalized(term) => pretty_print(term, &interner),
	}
}

use std::process::ExitCode;

use bpaf::{construct, long, short, Parser};
use idtt::{
	ir::source::lex,
	op::{
		execute::{execute_command, ExecutionError, Outcome},
		parse::parse,
		unparse::pretty_print,
		Checker,
	},
	report::{report_execution_error, report_parse_error, report_tokenization_error},
};
use lasso::Rodeo;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn run(source: &str, fuel: Option<usize>) -> ExitCode {
	// Parsing.
	let lexed_source = match lex(source) {
		Ok(x) => x,
		Err(e) => {
			report_tokenization_error(source, e);
			return ExitCode::FAILURE;
		}
	};

	let mut interner = Rodeo::new();
	let program = match parse(&lexed_source, &mut interner) {
		Ok(x) => x,
		Err(e) => {
			report_parse_error(&lexed_source, e);
			return ExitCode::FAILURE;
		}
	};

	// Checking.
	let mut checker = Checker::new(&mut interner).with_fuel(fuel);
	for (index, command) in program.commands.iter().enumerate() {
		match execute_command(&mut checker, command) {
			Ok(Outcome::Declared(name)) => println!("{} declared.", interner.resolve(&name.symbol)),
			Ok(Outcome::Defined { name, ty }) =>
				println!("{} : {}", interner.resolve(&name.symbol), pretty_print(&ty, &interner)),
			Ok(Outcome::Inferred(ty)) => println!("{}", pretty_print(&ty, &interner)),
			Ok(Outcome::Normalized(term)) => println!("{}", pretty_print(&term, &interner)),
			Err(error) => {
				report_execution_error(&lexed_source, &interner, ExecutionError { index, range: command.range, error });
				return ExitCode::FAILURE;
			}
		}
	}

	ExitCode::SUCCESS
}

enum InputOption {
	Direct(String),
	FilePath(String),
}

struct Options {
	input: InputOption,
	fuel: Option<usize>,
	verbose: bool,
}

fn main() -> ExitCode {
	let options: Options = construct!(Options {
		input(construct!([
			c(short('c').argument::<String>("\"program\"").help("Read input from argument").map(InputOption::Direct)),
			f(short('f').argument::<String>("PATH").help("Read input from file").map(InputOption::FilePath)),
		])),
		fuel(long("fuel").argument::<usize>("STEPS").help("Bound each normalization by a number of rewrite steps").optional()),
		verbose(short('v').long("verbose").help("Log checking steps").switch()),
	})
	.to_options()
	.descr("Type-check and normalize programs with telescoped identity types")
	.run();

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if options.verbose { "debug" } else { "warn" })))
		.with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
		.init();

	let input = match options.input {
		InputOption::Direct(command) => command,
		InputOption::FilePath(file_path) => match std::fs::read_to_string(&file_path) {
			Ok(input) => input,
			Err(error) => {
				eprintln!("error: could not read {file_path}: {error}");
				return ExitCode::FAILURE;
			}
		},
	};

	run(&input, options.fuel)
}

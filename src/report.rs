use lasso::Resolver;
use peg::error::ParseError;

use crate::{
	ir::{
		source::{LexError, LexErrorKind, LexedSource},
		syntax::Term,
	},
	op::{error::KernelError, execute::ExecutionError, unparse::pretty_print},
};

pub fn report_tokenization_error(source: &str, lex_error: LexError) {
	let location = lex_error.0;
	let width = source[location..].chars().next().map_or(1, char::len_utf8);
	report_line_error(source, (location, location + width), &format_lex_error(source, lex_error))
}

pub fn report_parse_error(source: &LexedSource, error: ParseError<usize>) {
	report_line_error(
		source.source,
		source.ranges.get(error.location).copied().unwrap_or((source.source.len(), source.source.len() + 1)),
		&format!("parse error: expected one of: {:?}", error.expected.tokens().collect::<Vec<_>>()),
	);
}

pub fn report_execution_error(source: &LexedSource, interner: &impl Resolver, error: ExecutionError) {
	let (init, fini) = error.range;
	let start = source.ranges.get(init).map_or(source.source.len(), |range| range.0);
	let end = fini.checked_sub(1).and_then(|last| source.ranges.get(last)).map_or(start + 1, |range| range.1);
	report_line_error(source.source, (start, end.max(start + 1)), &display_error(error.error, interner));
}

fn report_line_error(source: &str, range: (usize, usize), error_string: &str) {
	const TAB_WIDTH: usize = 3;
	const TAB_REPLACEMENT: &str = "   ";
	debug_assert_eq!(TAB_REPLACEMENT.len(), TAB_WIDTH);

	let mut lines = source.split_inclusive('\n');
	let mut line_number: usize = 0;
	let mut bytes_left = range.0;
	let (line, bytes_left) = loop {
		if let Some(line) = lines.next() {
			line_number += 1;
			if line.len() <= bytes_left {
				bytes_left -= line.len();
			} else {
				break (line, bytes_left);
			}
		} else {
			let last = source.rsplit('\n').next().unwrap_or_default();
			line_number = line_number.max(1);
			break (last, last.len());
		}
	};

	eprint!("[{}:{}] ", line_number, bytes_left);
	eprintln!("error: {error_string}");

	let visual_line = line.replace('\t', TAB_REPLACEMENT).trim_end().to_owned();
	let visual_offset: usize =
		unicode_width::UnicodeWidthStr::width(line[0..bytes_left].replace('\t', TAB_REPLACEMENT).as_str());
	// Carets stop at the end of the line the range starts on.
	let visible = line.get(bytes_left..).map_or("", |rest| {
		let len = (range.1 - range.0).min(rest.len());
		rest.get(..len).unwrap_or(rest).trim_end()
	});
	let width = unicode_width::UnicodeWidthStr::width(visible).max(1);

	let displayed_line_number = line_number.to_string();
	let dummy_line_number = " ".repeat(displayed_line_number.len());
	eprintln!("{} |", dummy_line_number);
	eprintln!("{} | {}", displayed_line_number, visual_line);
	eprintln!("{} | {}{}", dummy_line_number, " ".repeat(visual_offset), "^".repeat(width));
}

fn format_lex_error(source: &str, LexError(location, kind): LexError) -> String {
	fn char_list_string(chars: &[char]) -> String {
		chars.iter().map(|c| format!("`{c}`")).collect::<Vec<_>>().join(", ")
	}

	let found = source[location..].chars().next().map(|c| c.escape_default().to_string()).unwrap_or_default();
	match kind {
		LexErrorKind::UnrecognizedLexemePrefix => format!("lex error: unrecognized lexeme prefix `{found}`"),
		LexErrorKind::UnexpectedCharacter(expected) =>
			format!("lex error: expected one of {}; found `{found}`", char_list_string(expected)),
		LexErrorKind::UnexpectedEnd(expected) =>
			format!("lex error: expected one of {}; found end of input", char_list_string(expected)),
		LexErrorKind::UnknownCommand => "lex error: unknown command".to_owned(),
	}
}

/// Renders a kernel error, printing any terms it carries in concrete syntax.
pub fn display_error(error: KernelError, interner: &impl Resolver) -> String {
	let print = |term: &Term| pretty_print(term, interner);
	match error {
		KernelError::UnboundVariable(name) => format!("unbound variable `{}`", interner.resolve(&name.symbol)),
		KernelError::UnknownConstant(name) => format!("unknown constant `{}`", interner.resolve(&name.symbol)),
		KernelError::NotAFunctionType(ty) => format!("expected a function type\nfound: {}", print(&ty)),
		KernelError::NotAPairType(ty) => format!("expected a pair type\nfound: {}", print(&ty)),
		KernelError::TypeMismatch { expected, found } =>
			format!("type mismatch\nexpected: {}\nfound: {}", print(&expected), print(&found)),
		KernelError::UndecidedEquality { left, right, ty } => format!(
			"could not decide equality\nleft: {}\nright: {}\nat type: {}",
			print(&left),
			print(&right),
			print(&ty)
		),
		error => error.to_string(),
	}
}

use std::str::Chars;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Token {
	Whitespace,
	Keyword(Keyword),
	Command(Command),
	Identifier,
	Colon,
	Semi,
	Period,
	Comma,
	Slash,
	EqualEqual,
	DoubleArrow,
	ParenL,
	ParenR,
	SquareL,
	SquareR,
	CurlyL,
	CurlyR,
	Ast,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Keyword {
	Universe,

	// Dependent functions.
	Pi,
	Lambda,

	// Dependent pairs.
	Sg,
	Fst,
	Snd,

	// Paths.
	Id,
	Ap,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Command {
	Constant,
	Define,
	Infer,
	Normalize,
}

#[derive(Debug)]
pub struct LexError(pub usize, pub LexErrorKind);

#[derive(Debug)]
pub enum LexErrorKind {
	UnrecognizedLexemePrefix,
	UnexpectedCharacter(&'static [char]),
	UnexpectedEnd(&'static [char]),
	UnknownCommand,
}

struct Scanner<'s> {
	len: usize,
	chars: Chars<'s>,
}

impl<'s> Scanner<'s> {
	pub fn new(source: &'s str) -> Self { Self { len: source.len(), chars: source.chars() } }

	pub fn position(&self) -> usize { self.len - self.chars.as_str().len() }

	pub fn next(&mut self) -> Option<(char, usize)> {
		let position = self.position();
		Some((self.chars.next()?, position))
	}

	pub fn pop(&mut self) -> Option<char> { self.chars.next() }

	pub fn peek(&mut self) -> Option<char> { self.chars.clone().next() }
}

fn is_identifier_continuation(c: char) -> bool { c.is_alphanumeric() || c == '_' || c == '\'' }

/// A source string split into tokens, with the byte range of each token.
pub struct LexedSource<'s> {
	pub source: &'s str,
	pub tokens: Box<[Token]>,
	pub ranges: Box<[(usize, usize)]>,
}

impl<'s> LexedSource<'s> {
	fn keyword_or_identifier(string: &str) -> Token {
		use Token::*;

		use self::Keyword::*;
		match string {
			"U" => Keyword(Universe),
			"Pi" => Keyword(Pi),
			"fun" => Keyword(Lambda),
			"Sigma" => Keyword(Sg),
			"fst" => Keyword(Fst),
			"snd" => Keyword(Snd),
			"Id" => Keyword(Id),
			"ap" => Keyword(Ap),
			_ => Identifier,
		}
	}

	fn command(string: &str) -> Option<Token> {
		Some(Token::Command(match string {
			"constant" => Command::Constant,
			"define" => Command::Define,
			"infer" => Command::Infer,
			"normalize" => Command::Normalize,
			_ => return None,
		}))
	}

	pub fn new(source: &'s str) -> Result<Self, LexError> {
		use LexErrorKind::*;
		use Token::*;
		let mut scanner = Scanner::new(source);
		let mut tokens = Vec::new();
		let mut ranges = Vec::new();
		while let Some((initial, start)) = scanner.next() {
			let token = match initial {
				c if c.is_whitespace() => {
					while scanner.peek().is_some_and(char::is_whitespace) {
						scanner.pop();
					}
					Whitespace
				}
				'%' => {
					while let Some(c) = scanner.pop() {
						if c == '\n' {
							break;
						}
					}
					Whitespace
				}
				'Π' => Keyword(self::Keyword::Pi),
				'Σ' => Keyword(self::Keyword::Sg),
				'λ' => Keyword(self::Keyword::Lambda),
				c if is_identifier_continuation(c) => {
					while scanner.peek().is_some_and(is_identifier_continuation) {
						scanner.pop();
					}
					Self::keyword_or_identifier(&source[start..scanner.position()])
				}
				'\\' => {
					while scanner.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
						scanner.pop();
					}
					Self::command(&source[start + 1..scanner.position()]).ok_or(LexError(start, UnknownCommand))?
				}
				'=' => {
					const EXPECTED: [char; 2] = ['=', '>'];
					match scanner.next() {
						Some(('=', _)) => EqualEqual,
						Some(('>', _)) => DoubleArrow,
						Some((_, position)) => return Err(LexError(position, UnexpectedCharacter(&EXPECTED))),
						None => return Err(LexError(scanner.position(), UnexpectedEnd(&EXPECTED))),
					}
				}
				':' => Colon,
				';' => Semi,
				'.' => Period,
				',' => Comma,
				'/' => Slash,
				'(' => ParenL,
				')' => ParenR,
				'[' => SquareL,
				']' => SquareR,
				'{' => CurlyL,
				'}' => CurlyR,
				'*' => Ast,
				_ => return Err(LexError(start, UnrecognizedLexemePrefix)),
			};
			tokens.push(token);
			ranges.push((start, scanner.position()));
		}

		debug_assert!(tokens.len() == ranges.len());
		Ok(Self { source, tokens: tokens.into_boxed_slice(), ranges: ranges.into_boxed_slice() })
	}
}

pub fn lex(source: &str) -> Result<LexedSource<'_>, LexError> { LexedSource::new(source) }

use logos::Logos;

use crate::statement::EndDelimiter;
use crate::statement::StartDelimiter;
use crate::statement::Statement;
use crate::statement::Variable;

/// Raw tokens used to locate tag openers. Everything else in the text is
/// either `Text` or a stray `{` and is skipped.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	#[token("{%")]
	Statement,
	#[token("{%-")]
	StatementTrim,
	#[token("{%+")]
	StatementPreserve,
	#[token("{{")]
	Variable,
	#[token("{{-")]
	VariableTrim,
	#[token("{{+")]
	VariablePreserve,
	#[token("{#")]
	Comment,
	#[regex(r"[^{]+")]
	Text,
}

impl RawToken {
	fn opener(self) -> Option<(Syntax, StartDelimiter)> {
		match self {
			Self::Statement => Some((Syntax::Statement, StartDelimiter::Plain)),
			Self::StatementTrim => Some((Syntax::Statement, StartDelimiter::Trim)),
			Self::StatementPreserve => Some((Syntax::Statement, StartDelimiter::Preserve)),
			Self::Variable => Some((Syntax::Variable, StartDelimiter::Plain)),
			Self::VariableTrim => Some((Syntax::Variable, StartDelimiter::Trim)),
			Self::VariablePreserve => Some((Syntax::Variable, StartDelimiter::Preserve)),
			Self::Comment => Some((Syntax::Comment, StartDelimiter::Plain)),
			Self::Text => None,
		}
	}
}

/// The delimited forms a Jinja tag can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
	/// `{% ... %}`
	Statement,
	/// `{{ ... }}`
	Variable,
	/// `{# ... #}`
	Comment,
}

impl Syntax {
	fn close_marker(self) -> &'static [u8] {
		match self {
			Self::Statement => b"%}",
			Self::Variable => b"}}",
			Self::Comment => b"#}",
		}
	}

	/// The closing delimiter implied by the byte just before the close marker.
	fn end_delimiter(self, last: Option<u8>) -> EndDelimiter {
		match (self, last) {
			(Self::Statement | Self::Variable, Some(b'-')) => EndDelimiter::Trim,
			(Self::Statement, Some(b'+')) => EndDelimiter::Preserve,
			_ => EndDelimiter::Plain,
		}
	}
}

const STATEMENT_OPENERS: [&str; 3] = ["{%", "{%-", "{%+"];

/// Extract every `{% ... %}` statement from `text`, in source order.
///
/// When `indentation` is set, statements that are not the first thing on
/// their line (inline use such as `foo {% if x %}bar{% endif %}`) are
/// skipped.
///
/// The returned iterator is lazy and cheap to clone; cloning it before
/// consuming restarts the scan.
pub fn extract_statements(text: &str, indentation: bool) -> Statements<'_> {
	Statements {
		scanner: Scanner::new(text, Syntax::Statement),
		indentation,
	}
}

/// Extract every `{{ ... }}` expression from `text`, in source order.
pub fn extract_variables(text: &str) -> Variables<'_> {
	Variables {
		scanner: Scanner::new(text, Syntax::Variable),
	}
}

/// The bodies of every `{# ... #}` comment in `text`.
pub fn extract_comments(text: &str) -> impl Iterator<Item = &str> {
	let mut scanner = Scanner::new(text, Syntax::Comment);
	std::iter::from_fn(move || scanner.next_span().map(|span| span.body))
}

/// Lazy iterator over the statements of a template. See
/// [`extract_statements`].
#[derive(Clone)]
pub struct Statements<'a> {
	scanner: Scanner<'a>,
	indentation: bool,
}

impl Iterator for Statements<'_> {
	type Item = Statement;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let span = self.scanner.next_span()?;

			if self.indentation
				&& !first_word_of_line(self.scanner.source, span.opener_start)
					.is_some_and(|word| STATEMENT_OPENERS.contains(&word))
			{
				continue;
			}

			let statement = Statement::new(
				span.body,
				span.start_line,
				span.end_line,
				span.start_delimiter,
				span.end_delimiter,
			);
			tracing::debug!(?statement, "found statement");

			return Some(statement);
		}
	}
}

/// Lazy iterator over the expressions of a template. See
/// [`extract_variables`].
#[derive(Clone)]
pub struct Variables<'a> {
	scanner: Scanner<'a>,
}

impl Iterator for Variables<'_> {
	type Item = Variable;

	fn next(&mut self) -> Option<Self::Item> {
		let span = self.scanner.next_span()?;
		let variable = Variable::new(
			span.body,
			span.start_line,
			span.end_line,
			span.start_delimiter,
			span.end_delimiter,
		);
		tracing::debug!(?variable, "found variable");

		Some(variable)
	}
}

/// One delimited tag located by a [`Scanner`].
struct Span<'a> {
	opener_start: usize,
	body: &'a str,
	start_line: usize,
	end_line: usize,
	start_delimiter: StartDelimiter,
	end_delimiter: EndDelimiter,
}

/// Finds the tags of one [`Syntax`], tracking line numbers as it goes.
/// Openers of the other forms are stepped over, so a `{%` inside a
/// `{{ ... }}` is still seen by a statement scan.
#[derive(Clone)]
struct Scanner<'a> {
	source: &'a str,
	lexer: logos::Lexer<'a, RawToken>,
	syntax: Syntax,
	/// Byte offset up to which newlines have been counted.
	cursor: usize,
	/// 1-based line number at `cursor`.
	line: usize,
	done: bool,
}

impl<'a> Scanner<'a> {
	fn new(source: &'a str, syntax: Syntax) -> Self {
		Self {
			source,
			lexer: RawToken::lexer(source),
			syntax,
			cursor: 0,
			line: 1,
			done: false,
		}
	}

	/// Move the line counter forward to `offset`.
	fn line_at(&mut self, offset: usize) -> usize {
		self.line += count_newlines(&self.source[self.cursor..offset]);
		self.cursor = offset;
		self.line
	}

	fn next_span(&mut self) -> Option<Span<'a>> {
		if self.done {
			return None;
		}

		while let Some(token) = self.lexer.next() {
			let Some((syntax, start_delimiter)) = token.ok().and_then(RawToken::opener) else {
				continue;
			};
			if syntax != self.syntax {
				continue;
			}

			let source = self.source;
			let bytes = source.as_bytes();
			let opener = self.lexer.span();
			let content_start = opener.end;
			let marker = syntax.close_marker();

			// The tag ends at the nearest close marker. Without one, nothing after
			// this point can form a tag of this kind either.
			let Some(close_offset) = memstr(&bytes[content_start..], marker) else {
				tracing::debug!(offset = opener.start, ?syntax, "unterminated opener");
				self.done = true;
				return None;
			};
			let close = content_start + close_offset;
			let close_end = close + marker.len();

			let end_delimiter = syntax.end_delimiter(bytes[content_start..close].last().copied());
			let content_end = if end_delimiter == EndDelimiter::Plain {
				close
			} else {
				close - 1
			};

			self.lexer.bump(close_end - content_start);

			let start_line = self.line_at(content_start);
			let end_line = self.line_at(content_end);

			return Some(Span {
				opener_start: opener.start,
				body: &source[content_start..content_end],
				start_line,
				end_line,
				start_delimiter,
				end_delimiter,
			});
		}

		self.done = true;
		None
	}
}

/// The first whitespace-delimited word of the line containing `offset`.
fn first_word_of_line(source: &str, offset: usize) -> Option<&str> {
	let line_start = source[..offset].rfind('\n').map_or(0, |idx| idx + 1);
	let line_end = source[offset..]
		.find('\n')
		.map_or(source.len(), |idx| offset + idx);
	source[line_start..line_end].split_whitespace().next()
}

fn count_newlines(text: &str) -> usize {
	text.bytes().filter(|byte| *byte == b'\n').count()
}

fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// The opening marker of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartDelimiter {
	/// `{%`
	Plain,
	/// `{%-`
	Trim,
	/// `{%+`
	Preserve,
}

impl StartDelimiter {
	/// `{%-` and `{%+` both control the whitespace before the statement, which
	/// shifts the indentation expected inside the delimiters.
	pub fn is_trimming(self) -> bool {
		matches!(self, Self::Trim | Self::Preserve)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plain => "{%",
			Self::Trim => "{%-",
			Self::Preserve => "{%+",
		}
	}

	/// The whitespace-control character alone, shared with `{{-` and `{{+`.
	pub fn marker(self) -> &'static str {
		match self {
			Self::Plain => "",
			Self::Trim => "-",
			Self::Preserve => "+",
		}
	}
}

impl Display for StartDelimiter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// The closing marker of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndDelimiter {
	/// `%}`
	Plain,
	/// `-%}`
	Trim,
	/// `+%}`
	Preserve,
}

impl EndDelimiter {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plain => "%}",
			Self::Trim => "-%}",
			Self::Preserve => "+%}",
		}
	}

	pub fn marker(self) -> &'static str {
		match self {
			Self::Plain => "",
			Self::Trim => "-",
			Self::Preserve => "+",
		}
	}
}

impl Display for EndDelimiter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// A directive fragment extracted from template text, e.g. the ` if x ` of
/// `{% if x %}`.
///
/// Line numbers are 1-based and inclusive; a statement spanning several
/// physical lines has `end_line > start_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
	/// Everything between the delimiters, whitespace preserved.
	pub text: String,
	pub start_line: usize,
	pub end_line: usize,
	pub start_delimiter: StartDelimiter,
	pub end_delimiter: EndDelimiter,
}

impl Statement {
	pub fn new(
		text: impl Into<String>,
		start_line: usize,
		end_line: usize,
		start_delimiter: StartDelimiter,
		end_delimiter: EndDelimiter,
	) -> Self {
		Self {
			text: text.into(),
			start_line,
			end_line,
			start_delimiter,
			end_delimiter,
		}
	}

	/// The first word of the statement, or `""` for an empty statement.
	pub fn tag(&self) -> &str {
		self.text.split_whitespace().next().unwrap_or_default()
	}

	/// Number of whitespace characters between the start delimiter and the
	/// first word.
	pub fn indent(&self) -> usize {
		self.text.chars().take_while(|ch| ch.is_whitespace()).count()
	}

	/// The statement with its original delimiters restored.
	pub fn render(&self) -> String {
		self.to_string()
	}
}

impl Display for Statement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}{}{}", self.start_delimiter, self.text, self.end_delimiter)
	}
}

/// An expression fragment extracted from template text, e.g. the ` name ` of
/// `{{ name }}`. Delimiters reuse the statement markers; only `Trim` can
/// close an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
	pub text: String,
	pub start_line: usize,
	pub end_line: usize,
	pub start_delimiter: StartDelimiter,
	pub end_delimiter: EndDelimiter,
}

impl Variable {
	pub fn new(
		text: impl Into<String>,
		start_line: usize,
		end_line: usize,
		start_delimiter: StartDelimiter,
		end_delimiter: EndDelimiter,
	) -> Self {
		Self {
			text: text.into(),
			start_line,
			end_line,
			start_delimiter,
			end_delimiter,
		}
	}

	/// The expression with its original `{{`/`}}` delimiters restored.
	pub fn render(&self) -> String {
		self.to_string()
	}
}

impl Display for Variable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{{{{{}{}{}}}}}",
			self.start_delimiter.marker(),
			self.text,
			self.end_delimiter.marker()
		)
	}
}

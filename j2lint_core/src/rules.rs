use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

use crate::expression::LITERAL_NAMES;
use crate::expression::words;
use crate::indenter::check_indentation;
use crate::lexer::extract_statements;
use crate::lexer::extract_variables;
use crate::statement::EndDelimiter;
use crate::statement::StartDelimiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
	Low,
	Medium,
	High,
}

impl Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Low => write!(f, "LOW"),
			Self::Medium => write!(f, "MEDIUM"),
			Self::High => write!(f, "HIGH"),
		}
	}
}

/// A problem reported by a full-text rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
	pub line: usize,
	/// The offending source text, usually a rendered statement.
	pub text: String,
	pub message: String,
}

/// A lint rule. Line rules implement [`check_line`](Rule::check_line),
/// full-text rules implement [`check_text`](Rule::check_text); a rule may do
/// both.
pub trait Rule: Send + Sync {
	/// Short code such as `S3`.
	fn id(&self) -> &'static str;
	/// Kebab-case name such as `jinja-statements-indentation`.
	fn short_description(&self) -> &'static str;
	fn description(&self) -> &'static str;
	fn severity(&self) -> Severity;

	/// Whether a single line violates the rule. Lines starting with `#` are
	/// never passed in.
	fn check_line(&self, _line: &str) -> bool {
		false
	}

	fn check_text(&self, _text: &str) -> Vec<Finding> {
		Vec::new()
	}

	/// `true` when `name` is this rule's id or short description.
	fn is_named(&self, name: &str) -> bool {
		name == self.id() || name == self.short_description()
	}
}

/// The rules enabled by default, ordered by id.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
	vec![
		Box::new(VariableSingleSpace),
		Box::new(StatementIndentation),
		Box::new(StatementSingleSpace),
		Box::new(StatementNoTabs),
		Box::new(StatementDelimiter),
		Box::new(SingleStatementPerLine),
		Box::new(VariableLowerCase),
		Box::new(VariableFormat),
	]
}

/// Findings for every `{{ ... }}` expression whose body matches `violates`.
fn variable_findings(
	rule: &dyn Rule,
	text: &str,
	violates: impl Fn(&str) -> bool,
) -> Vec<Finding> {
	extract_variables(text)
		.filter(|variable| violates(&variable.text))
		.map(|variable| {
			Finding {
				line: variable.start_line,
				text: variable.render(),
				message: rule.description().to_string(),
			}
		})
		.collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VariableSingleSpace;

impl Rule for VariableSingleSpace {
	fn id(&self) -> &'static str {
		"S1"
	}

	fn short_description(&self) -> &'static str {
		"jinja-variable-single-space"
	}

	fn description(&self) -> &'static str {
		"A single space should be added between Jinja2 curly brackets and a variable's name: \
		 '{{ ethernet_interface }}'"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_text(&self, text: &str) -> Vec<Finding> {
		variable_findings(self, text, |body| {
			let inner = body
				.strip_prefix(' ')
				.and_then(|rest| rest.strip_suffix(' '));
			!inner.is_some_and(|inner| {
				!inner.is_empty()
					&& !inner.starts_with(char::is_whitespace)
					&& !inner.ends_with(char::is_whitespace)
			})
		})
	}
}

/// Nesting and indentation of statements, see
/// [`check_indentation`](crate::check_indentation).
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementIndentation;

impl Rule for StatementIndentation {
	fn id(&self) -> &'static str {
		"S3"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-indentation"
	}

	fn description(&self) -> &'static str {
		"All J2 statements must be indented by 4 more spaces within jinja delimiter. To close a \
		 control, end tag must have same indentation level."
	}

	fn severity(&self) -> Severity {
		Severity::High
	}

	fn check_text(&self, text: &str) -> Vec<Finding> {
		let report = check_indentation(text);
		let mut findings: Vec<Finding> = report
			.records
			.into_iter()
			.map(|record| {
				Finding {
					line: record.line,
					text: record.text,
					message: record.message,
				}
			})
			.collect();

		if let Some(fatal) = report.fatal {
			tracing::error!(line = fatal.line(), "{fatal}");
			findings.push(Finding {
				line: fatal.line(),
				text: fatal.text().to_string(),
				message: fatal.to_string(),
			});
		}

		findings
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatementSingleSpace;

impl Rule for StatementSingleSpace {
	fn id(&self) -> &'static str {
		"S4"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-single-space"
	}

	fn description(&self) -> &'static str {
		"Jinja statement should have a single space before and after: '{% statement %}'"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_text(&self, text: &str) -> Vec<Finding> {
		extract_statements(text, false)
			.filter(|statement| {
				let body = statement.text.as_str();
				let trailing_spaces = body.len() - body.trim_end_matches(' ').len();
				!body.starts_with(char::is_whitespace) || trailing_spaces != 1
			})
			.map(|statement| {
				Finding {
					line: statement.start_line,
					text: statement.render(),
					message: self.description().to_string(),
				}
			})
			.collect()
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatementNoTabs;

impl Rule for StatementNoTabs {
	fn id(&self) -> &'static str {
		"S5"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-no-tabs"
	}

	fn description(&self) -> &'static str {
		"Indentation are 4 spaces and NOT tabs"
	}

	fn severity(&self) -> Severity {
		Severity::Medium
	}

	fn check_line(&self, line: &str) -> bool {
		extract_statements(line, false).any(|statement| statement.text.contains('\t'))
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatementDelimiter;

impl Rule for StatementDelimiter {
	fn id(&self) -> &'static str {
		"S6"
	}

	fn short_description(&self) -> &'static str {
		"jinja-statements-delimiter"
	}

	fn description(&self) -> &'static str {
		"Jinja statements should not have {%- or {%+ or -%} as delimiters"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_text(&self, text: &str) -> Vec<Finding> {
		extract_statements(text, false)
			.filter(|statement| {
				statement.start_delimiter != StartDelimiter::Plain
					|| statement.end_delimiter != EndDelimiter::Plain
			})
			.map(|statement| {
				Finding {
					line: statement.start_line,
					text: statement.render(),
					message: self.description().to_string(),
				}
			})
			.collect()
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SingleStatementPerLine;

impl Rule for SingleStatementPerLine {
	fn id(&self) -> &'static str {
		"S7"
	}

	fn short_description(&self) -> &'static str {
		"single-statement-per-line"
	}

	fn description(&self) -> &'static str {
		"Jinja statements should be on separate lines"
	}

	fn severity(&self) -> Severity {
		Severity::Medium
	}

	fn check_line(&self, line: &str) -> bool {
		extract_statements(line, false).nth(1).is_some()
	}
}

/// Variable names must not contain upper-case letters. Attribute and filter
/// names belong to the data or the environment and are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableLowerCase;

impl Rule for VariableLowerCase {
	fn id(&self) -> &'static str {
		"V1"
	}

	fn short_description(&self) -> &'static str {
		"jinja-variable-lower-case"
	}

	fn description(&self) -> &'static str {
		"All variables should use lower case"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_text(&self, text: &str) -> Vec<Finding> {
		variable_findings(self, text, |body| {
			words(body).iter().any(|word| {
				!word.qualified
					&& !LITERAL_NAMES.contains(&word.text)
					&& word.text.contains(|ch: char| ch.is_ascii_uppercase())
			})
		})
	}
}

/// Multi-word names joined by `-`, which Jinja reads as a subtraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableFormat;

impl Rule for VariableFormat {
	fn id(&self) -> &'static str {
		"V2"
	}

	fn short_description(&self) -> &'static str {
		"jinja-variable-format"
	}

	fn description(&self) -> &'static str {
		"If variable is multi-words, underscore `_` should be used as a separator"
	}

	fn severity(&self) -> Severity {
		Severity::Low
	}

	fn check_text(&self, text: &str) -> Vec<Finding> {
		variable_findings(self, text, |body| {
			words(body)
				.windows(2)
				.any(|pair| &body[pair[0].end..pair[1].start] == "-")
		})
	}
}

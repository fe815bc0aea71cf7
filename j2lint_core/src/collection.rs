use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::LintConfig;
use crate::LintResult;
use crate::lexer::extract_comments;
use crate::rules::Rule;
use crate::rules::Severity;
use crate::rules::builtin_rules;

/// A rule violation in a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
	pub id: String,
	pub short_description: String,
	pub description: String,
	pub severity: Severity,
	pub filename: String,
	pub line_number: usize,
	/// The offending line or statement.
	pub line: String,
	pub message: String,
}

impl Issue {
	fn new(rule: &dyn Rule, filename: &str, line_number: usize, line: &str, message: &str) -> Self {
		Self {
			id: rule.id().to_string(),
			short_description: rule.short_description().to_string(),
			description: rule.description().to_string(),
			severity: rule.severity(),
			filename: filename.to_string(),
			line_number,
			line: line.to_string(),
			message: message.to_string(),
		}
	}
}

/// Sort issues by file, then line, then rule id.
pub fn sort_issues(issues: &mut [Issue]) {
	issues.sort_by(|a, b| {
		a.filename
			.cmp(&b.filename)
			.then(a.line_number.cmp(&b.line_number))
			.then_with(|| a.id.cmp(&b.id))
	});
}

/// Issues found in one or more files, split by whether their rule is
/// configured as a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintOutcome {
	pub errors: Vec<Issue>,
	pub warnings: Vec<Issue>,
}

impl LintOutcome {
	pub fn is_clean(&self) -> bool {
		self.errors.is_empty() && self.warnings.is_empty()
	}

	pub fn extend(&mut self, other: LintOutcome) {
		self.errors.extend(other.errors);
		self.warnings.extend(other.warnings);
	}

	pub fn sort(&mut self) {
		sort_issues(&mut self.errors);
		sort_issues(&mut self.warnings);
	}
}

struct RuleEntry {
	rule: Box<dyn Rule>,
	ignore: bool,
	warn: bool,
}

/// The set of rules run against each file.
pub struct RulesCollection {
	entries: Vec<RuleEntry>,
	extensions: Vec<String>,
}

impl std::fmt::Debug for RulesCollection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RulesCollection")
			.field(
				"rules",
				&self.entries.iter().map(|e| e.rule.id()).collect::<Vec<_>>(),
			)
			.field("extensions", &self.extensions)
			.finish()
	}
}

impl Default for RulesCollection {
	fn default() -> Self {
		Self::builtin()
	}
}

impl RulesCollection {
	/// A collection without any rules.
	pub fn new() -> Self {
		Self {
			entries: vec![],
			extensions: LintConfig::default().extensions,
		}
	}

	/// A collection holding every built-in rule.
	pub fn builtin() -> Self {
		let mut collection = Self::new();
		for rule in builtin_rules() {
			collection.push(rule);
		}
		collection
	}

	/// The built-in rules with the ignore/warn lists and extensions from
	/// `config` applied.
	pub fn from_config(config: &LintConfig) -> Self {
		let mut collection = Self::builtin();
		collection.extensions.clone_from(&config.extensions);
		collection.configure(&config.ignore, &config.warn);
		tracing::info!(?collection, "created rules collection");
		collection
	}

	pub fn push(&mut self, rule: Box<dyn Rule>) {
		self.entries.push(RuleEntry {
			rule,
			ignore: false,
			warn: false,
		});
	}

	/// Mark rules as ignored or as warnings. Names match a rule's id or its
	/// short description.
	pub fn configure(&mut self, ignore: &[String], warn: &[String]) {
		for entry in &mut self.entries {
			entry.ignore = ignore.iter().any(|name| entry.rule.is_named(name));
			entry.warn = warn.iter().any(|name| entry.rule.is_named(name));
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
		self.entries.iter().map(|entry| entry.rule.as_ref())
	}

	/// Lint a file on disk.
	pub fn run_file(&self, path: &Path) -> LintResult<LintOutcome> {
		let text = std::fs::read_to_string(path)?;
		Ok(self.run(&path.display().to_string(), &text))
	}

	/// Lint `text` as the contents of `filename`. Files without a Jinja
	/// extension produce no issues.
	pub fn run(&self, filename: &str, text: &str) -> LintOutcome {
		let mut outcome = LintOutcome::default();

		if !crate::config::has_extension(Path::new(filename), &self.extensions) {
			tracing::debug!(
				filename,
				"skipping file, linter does not support linting this file type"
			);
			return outcome;
		}

		let disabled = disabled_rules(text);

		for entry in &self.entries {
			let rule = entry.rule.as_ref();

			if entry.ignore {
				tracing::debug!(filename, rule = rule.id(), "ignoring rule");
				continue;
			}

			if disabled.iter().any(|name| rule.is_named(name)) {
				tracing::debug!(filename, rule = rule.id(), "rule disabled in file");
				continue;
			}

			tracing::debug!(filename, rule = rule.id(), "running rule");
			let issues = if entry.warn {
				&mut outcome.warnings
			} else {
				&mut outcome.errors
			};
			issues.extend(check_lines(rule, filename, text));
			issues.extend(check_full_text(rule, filename, text));
		}

		outcome
	}
}

fn check_lines(rule: &dyn Rule, filename: &str, text: &str) -> Vec<Issue> {
	text.split('\n')
		.enumerate()
		.filter(|(_, line)| !line.trim_start().starts_with('#'))
		.filter(|(_, line)| rule.check_line(line))
		.map(|(index, line)| Issue::new(rule, filename, index + 1, line, rule.description()))
		.collect()
}

fn check_full_text(rule: &dyn Rule, filename: &str, text: &str) -> Vec<Issue> {
	rule.check_text(text)
		.into_iter()
		.map(|finding| {
			Issue::new(
				rule,
				filename,
				finding.line,
				&finding.text,
				&finding.message,
			)
		})
		.collect()
}

/// Rule names disabled through `{# j2lint: disable=<name> #}` comments.
pub fn disabled_rules(text: &str) -> HashSet<String> {
	let mut names = HashSet::new();
	for comment in extract_comments(text) {
		collect_disable_directives(comment, &mut names);
	}

	names
}

/// Parse every `j2lint : disable = name` directive in a comment body.
fn collect_disable_directives(comment: &str, names: &mut HashSet<String>) {
	let mut rest = comment;

	while let Some(position) = rest.find("j2lint") {
		rest = &rest[position + "j2lint".len()..];

		let Some(after_colon) = rest.trim_start().strip_prefix(':') else {
			continue;
		};
		let Some(after_disable) = after_colon.trim_start().strip_prefix("disable") else {
			continue;
		};
		let Some(after_equals) = after_disable.trim_start().strip_prefix('=') else {
			continue;
		};

		let value = after_equals.trim_start();
		let name_len = value
			.find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '-'))
			.unwrap_or(value.len());
		if name_len > 0 {
			names.insert(value[..name_len].to_string());
		}
		rest = &value[name_len..];
	}
}

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use j2lint_core::LintError;
use j2lint_core::LintResult;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
#[command(
	name = "j2lint",
	author,
	version,
	about = "Lint Jinja2 templates for statement indentation, spacing and delimiter style.",
	long_about = "j2lint checks the `{% ... %}` statements and `{{ ... }}` expressions of Jinja2 \
	              templates.\n\nEvery block statement must nest correctly, and the whitespace \
	              after `{%` must grow by four columns for each level of nesting. Further rules \
	              enforce single spaces inside the delimiters, one statement per line, lower-case \
	              `snake_case` variable names, and forbid tabs and whitespace-control \
	              delimiters.\n\nQuick \
	              start:\n  j2lint templates/        Lint every template in a directory\n  j2lint \
	              -w S4 file.j2         Report single-space issues as warnings\n  cat file.j2 | \
	              j2lint --stdin  Lint a template piped on stdin\n  j2lint --list            \
	              Describe the built-in rules"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct J2LintCli {
	/// Template files or directories to lint. Directories are searched
	/// recursively for `.j2`, `.jinja` and `.jinja2` files.
	#[arg(value_name = "FILE")]
	pub files: Vec<PathBuf>,

	/// Rules to skip, by id (`S3`) or short description
	/// (`jinja-statements-indentation`).
	#[arg(long, short, num_args = 1.., value_name = "RULE")]
	pub ignore: Vec<String>,

	/// Rules whose issues are reported as warnings instead of errors.
	#[arg(long, short, num_args = 1.., value_name = "RULE")]
	pub warn: Vec<String>,

	/// List the built-in rules and exit.
	#[arg(long, short, default_value_t = false)]
	pub list: bool,

	/// Print the rule description and offending line with every issue.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Log at debug level. Only has an effect together with `--log` or
	/// `--stdout`.
	#[arg(long, short, default_value_t = false)]
	pub debug: bool,

	/// Print issues as a single JSON object.
	#[arg(long, short, default_value_t = false)]
	pub json: bool,

	/// Lint a template read from stdin.
	#[arg(long, default_value_t = false)]
	pub stdin: bool,

	/// Write logs to `j2lint.log` in the working directory.
	#[arg(long, default_value_t = false)]
	pub log: bool,

	/// Write logs to stdout.
	#[arg(long, default_value_t = false)]
	pub stdout: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl J2LintCli {
	/// Whether there is anything to lint or list.
	pub fn has_input(&self) -> bool {
		!self.files.is_empty() || self.stdin || self.list
	}

	/// Whether a log subscriber should be installed at all.
	pub fn wants_logs(&self) -> bool {
		self.log || self.stdout
	}

	pub fn log_level(&self) -> LevelFilter {
		if self.debug {
			LevelFilter::DEBUG
		} else {
			LevelFilter::INFO
		}
	}
}

/// Read a whole template from `input`, which is stdin in the binary.
///
/// A terminal is refused rather than read, since waiting on interactive
/// input is never what `--stdin` means.
pub fn read_template(mut input: impl Read, is_terminal: bool) -> LintResult<String> {
	if is_terminal {
		return Err(LintError::StdinIsTerminal);
	}

	let mut text = String::new();
	input.read_to_string(&mut text)?;
	if text.is_empty() {
		return Err(LintError::EmptyStdin);
	}

	Ok(text)
}

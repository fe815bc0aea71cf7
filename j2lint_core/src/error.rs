use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum LintError {
	#[error(transparent)]
	#[diagnostic(code(j2lint::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(j2lint::config_parse),
		help("check that j2lint.toml is valid TOML with `ignore`, `warn`, `extensions` or `exclude` keys")
	)]
	ConfigParse(String),

	#[error("invalid exclude pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(j2lint::exclude_pattern),
		help("exclude patterns follow .gitignore syntax")
	)]
	ExcludePattern { pattern: String, reason: String },

	#[error("no template received on stdin")]
	#[diagnostic(
		code(j2lint::empty_stdin),
		help("pipe a template into the linter, e.g. `cat file.j2 | j2lint --stdin`")
	)]
	EmptyStdin,

	#[error("`--stdin` was given but stdin is a terminal")]
	#[diagnostic(
		code(j2lint::stdin_is_terminal),
		help("pipe a template into the linter, e.g. `cat file.j2 | j2lint --stdin`")
	)]
	StdinIsTerminal,

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(j2lint::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

/// Fatal outcome of the structural validator. Once one of these is raised the
/// indentation findings after the failure point are unreliable, so the
/// validation pass for the file stops.
#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StructureError {
	#[error("Tag is out of order '{tag}'")]
	#[diagnostic(
		code(j2lint::out_of_order_tag),
		help("close the innermost open block before closing its parent")
	)]
	OutOfOrderTag {
		tag: String,
		line: usize,
		text: String,
	},

	#[error("Unsupported tag '{tag}' found")]
	#[diagnostic(
		code(j2lint::unsupported_tag),
		help("middle tags such as `else` or `elif` must belong to the innermost open block")
	)]
	UnsupportedTag {
		tag: String,
		line: usize,
		text: String,
	},

	#[error("Unterminated block '{tag}'")]
	#[diagnostic(code(j2lint::unterminated_block), help("add `{{% end{tag} %}}` to close this block"))]
	UnterminatedBlock {
		tag: String,
		line: usize,
		text: String,
	},
}

impl StructureError {
	/// Line number of the directive that triggered the failure.
	pub fn line(&self) -> usize {
		match self {
			Self::OutOfOrderTag { line, .. }
			| Self::UnsupportedTag { line, .. }
			| Self::UnterminatedBlock { line, .. } => *line,
		}
	}

	/// The offending directive, delimiters included.
	pub fn text(&self) -> &str {
		match self {
			Self::OutOfOrderTag { text, .. }
			| Self::UnsupportedTag { text, .. }
			| Self::UnterminatedBlock { text, .. } => text,
		}
	}
}

pub type LintResult<T> = Result<T, LintError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;

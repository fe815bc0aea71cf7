use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::LintError;
use crate::LintResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["j2lint.toml", ".j2lint.toml", ".config/j2lint.toml"];

/// File extensions linted when no `extensions` are configured.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["j2", "jinja", "jinja2"];

/// Configuration loaded from a `j2lint.toml` file.
///
/// ```toml
/// # Rules to skip entirely, by id or short description.
/// ignore = ["S6"]
/// # Rules whose issues are reported as warnings instead of errors.
/// warn = ["jinja-statements-single-space"]
/// extensions = ["j2", "jinja2", "html.j2"]
/// # Paths skipped while walking directories, in .gitignore syntax.
/// exclude = ["vendor/", "*.generated.j2"]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LintConfig {
	pub ignore: Vec<String>,
	pub warn: Vec<String>,
	pub extensions: Vec<String>,
	pub exclude: Vec<String>,
}

impl Default for LintConfig {
	fn default() -> Self {
		Self {
			ignore: vec![],
			warn: vec![],
			extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
			exclude: vec![],
		}
	}
}

impl LintConfig {
	/// Find the first existing config file in `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	pub fn load(root: &Path) -> LintResult<Option<LintConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: LintConfig =
			toml::from_str(&content).map_err(|e| LintError::ConfigParse(e.to_string()))?;
		tracing::debug!(path = %config_path.display(), ?config, "loaded config");

		Ok(Some(config))
	}

	/// Like [`load`](Self::load), falling back to the defaults when no config
	/// file exists.
	pub fn load_or_default(root: &Path) -> LintResult<LintConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	/// Append rule names given on the command line.
	pub fn merge_rules(&mut self, ignore: &[String], warn: &[String]) {
		self.ignore.extend(ignore.iter().cloned());
		self.warn.extend(warn.iter().cloned());
	}

	pub fn is_jinja_file(&self, path: &Path) -> bool {
		has_extension(path, &self.extensions)
	}
}

/// Whether the file name of `path` ends with one of `extensions`, compared
/// case-insensitively. Extensions may contain dots (`html.j2`).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
	let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
		return false;
	};
	let name = name.to_ascii_lowercase();

	extensions.iter().any(|extension| {
		let extension = extension.trim_start_matches('.').to_ascii_lowercase();
		!extension.is_empty()
			&& name
				.strip_suffix(extension.as_str())
				.is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
	})
}

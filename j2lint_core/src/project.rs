use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::LintConfig;
use crate::LintError;
use crate::LintResult;

/// Expand `paths` into the sorted list of template files to lint.
///
/// Directories are walked recursively; only files with one of the configured
/// extensions are kept and `exclude` patterns (gitignore syntax, relative to
/// `root`) are applied. Files named explicitly are kept whenever their
/// extension matches.
pub fn collect_files(
	paths: &[PathBuf],
	root: &Path,
	config: &LintConfig,
) -> LintResult<Vec<PathBuf>> {
	let exclude = build_exclude_matcher(root, &config.exclude)?;
	let mut files = Vec::new();
	let mut ancestors = HashSet::new();

	for path in paths {
		if path.is_dir() {
			walk_dir(path, &mut files, config, &exclude, &mut ancestors)?;
		} else if config.is_jinja_file(path) {
			files.push(path.clone());
		}
	}

	files.sort();
	files.dedup();
	tracing::debug!(?paths, ?files, "collected files");

	Ok(files)
}

/// Build a `Gitignore` matcher from the configured exclude patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> LintResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			LintError::ExcludePattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}
	builder.build().map_err(|e| {
		LintError::ExcludePattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

/// Walk `dir`, collecting template files.
///
/// `ancestors` holds the canonical paths of the directories currently being
/// walked. Only a directory that resolves to one of its own ancestors is a
/// cycle; the same directory reached twice by separate arguments is walked
/// twice and deduplicated by the caller.
fn walk_dir(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	config: &LintConfig,
	exclude: &Gitignore,
	ancestors: &mut HashSet<PathBuf>,
) -> LintResult<()> {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !ancestors.insert(canonical.clone()) {
		return Err(LintError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	let walked = walk_entries(dir, files, config, exclude, ancestors);
	ancestors.remove(&canonical);
	walked
}

fn walk_entries(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	config: &LintConfig,
	exclude: &Gitignore,
	ancestors: &mut HashSet<PathBuf>,
) -> LintResult<()> {
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(&path, files, config, exclude, ancestors)?;
		} else if config.is_jinja_file(&path) {
			files.push(path);
		}
	}

	Ok(())
}

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::CommandFactory;
use clap::Parser;
use j2lint_cli::J2LintCli;
use j2lint_cli::read_template;
use j2lint_core::Issue;
use j2lint_core::LintConfig;
use j2lint_core::LintOutcome;
use j2lint_core::LintResult;
use j2lint_core::RulesCollection;
use j2lint_core::Severity;
use j2lint_core::project::collect_files;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE: &str = "j2lint.log";
const EXIT_USAGE: i32 = 1;
const EXIT_LINT_ERRORS: i32 = 2;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = J2LintCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if !args.has_input() {
		eprintln!("{}", J2LintCli::command().render_help());
		process::exit(EXIT_USAGE);
	}

	match run(&args) {
		Ok(code) => process::exit(code),
		Err(error) => {
			let report: miette::Report = error.into();
			eprintln!("{report:?}");
			process::exit(EXIT_USAGE);
		}
	}
}

fn run(args: &J2LintCli) -> LintResult<i32> {
	if args.wants_logs() {
		init_logging(args)?;
	}

	let root = std::env::current_dir()?;
	let mut config = LintConfig::load_or_default(&root)?;
	config.merge_rules(&args.ignore, &args.warn);
	let collection = RulesCollection::from_config(&config);

	if args.list {
		print_rules(&collection);
		return Ok(0);
	}

	let files = collect_files(&args.files, &root, &config)?;
	let mut outcome = lint_files(&collection, &files);
	if args.stdin {
		outcome.extend(lint_stdin(&collection)?);
	}

	Ok(print_outcome(args, outcome))
}

/// Install a log subscriber writing to `j2lint.log`, stdout, or both.
fn init_logging(args: &J2LintCli) -> LintResult<()> {
	let filter = EnvFilter::builder()
		.with_default_directive(args.log_level().into())
		.from_env_lossy();

	let file_layer = if args.log {
		let file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(LOG_FILE)?;
		Some(
			fmt::layer()
				.with_writer(Mutex::new(file))
				.with_ansi(false),
		)
	} else {
		None
	};

	let stdout_layer = args.stdout.then(|| {
		fmt::layer()
			.with_writer(std::io::stdout)
			.with_ansi(color_enabled())
	});

	if let Err(error) = tracing_subscriber::registry()
		.with(filter)
		.with(file_layer)
		.with(stdout_layer)
		.try_init()
	{
		eprintln!("{} could not install logger: {error}", colored!("warning:", yellow));
	}

	Ok(())
}

fn print_rules(collection: &RulesCollection) {
	let mut rules: Vec<_> = collection.rules().collect();
	rules.sort_by_key(|rule| rule.id());

	println!("Jinja2 description for rules:");
	for rule in rules {
		println!("{}: {}", rule.id(), rule.description());
	}
}

/// Lint each file, reporting unreadable files as warnings without aborting
/// the run.
fn lint_files(collection: &RulesCollection, files: &[PathBuf]) -> LintOutcome {
	let mut outcome = LintOutcome::default();

	for path in files {
		tracing::debug!(path = %path.display(), "linting file");
		match collection.run_file(path) {
			Ok(file_outcome) => outcome.extend(file_outcome),
			Err(error) => {
				tracing::warn!(path = %path.display(), %error, "could not lint file");
				eprintln!(
					"{} could not lint {}: {error}",
					colored!("warning:", yellow),
					path.display()
				);
			}
		}
	}

	outcome
}

/// Copy stdin into a temporary `.j2` file and lint it. The file is removed
/// once linted.
fn lint_stdin(collection: &RulesCollection) -> LintResult<LintOutcome> {
	let stdin = std::io::stdin();
	let is_terminal = stdin.is_terminal();
	let text = read_template(stdin.lock(), is_terminal)?;

	let mut file = tempfile::Builder::new()
		.prefix("j2lint-stdin-")
		.suffix(".j2")
		.tempfile()?;
	file.write_all(text.as_bytes())?;
	file.flush()?;
	tracing::debug!(path = %file.path().display(), "linting stdin");

	collection.run_file(file.path())
}

#[derive(Serialize)]
struct JsonIssue<'a> {
	id: &'a str,
	message: &'a str,
	filename: &'a str,
	linenumber: usize,
	line: &'a str,
	severity: Severity,
}

impl<'a> From<&'a Issue> for JsonIssue<'a> {
	fn from(issue: &'a Issue) -> Self {
		Self {
			id: &issue.id,
			message: &issue.message,
			filename: &issue.filename,
			linenumber: issue.line_number,
			line: &issue.line,
			severity: issue.severity,
		}
	}
}

fn json_issues(issues: &[Issue]) -> Vec<JsonIssue<'_>> {
	issues.iter().map(JsonIssue::from).collect()
}

/// Print the sorted issues and return the exit code.
fn print_outcome(args: &J2LintCli, mut outcome: LintOutcome) -> i32 {
	outcome.sort();

	if args.json {
		let output = serde_json::json!({
			"ERRORS": json_issues(&outcome.errors),
			"WARNINGS": json_issues(&outcome.warnings),
		});
		println!("{output}");
	} else if outcome.is_clean() {
		println!("Linting complete. No problems found.");
	} else {
		if !outcome.errors.is_empty() {
			println!();
			println!("{}", colored!("JINJA2 LINT ERRORS", red));
			print_issues(&outcome.errors, args.verbose);
		}

		if !outcome.warnings.is_empty() {
			println!();
			println!("{}", colored!("JINJA2 LINT WARNINGS", yellow));
			print_issues(&outcome.warnings, args.verbose);
		}

		let summary = format!(
			"Jinja2 linting finished with {} issue(s) and {} warning(s)",
			outcome.errors.len(),
			outcome.warnings.len()
		);
		println!("{}", colored!(summary, bold));
	}

	if outcome.errors.is_empty() {
		0
	} else {
		EXIT_LINT_ERRORS
	}
}

/// Print issues grouped under a banner per file. Expects `issues` sorted.
fn print_issues(issues: &[Issue], verbose: bool) {
	let mut current_file: Option<&str> = None;

	for issue in issues {
		if current_file != Some(issue.filename.as_str()) {
			println!("************ File {}", issue.filename);
			current_file = Some(issue.filename.as_str());
		}
		println!("{}", format_issue(issue, verbose));
	}
}

fn format_issue(issue: &Issue, verbose: bool) -> String {
	if verbose {
		format!(
			"Linting rule: {}\nRule description: {}\nError line: {}:{} {}\nError message: {}\n",
			issue.id, issue.description, issue.filename, issue.line_number, issue.line, issue.message
		)
	} else {
		format!(
			"{}:{} {} ({})",
			issue.filename, issue.line_number, issue.message, issue.short_description
		)
	}
}

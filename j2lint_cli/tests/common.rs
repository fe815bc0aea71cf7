use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const SINGLE_SPACE_MESSAGE: &str =
	"Jinja statement should have a single space before and after: '{% statement %}'";

pub fn j2lint_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("j2lint"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

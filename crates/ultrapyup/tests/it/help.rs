use crate::common::{INSTA_FILTERS, ultrapyup_command, ultrapyup_help};
use crate::ultrapyup_snapshot;

#[test]
fn help_shows_all_commands() {
    ultrapyup_snapshot!(&INSTA_FILTERS, ultrapyup_help(), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    Set up Python projects with a package manager, migrated dependencies and dev tooling.

    Usage: ultrapyup [OPTIONS] <COMMAND>

    Commands:
      init  Initialize a Python project: detect it, migrate requirements and configure tools
      help  Print this message or the help of the given subcommand(s)

    Options:
      -v, --verbose...  Increase logging verbosity
      -q, --quiet       Suppress all output except errors
      -h, --help        Print help
      -V, --version     Print version

    Use `ultrapyup help <command>` for more information on a specific command.
    ----- stderr -----
    "#);
}

#[test]
fn help_init() {
    let mut cmd = ultrapyup_command();
    cmd.args(["help", "init"]);

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Initialize a Python project"));
    for flag in [
        "--directory",
        "--package-manager",
        "--no-install",
        "--tool-defaults",
        "--output-format",
        "--editor",
        "--pre-commit",
    ] {
        assert!(stdout.contains(flag), "missing {flag} in: {stdout}");
    }
    assert!(stdout.contains("ULTRAPYUP_PACKAGE_MANAGER"));
    assert!(stdout.contains("vscode-copilot"));
    assert!(stdout.contains("lefthook"));
}

#[test]
fn unknown_package_manager_is_rejected() {
    let mut cmd = ultrapyup_command();
    cmd.args(["init", "--package-manager", "conda"]);

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("conda"), "Expected the rejected value, got: {stderr}");
}

#[test]
fn unknown_command_errors() {
    let mut cmd = ultrapyup_command();
    cmd.arg("nonexistent");

    let output = cmd.output().expect("Failed to execute ultrapyup");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn no_args_shows_help() {
    let mut cmd = ultrapyup_command();

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stderr = String::from_utf8_lossy(&output.stderr);

    // clap errors with "requires a subcommand" when no subcommand given
    assert!(!output.status.success());
    assert!(
        stderr.contains("Usage") || stderr.contains("subcommand"),
        "Expected usage info in stderr, got: {stderr}"
    );
}

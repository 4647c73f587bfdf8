use tempfile::TempDir;

use crate::common::ultrapyup_init;

#[test]
fn quiet_suppresses_progress() {
    let dir = TempDir::new().unwrap();
    fs_err::write(dir.path().join("requirements.txt"), "flask==3.0.0\n").unwrap();

    let mut cmd = ultrapyup_init(dir.path());
    cmd.args(["--quiet", "--package-manager", "pip"]);

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0));
    assert!(
        stderr.is_empty(),
        "Expected no output with --quiet, got: {stderr}"
    );
    assert!(dir.path().join("pyproject.toml").is_file());
}

#[test]
fn quiet_keeps_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");

    let mut cmd = ultrapyup_init(&missing);
    cmd.arg("--quiet");

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr.contains("failed to inspect"),
        "Expected the error with --quiet, got: {stderr}"
    );
}

#[test]
fn verbose_flag_emits_diagnostics() {
    let dir = TempDir::new().unwrap();

    let mut cmd = ultrapyup_init(dir.path());
    cmd.args(["--verbose", "--package-manager", "uv"]);

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0));
    assert!(
        stderr.contains("DEBUG"),
        "Expected debug logs with --verbose, got: {stderr}"
    );
}

#[test]
fn double_verbose_accepted() {
    let dir = TempDir::new().unwrap();

    let mut cmd = ultrapyup_init(dir.path());
    cmd.args(["-vv", "--package-manager", "uv"]);

    let output = cmd.output().expect("Failed to execute ultrapyup");

    assert_eq!(output.status.code(), Some(0));
}

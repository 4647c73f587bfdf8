use crate::common::ultrapyup_command;

#[test]
fn version_flag_shows_version() {
    let mut cmd = ultrapyup_command();
    cmd.arg("--version");

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(
        stdout.starts_with("ultrapyup "),
        "Expected version string starting with 'ultrapyup ', got: {stdout}"
    );
}

#[test]
fn short_version_flag_works() {
    let mut cmd = ultrapyup_command();
    cmd.arg("-V");

    let output = cmd.output().expect("Failed to execute ultrapyup");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert_eq!(stdout.trim(), format!("ultrapyup {}", env!("CARGO_PKG_VERSION")));
}

// The `unreachable_pub` is to silence false positives in RustRover.
#![allow(dead_code, unreachable_pub)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// Insta snapshot filters shared across ultrapyup tests.
pub const INSTA_FILTERS: &[(&str, &str)] = &[
    // Rewrite Windows output to Unix output
    (r"\\([\w\d]|\.)", "/$1"),
    (r"ultrapyup\.exe", "ultrapyup"),
    // ultrapyup version display
    (
        r"ultrapyup \d+\.\d+\.\d+(-(alpha|beta|rc)\.\d+)?(\+\d+)?",
        r"ultrapyup [VERSION]",
    ),
    // Trim end-of-line whitespaces
    (r"([^\s])[ \t]+(\r?\n)", "$1$2"),
];

/// Returns the ultrapyup binary that cargo built before launching the tests.
pub fn get_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ultrapyup"))
}

/// Create an `ultrapyup` command for testing.
pub fn ultrapyup_command() -> Command {
    let mut command = Command::new(get_bin());
    // Clear environment variables that might interfere with tests.
    command.env_remove("ULTRAPYUP_PACKAGE_MANAGER");
    command.env_remove("ULTRAPYUP_NO_INSTALL");
    command.env_remove("RUST_LOG");
    command
}

/// Create an `ultrapyup help` command.
pub fn ultrapyup_help() -> Command {
    let mut command = ultrapyup_command();
    command.arg("help");
    command
}

/// Create an `ultrapyup init` command for `directory` that never installs anything.
pub fn ultrapyup_init(directory: &Path) -> Command {
    let mut command = ultrapyup_command();
    command.arg("init").arg("--directory").arg(directory).arg("--no-install");
    command
}

/// Filters for output that mentions `directory`.
pub fn filters_for(directory: &Path) -> Vec<(String, String)> {
    let mut filters = vec![(regex::escape(&directory.display().to_string()), "[TEMP]".to_owned())];
    filters.extend(
        INSTA_FILTERS
            .iter()
            .map(|(pattern, replacement)| ((*pattern).to_owned(), (*replacement).to_owned())),
    );
    filters
}

/// The fixture directory `name` under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copy the fixture `name` into `destination` so tests never modify the original.
pub fn copy_fixture(name: &str, destination: &Path) {
    copy_dir(&fixture(name), destination);
}

fn copy_dir(source: &Path, destination: &Path) {
    fs_err::create_dir_all(destination).unwrap();
    for entry in fs_err::read_dir(source).unwrap() {
        let entry = entry.unwrap();
        let target = destination.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs_err::copy(entry.path(), target).unwrap();
        }
    }
}

/// Snapshot test helper macro. Runs a command and asserts against an insta snapshot.
#[macro_export]
macro_rules! ultrapyup_snapshot {
    ($filters:expr, $command:expr, @$expected:literal) => {{
        let output = $command.output().expect("Failed to execute ultrapyup");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let mut combined = format!(
            "success: {:?}\nexit_code: {}\n----- stdout -----\n{}\n----- stderr -----\n{}",
            output.status.success(),
            output.status.code().unwrap_or(-1),
            stdout.trim(),
            stderr.trim(),
        );

        // Apply filters
        for (pattern, replacement) in $filters.iter() {
            let re = regex::Regex::new(pattern.as_ref()).expect("Invalid filter regex");
            combined = re.replace_all(&combined, AsRef::<str>::as_ref(replacement)).to_string();
        }

        insta::assert_snapshot!(combined, @$expected);
    }};
}

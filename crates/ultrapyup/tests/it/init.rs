use indoc::indoc;
use tempfile::TempDir;

use crate::common::{copy_fixture, filters_for, ultrapyup_init};
use crate::ultrapyup_snapshot;

#[test]
fn requirements_only_with_pip() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("flask-app");
    fs_err::create_dir(&project).unwrap();
    fs_err::write(project.join("requirements.txt"), "flask==3.0.0\n").unwrap();

    let mut cmd = ultrapyup_init(&project);
    cmd.args(["--package-manager", "pip"]);

    ultrapyup_snapshot!(filters_for(&project), cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    Detected requirements.txt only
    Using pip (explicitly requested)
    Migrated `requirements.txt` into `project.dependencies` (1 added)
    Added default `[tool.ruff]` configuration
    Added default `[tool.mypy]` configuration
    Added default `[tool.pytest]` configuration
    Created `[TEMP]/pyproject.toml`
    Initialized pip project: migrated 1 dependency, configured ruff, mypy, pytest.
    Run `pip install ruff mypy pytest` to install the development tools
    ");

    insta::assert_snapshot!(fs_err::read_to_string(project.join("pyproject.toml")).unwrap(), @r#"
    [project]
    name = "flask-app"
    version = "0.1.0"
    dependencies = [
        "flask==3.0.0",
    ]

    [build-system]
    requires = ["hatchling"]
    build-backend = "hatchling.build"

    [tool.ruff]
    line-length = 88

    [tool.ruff.lint]
    select = ["E", "F", "I", "UP", "B"]

    [tool.mypy]
    strict = true
    warn_unused_ignores = true

    [tool.pytest.ini_options]
    testpaths = ["tests"]
    addopts = "-ra"
    "#);

    // The requirements file is left in place.
    assert_eq!(
        fs_err::read_to_string(project.join("requirements.txt")).unwrap(),
        "flask==3.0.0\n"
    );
}

#[test]
fn second_run_is_a_noop() {
    let temp = TempDir::new().unwrap();
    fs_err::write(temp.path().join("requirements.txt"), "flask==3.0.0\n").unwrap();

    let first = ultrapyup_init(temp.path())
        .args(["--package-manager", "uv"])
        .output()
        .unwrap();
    assert!(first.status.success());
    let manifest = fs_err::read_to_string(temp.path().join("pyproject.toml")).unwrap();

    let mut cmd = ultrapyup_init(temp.path());
    cmd.args(["--package-manager", "uv"]);
    ultrapyup_snapshot!(filters_for(temp.path()), cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    Detected pyproject.toml only
    Using uv (explicitly requested)
    Kept existing `[tool.ruff]` configuration
    Kept existing `[tool.ty]` configuration
    Kept existing `[tool.pytest]` configuration
    Nothing to change
    Initialized uv project: migrated 0 dependencies, no new tool configuration.
    Run `uv add --dev ruff ty pytest` to install the development tools
    ");

    assert_eq!(
        fs_err::read_to_string(temp.path().join("pyproject.toml")).unwrap(),
        manifest
    );
}

#[test]
fn empty_directory_without_terminal() {
    let temp = TempDir::new().unwrap();

    ultrapyup_snapshot!(filters_for(temp.path()), ultrapyup_init(temp.path()), @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    Detected no project
    warning: no package manager selected; pass `--package-manager` to choose one
    ");

    assert!(!temp.path().join("pyproject.toml").exists());
}

#[test]
fn package_manager_from_environment() {
    let temp = TempDir::new().unwrap();

    let output = ultrapyup_init(temp.path())
        .env("ULTRAPYUP_PACKAGE_MANAGER", "poetry")
        .args(["--output-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["package-manager"]["kind"], "poetry");
    assert_eq!(result["package-manager"]["provenance"]["source"], "explicit");

    let manifest = fs_err::read_to_string(temp.path().join("pyproject.toml")).unwrap();
    assert!(manifest.contains("build-backend = \"poetry.core.masonry.api\""));
}

#[test]
fn existing_project_json_report() {
    let temp = TempDir::new().unwrap();
    copy_fixture("web-app", temp.path());

    let output = ultrapyup_init(temp.path())
        .args(["--output-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["state"], "pyproject-only");
    assert_eq!(result["package-manager"]["kind"], "pip");
    assert_eq!(result["package-manager"]["provenance"]["source"], "lockfile");
    assert_eq!(
        result["package-manager"]["provenance"]["evidence"],
        "requirements.txt"
    );
    assert_eq!(result["needed-user-choice"], false);
    assert_eq!(result["manifest-created"], false);
    assert_eq!(result["manifest-written"], true);

    let migrations = result["migrations"].as_array().unwrap();
    assert_eq!(migrations.len(), 2);
    assert_eq!(migrations[0]["added"].as_array().unwrap().len(), 3);
    assert_eq!(migrations[0]["skipped"][0]["name"], "django");
    assert_eq!(migrations[1]["source"], "requirements-dev.txt");
    assert_eq!(migrations[1]["added"].as_array().unwrap().len(), 2);

    let tools: Vec<_> = result["tool-configs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|config| {
            (
                config["tool"].as_str().unwrap(),
                config["outcome"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        tools,
        [
            ("ruff", "already-configured"),
            ("mypy", "written"),
            ("pytest", "written"),
        ]
    );

    // `--index-url` is reported rather than dropped.
    let warnings = result["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["kind"], "requirement");
    assert_eq!(warnings[0]["line"], 4);

    let manifest = fs_err::read_to_string(temp.path().join("pyproject.toml")).unwrap();
    assert!(manifest.starts_with(indoc! {r#"
        # Managed by hand until the migration.
        [project]
        name = "web-app"
        version = "2.3.0"
        dependencies = [
            "django>=4.2",  # pinned by the platform team
            "psycopg[binary]==3.1.18",
    "#}));
    assert!(manifest.contains("[tool.ruff]\nline-length = 100\n"));
}

#[test]
fn tool_defaults_file() {
    let temp = TempDir::new().unwrap();
    let defaults = temp.path().join("defaults.toml");
    fs_err::write(&defaults, "[ruff]\nline-length = 120\ntarget-version = \"py312\"\n").unwrap();
    let project = temp.path().join("project");
    fs_err::create_dir(&project).unwrap();

    let output = ultrapyup_init(&project)
        .args(["--package-manager", "uv", "--tool-defaults"])
        .arg(&defaults)
        .output()
        .unwrap();
    assert!(output.status.success());

    let manifest = fs_err::read_to_string(project.join("pyproject.toml")).unwrap();
    assert!(manifest.contains("[tool.ruff]\nline-length = 120\ntarget-version = \"py312\"\n"));
    assert!(manifest.contains("[tool.ty.environment]\npython = \"./.venv\"\n"));
}

#[test]
fn invalid_tool_defaults_file() {
    let temp = TempDir::new().unwrap();
    let defaults = temp.path().join("defaults.toml");
    fs_err::write(&defaults, "ruff = 3\n").unwrap();

    let output = ultrapyup_init(temp.path())
        .args(["--package-manager", "uv", "--tool-defaults"])
        .arg(&defaults)
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("must be a table"), "got: {stderr}");
    assert!(!temp.path().join("pyproject.toml").exists());
}

#[test]
fn editor_rules_and_git_hooks() {
    let temp = TempDir::new().unwrap();
    fs_err::write(temp.path().join("CLAUDE.md"), "# Team notes\n").unwrap();

    let mut cmd = ultrapyup_init(temp.path());
    cmd.args(["--package-manager", "uv"])
        .args(["--editor", "claude", "--editor", "zed", "--editor", "zed"])
        .args(["--pre-commit", "lefthook"]);

    ultrapyup_snapshot!(filters_for(temp.path()), cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    Detected no project
    Using uv (explicitly requested)
    Added default `[tool.ruff]` configuration
    Added default `[tool.ty]` configuration
    Added default `[tool.pytest]` configuration
    Created `[TEMP]/pyproject.toml`
    Created `.rules`
    Created `.zed/settings.json`
    Kept existing `CLAUDE.md`
    Created `lefthook.yaml`
    Initialized uv project: migrated 0 dependencies, configured ruff, ty, pytest.
    Run `uv add --dev ruff ty pytest lefthook` to install the development tools
    Then run `uv run lefthook install` to enable the git hooks
    ");

    assert_eq!(
        fs_err::read_to_string(temp.path().join("CLAUDE.md")).unwrap(),
        "# Team notes\n"
    );
    let rules = fs_err::read_to_string(temp.path().join(".rules")).unwrap();
    assert!(rules.contains("`uv run ty check`"));
    let hooks = fs_err::read_to_string(temp.path().join("lefthook.yaml")).unwrap();
    assert!(hooks.contains("run: uv run ruff check --fix {staged_files}"));
    assert!(!temp.path().join(".pre-commit-config.yaml").exists());
}

#[test]
fn extras_in_json_report() {
    let temp = TempDir::new().unwrap();
    fs_err::write(temp.path().join("requirements.txt"), "flask\n").unwrap();

    let output = ultrapyup_init(temp.path())
        .args(["--output-format", "json"])
        .args(["--editor", "cursor", "--pre-commit", "pre-commit"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["package-manager"]["kind"], "pip");
    assert_eq!(result["editor-files"][0]["path"], ".cursor/rules/ultrapyup.mdc");
    assert_eq!(result["editor-files"][0]["outcome"], "created");
    assert_eq!(result["hook-files"][0]["path"], ".pre-commit-config.yaml");
    assert_eq!(
        result["install-plan"]["packages"],
        serde_json::json!(["ruff", "mypy", "pytest", "pre-commit"])
    );

    let config = fs_err::read_to_string(temp.path().join(".pre-commit-config.yaml")).unwrap();
    assert!(config.contains("entry: mypy ."));
}

#[test]
fn extras_need_a_package_manager() {
    let temp = TempDir::new().unwrap();

    let output = ultrapyup_init(temp.path())
        .args(["--editor", "codex", "--pre-commit", "lefthook"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!temp.path().join("AGENTS.md").exists());
    assert!(!temp.path().join("lefthook.yaml").exists());
}

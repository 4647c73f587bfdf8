use indoc::indoc;
use tempfile::TempDir;
use ultrapyup::project::manifest::{DependencySection, LoadOutcome, Manifest};
use ultrapyup::project::migrate::migrate;
use ultrapyup::project::requirements::RequirementsFile;

use crate::common::{copy_fixture, fixture};

#[test]
fn unsupported_lines_are_reported() {
    let directory = fixture("legacy-lines");
    let parsed =
        RequirementsFile::from_path(&directory.join("requirements.txt"), &directory).unwrap();

    let records: Vec<_> = parsed.records.iter().map(ToString::to_string).collect();
    assert_eq!(
        records,
        [
            "requests==2.31.0",
            "numpy>=1.20",
            "attrs @ https://example.com/attrs-23.1.0-py3-none-any.whl",
        ]
    );

    let warnings: Vec<_> = parsed
        .warnings
        .iter()
        .map(|warning| (warning.line, warning.content.as_str()))
        .collect();
    assert_eq!(
        warnings,
        [
            (5, "-e git+https://github.com/example/project.git#egg=project"),
            (6, "https://example.com/archive.tar.gz"),
            (7, "pandas==="),
        ]
    );
    assert!(parsed.warnings[0].reason.contains("editable"));
    assert!(parsed.warnings[1].reason.contains("package name"));
}

#[test]
fn includes_merge_into_an_existing_manifest() {
    let temp = TempDir::new().unwrap();
    copy_fixture("web-app", temp.path());

    let LoadOutcome::Loaded(mut manifest) = Manifest::load(temp.path()).unwrap() else {
        panic!("the fixture has a valid manifest");
    };
    let report = migrate(
        temp.path(),
        &temp.path().join("requirements.txt"),
        &mut manifest,
        &DependencySection::Project,
    )
    .unwrap();

    let added: Vec<_> = report.added.iter().map(ToString::to_string).collect();
    assert_eq!(added[..2], ["psycopg[binary]==3.1.18", "requests==2.31.0"]);
    assert_eq!(added.len(), 3);
    assert!(added[2].starts_with("gunicorn>=21.2; sys_platform"));
    assert!(added[2].contains("win32"));
    assert_eq!(report.skipped[0].to_string(), "django>=4.2,<5.0");
    assert!(report.warnings.is_empty());

    let rendered = manifest.to_string();
    assert!(rendered.starts_with(indoc! {r#"
        # Managed by hand until the migration.
        [project]
        name = "web-app"
        version = "2.3.0"
        dependencies = [
            "django>=4.2",  # pinned by the platform team
            "psycopg[binary]==3.1.18",
            "requests==2.31.0",
    "#}));
    assert!(rendered.ends_with(",\n]\n\n[tool.ruff]\nline-length = 100\n"));

    let document: toml_edit::DocumentMut = rendered.parse().unwrap();
    let dependencies: Vec<_> = document["project"]["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|value| value.as_str())
        .collect();
    let expected: Vec<_> = std::iter::once("django>=4.2")
        .chain(added.iter().map(String::as_str))
        .collect();
    assert_eq!(dependencies, expected);

    // Nothing is written until the caller saves.
    let on_disk = fs_err::read_to_string(temp.path().join("pyproject.toml")).unwrap();
    assert!(!on_disk.contains("psycopg"));
    assert!(manifest.save().unwrap());
    assert!(!manifest.save().unwrap());
}

#[test]
fn fixtures_are_not_modified() {
    let directory = fixture("web-app");
    let before = fs_err::read_to_string(directory.join("pyproject.toml")).unwrap();

    let temp = TempDir::new().unwrap();
    copy_fixture("web-app", temp.path());
    let mut manifest = Manifest::from_content(temp.path().join("pyproject.toml"), &before).unwrap();
    migrate(
        temp.path(),
        &temp.path().join("requirements-dev.txt"),
        &mut manifest,
        &DependencySection::Group("dev".to_owned()),
    )
    .unwrap();

    assert_eq!(
        fs_err::read_to_string(directory.join("pyproject.toml")).unwrap(),
        before
    );
}

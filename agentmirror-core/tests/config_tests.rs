//! Config loading, override and validation tests.

use assert_fs::prelude::*;
use agentmirror_core::{config, Category, ConfigError, TargetName};
use predicates::prelude::*;
use rstest::rstest;

fn write_config(home: &assert_fs::TempDir, yaml: &str) {
    home.child(".agentmirror")
        .child("config.yaml")
        .write_str(yaml)
        .expect("write config");
}

// ---------------------------------------------------------------------------
// 1. Happy path
// ---------------------------------------------------------------------------

#[test]
fn full_config_is_resolved_in_order() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(
        &home,
        r#"
source_root: ~/agents-src
base_file: BASE.md
legacy_prefix: LEGACY
categories: [commands, hooks]
targets:
  - { path: ~/.one, name: One, base_file: ONE.md, import_source: true }
  - { path: /abs/two, name: Two, base_file: TWO.md }
"#,
    );

    let cfg = config::load_at(home.path()).expect("load");
    assert_eq!(cfg.source_root, home.path().join("agents-src"));
    assert_eq!(cfg.base_file, "BASE.md");
    assert_eq!(cfg.legacy_prefix, "LEGACY");
    assert_eq!(cfg.categories, vec![Category::from("commands"), Category::from("hooks")]);
    assert_eq!(cfg.targets.len(), 2);
    assert_eq!(cfg.targets[0].name, TargetName::from("One"));
    assert_eq!(cfg.targets[0].root, home.path().join(".one"));
    assert!(cfg.targets[0].import_source);
    assert!(!cfg.targets[1].import_source);
    assert_eq!(cfg.targets[1].root, std::path::PathBuf::from("/abs/two"));
}

#[test]
fn partial_config_keeps_remaining_defaults() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, "source_root: /srv/dotfiles\n");

    let cfg = config::load_at(home.path()).expect("load");
    let defaults = config::default_at(home.path());
    assert_eq!(cfg.source_root, std::path::PathBuf::from("/srv/dotfiles"));
    assert_eq!(cfg.targets, defaults.targets);
    assert_eq!(cfg.categories, defaults.categories);
}

// ---------------------------------------------------------------------------
// 2. Errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, ": : corrupt : yaml : !!!\n  - broken: [unclosed");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(predicate::str::contains("config.yaml").eval(&err.to_string()));
}

#[test]
fn unknown_field_is_rejected() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, "sauce_root: /typo\n");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn explicit_missing_file_is_io_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let missing = home.path().join("nope.yaml");
    let err = config::load_from(&missing, home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
}

#[rstest]
#[case("categories: [skills, skills]\n", "listed twice")]
#[case("categories: [a/b]\n", "single visible directory name")]
#[case("categories: [.hidden]\n", "single visible directory name")]
#[case("base_file: nested/BASE.md\n", "plain file name")]
#[case("legacy_prefix: \"\"\n", "not usable")]
#[case(
    "targets:\n  - { path: /t, name: A, base_file: A.md }\n  - { path: /t, name: B, base_file: B.md }\n",
    "listed twice"
)]
fn invalid_values_are_rejected(#[case] yaml: &str, #[case] needle: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, yaml);

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "got: {err}");
    assert!(err.to_string().contains(needle), "message: {err}");
}

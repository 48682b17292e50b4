use reg_publish_local::load_config::{load_config, NO_EMIT_ENV, ROOT_ENV};
use reg_publish_local_core::contract::{Layout, Schedule};
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
publisher:
  root_path: /tmp/bucket/reg-publish-local-test
  pattern: "**/*.png"
  layout: nested
  schedule: batched
  concurrency: 10
working_dirs:
  base: ./report
  actual_dir: ./report/dir_a
  expected_dir: ./report/dir_b
  diff_dir: ./report/diff
"#;

fn config_file(contents: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), contents).unwrap();
    file
}

#[test]
#[serial]
fn test_load_config_parses_all_sections() {
    env::remove_var(ROOT_ENV);
    env::remove_var(NO_EMIT_ENV);
    let file = config_file(FULL_CONFIG);

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.publisher.root_path, PathBuf::from("/tmp/bucket/reg-publish-local-test"));
    assert_eq!(config.publisher.pattern.as_deref(), Some("**/*.png"));
    assert_eq!(config.publisher.layout, Layout::Nested);
    assert_eq!(config.publisher.schedule, Schedule::Batched);
    assert_eq!(config.publisher.concurrency, Some(10));
    assert_eq!(config.working_dirs.actual_dir, PathBuf::from("./report/dir_a"));
    assert_eq!(config.working_dirs.actual_name(), "dir_a");
    assert!(!config.no_emit);
}

#[test]
#[serial]
fn test_load_config_defaults_optional_publisher_fields() {
    env::remove_var(ROOT_ENV);
    env::remove_var(NO_EMIT_ENV);
    let file = config_file(
        "publisher:\n  root_path: /srv/store\nworking_dirs:\n  base: .\n  actual_dir: ./actual\n  expected_dir: ./expected\nno_emit: true\n",
    );

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.publisher.pattern, None);
    assert_eq!(config.publisher.layout, Layout::Flat);
    assert_eq!(config.publisher.schedule, Schedule::Pooled);
    assert_eq!(config.working_dirs.diff_dir, PathBuf::new());
    assert!(config.no_emit);
}

#[test]
#[serial]
fn test_load_config_applies_environment_overrides() {
    let file = config_file(FULL_CONFIG);
    env::set_var(ROOT_ENV, "/override/root");
    env::set_var(NO_EMIT_ENV, "true");

    let config = load_config(file.path()).expect("Config should load");
    env::remove_var(ROOT_ENV);
    env::remove_var(NO_EMIT_ENV);

    assert_eq!(config.publisher.root_path, PathBuf::from("/override/root"));
    assert!(config.no_emit);
}

#[test]
#[serial]
fn test_load_config_rejects_bad_no_emit_flag() {
    env::remove_var(ROOT_ENV);
    let file = config_file(FULL_CONFIG);
    env::set_var(NO_EMIT_ENV, "sometimes");

    let err = load_config(file.path()).unwrap_err();
    env::remove_var(NO_EMIT_ENV);

    assert!(err.to_string().contains(NO_EMIT_ENV), "got: {err}");
}

#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let file = config_file("not-yaml: [:::");

    let err = load_config(file.path()).unwrap_err();
    let msg = err.to_string();

    assert!(msg.contains("parse") || msg.contains("YAML"), "Parse error expected, got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();

    assert!(err.to_string().contains("Failed to read config file"), "got: {err}");
}

use std::fs::{create_dir_all, write};

use reg_publish_local_core::classify::MimeClassifier;
use reg_publish_local_core::contract::DEFAULT_PATTERN;
use reg_publish_local_core::enumerate::list;
use reg_publish_local_core::StoreError;
use tempfile::tempdir;

fn relative_paths(items: &[reg_publish_local_core::contract::FileItem]) -> Vec<&str> {
    items.iter().map(|i| i.relative_path.as_str()).collect()
}

#[test]
fn test_list_default_pattern_selects_report_files_recursively() {
    let tmp = tempdir().unwrap();
    let base = tmp.path();
    create_dir_all(base.join("dir_a/nested")).unwrap();
    write(base.join("index.html"), "<html></html>").unwrap();
    write(base.join("dir_a/sample.png"), [0x89, b'P', b'N', b'G']).unwrap();
    write(base.join("dir_a/nested/data.json"), "{}").unwrap();
    write(base.join("notes.txt"), "not a report file").unwrap();

    let items = list(base, DEFAULT_PATTERN, &MimeClassifier).expect("listing should succeed");

    assert_eq!(
        relative_paths(&items),
        vec!["dir_a/nested/data.json", "dir_a/sample.png", "index.html"]
    );
    for item in &items {
        assert!(item.absolute_path.is_absolute());
        assert!(item.absolute_path.is_file());
    }
    let png = items.iter().find(|i| i.relative_path == "dir_a/sample.png").unwrap();
    assert_eq!(png.mime_type, "image/png");
}

#[test]
fn test_list_drops_files_without_a_content_type() {
    let tmp = tempdir().unwrap();
    let base = tmp.path();
    write(base.join("sample.png"), "png").unwrap();
    write(base.join("mystery.zzqq"), "unknown").unwrap();
    write(base.join("LICENSE"), "no extension").unwrap();

    let items = list(base, "**/*", &MimeClassifier).expect("listing should succeed");

    assert_eq!(relative_paths(&items), vec!["sample.png"]);
}

#[test]
fn test_list_custom_pattern_keeps_star_within_one_segment() {
    let tmp = tempdir().unwrap();
    let base = tmp.path();
    create_dir_all(base.join("deep")).unwrap();
    write(base.join("top.png"), "png").unwrap();
    write(base.join("deep/below.png"), "png").unwrap();

    let items = list(base, "*.png", &MimeClassifier).unwrap();

    assert_eq!(relative_paths(&items), vec!["top.png"]);
}

#[test]
fn test_list_rejects_invalid_pattern() {
    let tmp = tempdir().unwrap();

    let err = list(tmp.path(), "**/*.{png", &MimeClassifier).unwrap_err();

    assert!(matches!(err, StoreError::Pattern { .. }), "got {err:?}");
}

#[test]
fn test_list_fails_for_missing_base_directory() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("does-not-exist");

    let err = list(&missing, DEFAULT_PATTERN, &MimeClassifier).unwrap_err();

    assert!(matches!(err, StoreError::Enumeration { .. }), "got {err:?}");
    assert!(err.to_string().contains("enumerate"));
}

#[test]
fn test_list_skips_dotfiles_and_dot_directories() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join(".reg");
    create_dir_all(base.join(".cache")).unwrap();
    write(base.join(".cache/x.png"), "png").unwrap();
    write(base.join(".hidden.png"), "png").unwrap();
    write(base.join("visible.png"), "png").unwrap();

    let items = list(&base, DEFAULT_PATTERN, &MimeClassifier).unwrap();

    assert_eq!(relative_paths(&items), vec!["visible.png"]);
}

use std::fs;

use chainbench::{list_or, scenario_or_default};
use tempfile::tempdir;

/// Explicit lists replace scenario lists instead of merging.
#[test]
fn list_or_prefers_explicit_values() {
    let explicit = vec!["a".to_string()];
    let fallback = vec!["b".to_string(), "c".to_string()];
    assert_eq!(list_or(&explicit, &fallback), explicit);
    assert_eq!(list_or(&[], &fallback), fallback);
}

#[test]
fn scenario_or_default_without_path_is_empty() {
    let scenario = scenario_or_default(None).unwrap();
    assert!(scenario.stem.is_none());
    assert!(scenario.vars.is_empty());
}

/// A broken scenario file surfaces its path in the error.
#[test]
fn scenario_or_default_reports_path_on_failure() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("broken.yaml");
    fs::write(&path, "stem: [unterminated").unwrap();
    let err = scenario_or_default(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Failed to load scenario file"), "unexpected error: {err}");
}

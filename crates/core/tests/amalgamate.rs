use std::fs;

use chainbench_core::amalgamate::{
    amalgamate, render_instrumented, resolve_output_path, strip_entry_point, AmalgamateRequest,
};
use chainbench_core::model::TextUnit;
use chainbench_core::ChainError;
use tempfile::tempdir;

const SCAFFOLD: &str = r#"#include "state.h"

static void helper(void) { cb_reset(); }

int main(void){
  cb_reset();
  if (1) {
    while (0) { helper(); }
  }
  return 0;
}

/* trailing */
"#;

fn write_inputs(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let fragment = dir.join("CWE190_demo_01.c");
    let adapter = dir.join("adapter.c");
    let scaffold = dir.join("main_single.c");
    fs::write(&fragment, "int CWE190_demo_01_bad(void){ klee_assert(a + b <= INT_MAX); return 0; }\n")
        .unwrap();
    fs::write(&adapter, "int chainbench_run(void){ return 0; }\n").unwrap();
    fs::write(&scaffold, SCAFFOLD).unwrap();
    (fragment, adapter, scaffold)
}

/// Nested blocks inside `main` are consumed; no stray `}` is left behind.
#[test]
fn strip_entry_point_removes_nested_body_entirely() {
    let stripped = strip_entry_point(SCAFFOLD, "main");
    assert!(!stripped.contains("int main"));
    assert!(!stripped.contains("return 0;"));
    assert!(stripped.contains("static void helper(void) { cb_reset(); }"));
    assert!(stripped.contains("(main removed by chainbench instrument)"));
    // Nothing between the marker and the trailing comment but whitespace.
    let after_marker = stripped.split("*/").nth(1).expect("marker end");
    assert_eq!(after_marker.trim(), "/* trailing");
}

/// A scaffold without `main` passes through untouched.
#[test]
fn strip_entry_point_without_signature_is_identity() {
    let text = "void not_main(void) { }\nint mainly = 3;\n";
    assert_eq!(strip_entry_point(text, "main"), text);
}

#[test]
fn strip_entry_point_accepts_parameters_and_whitespace() {
    let text = "int  main ( int argc, char **argv )\n{ { } }\nint after;\n";
    let stripped = strip_entry_point(text, "main");
    assert!(!stripped.contains("argc"));
    assert!(stripped.ends_with("\nint after;\n"));
}

/// Only the first `main` definition is removed.
#[test]
fn strip_entry_point_only_removes_first_definition() {
    let text = "int main(void) { return 1; }\nint main(void) { return 2; }\n";
    let stripped = strip_entry_point(text, "main");
    assert!(!stripped.contains("return 1;"));
    assert!(stripped.contains("return 2;"));
}

/// Adapter, scaffold, then source; one banner pair each.
#[test]
fn render_places_regions_in_fixed_order() {
    let fragment = TextUnit::new("source", "frag.c", "FRAGMENT_BODY\n");
    let adapter = TextUnit::new("adapter", "adapter.c", "ADAPTER_BODY\n");
    let scaffold = TextUnit::new("main", "main_single.c", "SCAFFOLD_BODY\nint main(void){ }\n");

    let text = render_instrumented("frag", &fragment, &adapter, &scaffold, "main");
    assert!(text.starts_with("/* instrumented file generated for frag */\n#include <stdio.h>\n"));
    assert!(text.contains("#include \"state.h\"\n"));

    let adapter_at = text.find("BEGIN ADAPTER: adapter.c").unwrap();
    let scaffold_at = text.find("BEGIN MAIN_SINGLE (no main()): main_single.c").unwrap();
    let fragment_at = text.find("BEGIN JULIET SOURCE: frag.c").unwrap();
    assert!(adapter_at < scaffold_at && scaffold_at < fragment_at);
    assert!(text.find("ADAPTER_BODY").unwrap() < text.find("END ADAPTER").unwrap());
    assert_eq!(text.matches("/* ==== BEGIN").count(), 3);
    assert_eq!(text.matches("/* ==== END").count(), 3);
    assert!(!text.contains("int main(void)"));
}

/// Missing extension-less paths and existing dirs both act as directories.
#[test]
fn resolve_output_path_treats_missing_extensionless_as_dir() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("build");
    let (path, as_dir) = resolve_output_path(&out, "stem");
    assert!(as_dir);
    assert_eq!(path, out.join("instrumented_stem.c"));

    let file = dir.path().join("unit.c");
    let (path, as_dir) = resolve_output_path(&file, "stem");
    assert!(!as_dir);
    assert_eq!(path, file);

    let (path, as_dir) = resolve_output_path(dir.path(), "stem");
    assert!(as_dir);
    assert_eq!(path, dir.path().join("instrumented_stem.c"));
}

/// Re-running amalgamation yields byte-identical output.
#[test]
fn amalgamate_writes_into_directory_and_is_stable() {
    let dir = tempdir().unwrap();
    let (fragment, adapter, scaffold) = write_inputs(dir.path());
    let out_dir = dir.path().join("out").join("nested");

    let request = AmalgamateRequest::new(&fragment, &adapter, &scaffold, &out_dir);
    let first = amalgamate(&request).unwrap();
    assert_eq!(first, out_dir.join("instrumented_CWE190_demo_01.c"));
    let first_text = fs::read_to_string(&first).unwrap();

    let second = amalgamate(&request).unwrap();
    assert_eq!(first, second);
    assert_eq!(first_text, fs::read_to_string(&second).unwrap());
    assert!(first_text.contains("CWE190_demo_01_bad"));
}

#[test]
fn amalgamate_honours_explicit_file_and_stem() {
    let dir = tempdir().unwrap();
    let (fragment, adapter, scaffold) = write_inputs(dir.path());
    let out_file = dir.path().join("deep").join("unit.c");

    let request = AmalgamateRequest::new(&fragment, &adapter, &scaffold, &out_file)
        .with_stem(Some("custom_stem".into()));
    let written = amalgamate(&request).unwrap();
    assert_eq!(written, out_file);
    let text = fs::read_to_string(&written).unwrap();
    assert!(text.starts_with("/* instrumented file generated for custom_stem */"));
}

/// A missing adapter is fatal and names its role.
#[test]
fn amalgamate_fails_on_missing_adapter() {
    let dir = tempdir().unwrap();
    let (fragment, _adapter, scaffold) = write_inputs(dir.path());
    let missing = dir.path().join("nope.c");

    let request = AmalgamateRequest::new(&fragment, &missing, &scaffold, dir.path());
    let err = amalgamate(&request).unwrap_err();
    assert!(matches!(err, ChainError::MissingInput { role: "adapter", .. }), "unexpected: {err}");
    assert!(err.to_string().contains("adapter file not found"));
}

//! KLEE driver synthesis.
//!
//! A driver `#include`s the instrumented unit by name, marks the requested
//! `int` variables symbolic, optionally constrains each of them to one shared
//! inclusive range, and calls `<stem>_bad()`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::info;
use regex::Regex;

use crate::amalgamate::instrumented_file_name;
use crate::error::{ChainError, Result};

/// Inclusive bound shared by every symbolic variable of a driver.
///
/// `lo <= hi` is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub lo: i64,
    pub hi: i64,
}

impl Bound {
    pub fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }
}

fn bound_forms() -> &'static [Regex; 3] {
    static RE: OnceLock<[Regex; 3]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            // LO<=EXPR<=HI; the middle expression is a placeholder.
            Regex::new(r"^\s*(-?\d+)\s*<=\s*.*?\s*<=\s*(-?\d+)\s*$").expect("valid chain regex"),
            Regex::new(r"^\s*(-?\d+)\s*\.\.\s*(-?\d+)\s*$").expect("valid range regex"),
            Regex::new(r"^\s*(-?\d+)\s*,\s*(-?\d+)\s*$").expect("valid pair regex"),
        ]
    })
}

/// Parse `LO<=x<=HI`, `LO..HI`, or `LO,HI` into a [`Bound`].
pub fn parse_bound(expr: &str) -> Result<Bound> {
    for re in bound_forms() {
        if let Some(caps) = re.captures(expr) {
            let lo = caps[1].parse::<i64>();
            let hi = caps[2].parse::<i64>();
            return match (lo, hi) {
                (Ok(lo), Ok(hi)) => Ok(Bound::new(lo, hi)),
                _ => Err(ChainError::BoundFormat(expr.to_string())),
            };
        }
    }
    Err(ChainError::BoundFormat(expr.to_string()))
}

/// Resolve the bound from either the expression form or an explicit `lo`/`hi` pair.
///
/// The expression wins when both styles are given. Exactly one of `lo`/`hi`
/// without an expression is an error.
pub fn resolve_bound(expr: Option<&str>, lo: Option<i64>, hi: Option<i64>) -> Result<Option<Bound>> {
    if let Some(expr) = expr {
        return parse_bound(expr).map(Some);
    }
    match (lo, hi) {
        (None, None) => Ok(None),
        (Some(lo), Some(hi)) => Ok(Some(Bound::new(lo, hi))),
        _ => Err(ChainError::PartialBounds),
    }
}

/// Everything needed to render one driver.
#[derive(Debug, Clone)]
pub struct DriverSpec {
    pub stem: String,
    /// File name (not path) of the instrumented unit to `#include`.
    pub instrumented_name: String,
    pub sym_ints: Vec<String>,
    pub bound: Option<Bound>,
}

/// Name of the driver file for a stem.
pub fn driver_file_name(stem: &str) -> String {
    format!("driver_{stem}.c")
}

/// Render the driver source.
///
/// With no symbolic variables no bound block is emitted, even if a bound is set.
pub fn render_driver(spec: &DriverSpec) -> String {
    let stem = &spec.stem;

    let sym_inits = if spec.sym_ints.is_empty() {
        "  /* no symbolic ints requested */".to_string()
    } else {
        spec.sym_ints
            .iter()
            .map(|v| format!("  int {v}; make_symbolic_int(\"{v}\", &{v});"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let bound_block = match spec.bound {
        Some(Bound { lo, hi }) if !spec.sym_ints.is_empty() => {
            let checks = spec
                .sym_ints
                .iter()
                .map(|v| format!("  klee_assume({v} >= {lo} && {v} <= {hi});"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{checks}\n")
        }
        _ => "  /* no bounds applied */\n".to_string(),
    };

    format!(
        r#"// driver_{stem}.c: KLEE driver (single TU)
// Generated for instrumented_{stem}.c

#include "klee/klee.h"

// Pull in the full instrumented TU (main_single + adapter + source)
#include "{instr}"

// Declare Juliet bad endpoint (provided by included TU)
int {stem}_bad(void);

static void make_symbolic_int(const char* name, int* ptr) {{
  klee_make_symbolic(ptr, sizeof(*ptr), name);
}}

int main(void) {{
  // Make requested ints symbolic
{sym_inits}

{bound_block}
  // Call the Juliet bad function (entrypoint lives in the included TU)
  (void){stem}_bad();
  return 0;
}}
"#,
        instr = spec.instrumented_name,
    )
}

/// Resolve the instrumented unit: a directory means `instrumented_<stem>.c` inside it.
///
/// Fails if the resolved file does not exist.
pub fn locate_instrumented(instrumented: &Path, stem: &str) -> Result<PathBuf> {
    let path = if instrumented.is_dir() {
        instrumented.join(instrumented_file_name(stem))
    } else {
        instrumented.to_path_buf()
    };
    if !path.is_file() {
        return Err(ChainError::MissingInput { role: "instrumented", path });
    }
    Ok(path)
}

/// Locate the instrumented unit, render the driver, and write `driver_<stem>.c` into `out_dir`.
pub fn synthesize_driver(
    stem: &str,
    instrumented: &Path,
    out_dir: &Path,
    sym_ints: &[String],
    bound: Option<Bound>,
) -> Result<PathBuf> {
    let instr_path = locate_instrumented(instrumented, stem)?;
    let instrumented_name = instr_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| instrumented_file_name(stem));

    let spec = DriverSpec {
        stem: stem.to_string(),
        instrumented_name,
        sym_ints: sym_ints.to_vec(),
        bound,
    };

    fs::create_dir_all(out_dir).map_err(|e| ChainError::io(out_dir, e))?;
    let out_path = out_dir.join(driver_file_name(stem));
    fs::write(&out_path, render_driver(&spec)).map_err(|e| ChainError::io(&out_path, e))?;
    info!("synthesized driver for {stem} with {} symbolic int(s)", spec.sym_ints.len());
    Ok(out_path)
}

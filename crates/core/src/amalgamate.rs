//! Amalgamation of fragment + adapter + scaffold into one compilation unit.
//!
//! The scaffold's own entry point is removed so the unit can be included by
//! a generated driver that supplies its own `main`.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use regex::Regex;

use crate::error::{ChainError, Result};
use crate::model::TextUnit;

/// Entry point stripped from the scaffold unless told otherwise.
pub const DEFAULT_ENTRY_POINT: &str = "main";

const PREAMBLE: &str =
    "#include <stdio.h>\n#include <stdlib.h>\n#include <string.h>\n#include \"state.h\"\n";

/// Inputs for one amalgamation run.
#[derive(Debug, Clone)]
pub struct AmalgamateRequest {
    pub fragment: PathBuf,
    pub adapter: PathBuf,
    pub scaffold: PathBuf,
    /// Output file, or directory to place `instrumented_<stem>.c` in.
    pub out: PathBuf,
    /// Explicit stem; defaults to the fragment's file stem.
    pub stem: Option<String>,
    pub entry_point: String,
}

impl AmalgamateRequest {
    pub fn new(
        fragment: impl Into<PathBuf>,
        adapter: impl Into<PathBuf>,
        scaffold: impl Into<PathBuf>,
        out: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fragment: fragment.into(),
            adapter: adapter.into(),
            scaffold: scaffold.into(),
            out: out.into(),
            stem: None,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }

    pub fn with_stem(mut self, stem: Option<String>) -> Self {
        self.stem = stem;
        self
    }

    /// Stem used for banners and the default output name.
    pub fn resolved_stem(&self) -> String {
        match &self.stem {
            Some(s) => s.clone(),
            None => file_stem_string(&self.fragment),
        }
    }
}

/// Name of the instrumented unit for a stem.
pub fn instrumented_file_name(stem: &str) -> String {
    format!("instrumented_{stem}.c")
}

/// Remove the first `int <entry>(...) { ... }` definition from `text`.
///
/// Braces are balanced with a depth counter starting at 1 (the opening brace
/// of the signature). The removed span is replaced by a one-line marker. If
/// no signature is found the text is returned unchanged. An unterminated body
/// is removed through end of text.
pub fn strip_entry_point(text: &str, entry: &str) -> String {
    let pattern = format!(r"\bint\s+{}\s*\([^)]*\)\s*\{{", regex::escape(entry));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return text.to_string(),
    };
    let Some(m) = re.find(text) else {
        debug!("no `{entry}` signature found; scaffold left unchanged");
        return text.to_string();
    };

    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut end = m.end();
    while end < bytes.len() && depth > 0 {
        match bytes[end] {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
        end += 1;
    }

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..m.start()]);
    out.push_str(&format!("\n/* ({entry} removed by chainbench instrument) */\n"));
    out.push_str(&text[end..]);
    out
}

/// Decide where the instrumented unit is written.
///
/// An existing directory, or an extension-less path that does not exist yet,
/// is treated as a directory and receives `instrumented_<stem>.c`. Anything
/// else is taken as the output file itself. Does not touch the filesystem.
pub fn resolve_output_path(out: &Path, stem: &str) -> (PathBuf, bool) {
    let as_dir = out.is_dir() || (out.extension().is_none() && !out.exists());
    if as_dir {
        (out.join(instrumented_file_name(stem)), true)
    } else {
        (out.to_path_buf(), false)
    }
}

fn banner(region: &str, path: &Path) -> String {
    format!("\n\n/* ==== BEGIN {region}: {} (amalgamated) ================= */\n", path.display())
}

fn ender(region: &str) -> String {
    format!("\n/* ==== END {region} ===================================== */\n")
}

/// Render the instrumented unit text from already-loaded units.
///
/// Region order is fixed: adapter, scaffold (entry point removed), fragment.
pub fn render_instrumented(
    stem: &str,
    fragment: &TextUnit,
    adapter: &TextUnit,
    scaffold: &TextUnit,
    entry: &str,
) -> String {
    let scaffold_text = strip_entry_point(&scaffold.text, entry);

    let mut parts = String::new();
    parts.push_str(&format!("/* instrumented file generated for {stem} */\n"));
    parts.push_str(PREAMBLE);

    parts.push_str(&banner("ADAPTER", &adapter.path));
    parts.push_str(&adapter.text);
    parts.push_str(&ender("ADAPTER"));

    parts.push_str(&banner(&format!("MAIN_SINGLE (no {entry}())"), &scaffold.path));
    parts.push_str(&scaffold_text);
    parts.push_str(&ender("MAIN_SINGLE"));

    parts.push_str(&banner("JULIET SOURCE", &fragment.path));
    parts.push_str(&fragment.text);
    parts.push_str(&ender("JULIET SOURCE"));

    parts
}

/// Load the three inputs, amalgamate them, and write the unit.
///
/// Returns the path written. Output directories are created as needed and an
/// existing output file is overwritten.
pub fn amalgamate(request: &AmalgamateRequest) -> Result<PathBuf> {
    let fragment = TextUnit::load("source", &request.fragment)?;
    let adapter = TextUnit::load("adapter", &request.adapter)?;
    let scaffold = TextUnit::load("main", &request.scaffold)?;

    let stem = request.resolved_stem();
    let (out_path, as_dir) = resolve_output_path(&request.out, &stem);
    let dir = if as_dir { Some(request.out.as_path()) } else { out_path.parent() };
    if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| ChainError::io(dir, e))?;
    }

    let text = render_instrumented(&stem, &fragment, &adapter, &scaffold, &request.entry_point);
    fs::write(&out_path, text).map_err(|e| ChainError::io(&out_path, e))?;
    info!("amalgamated {stem} into {}", out_path.display());
    Ok(out_path)
}

pub(crate) fn file_stem_string(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

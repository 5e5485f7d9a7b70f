//! Data model shared by the three stages.
//!
//! - `TextUnit`: a loaded source blob (fragment, adapter, scaffold).
//! - `FindingRecord` and its nested records: the JSON output of extraction.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// A named source blob with its path and raw text.
///
/// Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// Role of the unit in the pipeline (e.g. "fragment", "adapter").
    pub role: &'static str,
    pub path: PathBuf,
    pub text: String,
}

impl TextUnit {
    pub fn new(role: &'static str, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { role, path: path.into(), text: text.into() }
    }

    /// Load a unit from disk, failing with `MissingInput` if the file does not exist.
    pub fn load(role: &'static str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ChainError::MissingInput { role, path: path.to_path_buf() });
        }
        let bytes = fs::read(path).map_err(|e| ChainError::io(path, e))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::new(role, path, text))
    }
}

/// `{file, line}` of the violated assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

/// A variable of interest, serialized as `{"name": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub name: String,
}

impl VariableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Coarse effect classification; both slots are nullable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub segment: Option<String>,
    pub action: Option<String>,
}

/// Paths of the engine artifacts paired with a failure report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRefs {
    pub ktest: Option<String>,
    pub kquery: Option<String>,
}

/// One normalized vulnerability finding ("chain" record).
///
/// Field order matches the emitted JSON key order. Every `Option` is a field
/// that extraction may fail to recover; it serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingRecord {
    #[serde(rename = "type")]
    pub vuln_type: String,
    pub cwe: u32,
    pub step: String,
    pub file: String,
    pub location: Option<Location>,
    pub target: Option<String>,
    pub variables: Vec<VariableRef>,
    /// Reserved; always empty.
    pub assumptions: Vec<String>,
    pub assertion: Option<String>,
    pub precondition: Option<String>,
    pub postcondition: Option<String>,
    pub effect: Effect,
    pub artifacts: ArtifactRefs,
}

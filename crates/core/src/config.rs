use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// Vulnerability type recorded when none is given.
pub const DEFAULT_VULN_TYPE: &str = "INT_OVERFLOW";

/// CWE id recorded when none is given.
pub const DEFAULT_CWE: u32 = 190;

/// Optional per-scenario settings shared by the stages.
///
/// Every key is optional; explicit command-line values take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub stem: Option<String>,
    #[serde(rename = "type")]
    pub vuln_type: Option<String>,
    pub cwe: Option<u32>,
    pub step: Option<String>,
    /// Variables the driver marks symbolic.
    pub sym_ints: Vec<String>,
    /// Bound expression in any accepted form (e.g. `-100..100`).
    pub bound: Option<String>,
    /// Variables of interest recorded in findings.
    pub vars: Vec<String>,
}

impl ScenarioConfig {
    /// Vulnerability type, falling back to [`DEFAULT_VULN_TYPE`].
    pub fn vuln_type_or_default(&self) -> String {
        self.vuln_type.clone().unwrap_or_else(|| DEFAULT_VULN_TYPE.to_string())
    }

    /// CWE id, falling back to [`DEFAULT_CWE`].
    pub fn cwe_or_default(&self) -> u32 {
        self.cwe.unwrap_or(DEFAULT_CWE)
    }
}

/// Load a scenario file; the format is chosen by extension (yaml/yml/json).
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    let body = fs::read_to_string(path).map_err(|e| ChainError::io(path, e))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let scenario_err = |reason: String| ChainError::Scenario { path: path.to_path_buf(), reason };

    match ext {
        "yaml" | "yml" => serde_yaml::from_str(&body).map_err(|e| scenario_err(e.to_string())),
        "json" => serde_json::from_str(&body).map_err(|e| scenario_err(e.to_string())),
        other => Err(scenario_err(format!("unsupported extension {other:?}"))),
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use chainbench_core::config::{load_scenario, ScenarioConfig};

pub mod commands;

/// Load the scenario file if one was given; otherwise an empty scenario.
pub fn scenario_or_default(path: Option<&Path>) -> Result<ScenarioConfig> {
    match path {
        Some(p) => load_scenario(p)
            .with_context(|| format!("Failed to load scenario file {}", p.display())),
        None => Ok(ScenarioConfig::default()),
    }
}

/// Prefer an explicitly given list; fall back to the scenario's list.
pub fn list_or(explicit: &[String], fallback: &[String]) -> Vec<String> {
    if explicit.is_empty() {
        fallback.to_vec()
    } else {
        explicit.to_vec()
    }
}

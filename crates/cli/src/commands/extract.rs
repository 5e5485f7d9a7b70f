use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chainbench_core::extract::{extract_to_file, ExtractRequest};
use clap::Args;

use crate::{list_or, scenario_or_default};

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// KLEE output directory (klee-out-N or klee-last). Absent means no artifacts.
    #[arg(long)]
    pub klee_dir: Option<PathBuf>,

    /// Scenario step / stem name.
    #[arg(long)]
    pub step: Option<String>,

    /// Symbolic variable names of interest.
    #[arg(long, num_args = 0..)]
    pub vars: Vec<String>,

    /// Scaffold (main_single.c) used for effect inference.
    #[arg(long)]
    pub main: PathBuf,

    /// Source used for location, target, and assertion.
    #[arg(long)]
    pub source: PathBuf,

    /// Vulnerability type (default INT_OVERFLOW).
    #[arg(long = "type")]
    pub vuln_type: Option<String>,

    /// CWE id (default 190).
    #[arg(long)]
    pub cwe: Option<u32>,

    /// Output JSON path.
    #[arg(long)]
    pub out: PathBuf,

    /// Optional scenario file (yaml/json) supplying `step`, `vars`, `type`, `cwe`.
    #[arg(long)]
    pub scenario: Option<PathBuf>,
}

/// Convert KLEE failure artifacts into a JSON array of chain records.
pub fn extract_command(args: &ExtractArgs) -> Result<usize> {
    let scenario = scenario_or_default(args.scenario.as_deref())?;

    let step = args
        .step
        .clone()
        .or_else(|| scenario.step.clone())
        .or_else(|| scenario.stem.clone())
        .ok_or_else(|| anyhow!("--step is required (or set `step` in the scenario file)"))?;

    let request = ExtractRequest {
        klee_dir: args.klee_dir.clone(),
        step,
        vars: list_or(&args.vars, &scenario.vars),
        scaffold: args.main.clone(),
        source: args.source.clone(),
        vuln_type: args.vuln_type.clone().unwrap_or_else(|| scenario.vuln_type_or_default()),
        cwe: args.cwe.unwrap_or_else(|| scenario.cwe_or_default()),
    };

    let count = extract_to_file(&request, &args.out)
        .with_context(|| format!("Failed to extract findings into {}", args.out.display()))?;

    println!("[ok] wrote {}  (records={count})", args.out.display());
    Ok(count)
}

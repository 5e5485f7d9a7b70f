use std::path::PathBuf;

use anyhow::{Context, Result};
use chainbench_core::amalgamate::{amalgamate, AmalgamateRequest};
use clap::Args;

use crate::scenario_or_default;

#[derive(Args, Debug, Clone)]
pub struct InstrumentArgs {
    /// Juliet source (contains `<stem>_bad`).
    #[arg(long)]
    pub source: PathBuf,

    /// Scenario adapter (adapter.c).
    #[arg(long)]
    pub adapter: PathBuf,

    /// Scaffold whose `main()` is stripped (main_single.c).
    #[arg(long)]
    pub main: PathBuf,

    /// Output file OR directory.
    #[arg(long)]
    pub out: PathBuf,

    /// Explicit stem for banners and naming. Defaults to the source file stem.
    #[arg(long)]
    pub stem: Option<String>,

    /// Optional scenario file (yaml/json) supplying `stem`.
    #[arg(long)]
    pub scenario: Option<PathBuf>,
}

/// Amalgamate source + adapter + scaffold into `instrumented_<stem>.c`.
pub fn instrument_command(args: &InstrumentArgs) -> Result<PathBuf> {
    let scenario = scenario_or_default(args.scenario.as_deref())?;
    let stem = args.stem.clone().or(scenario.stem);

    let request = AmalgamateRequest::new(&args.source, &args.adapter, &args.main, &args.out)
        .with_stem(stem);
    let written = amalgamate(&request).context("Failed to build instrumented unit")?;

    println!("[ok] wrote {}", written.display());
    Ok(written)
}

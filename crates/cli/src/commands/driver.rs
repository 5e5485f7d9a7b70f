use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chainbench_core::driver::{resolve_bound, synthesize_driver};
use clap::Args;

use crate::{list_or, scenario_or_default};

#[derive(Args, Debug, Clone)]
pub struct DriverArgs {
    /// Juliet stem, e.g. CWE190_Integer_Overflow__int_fscanf_multiply_01.
    #[arg(long)]
    pub stem: Option<String>,

    /// Path to instrumented_<stem>.c (or its directory).
    #[arg(long)]
    pub instrumented: PathBuf,

    /// Output directory for the driver.
    #[arg(long)]
    pub out: PathBuf,

    /// Names of int variables to make symbolic.
    #[arg(long = "sym-int", num_args = 0..)]
    pub sym_int: Vec<String>,

    /// Bound shared by every symbolic int: `-100<=x<=100`, `-100..100`, or `-100,100`.
    #[arg(long, allow_hyphen_values = true)]
    pub bound: Option<String>,

    /// Lower bound (alternative to --bound; requires --hi).
    #[arg(long, allow_negative_numbers = true)]
    pub lo: Option<i64>,

    /// Upper bound (alternative to --bound; requires --lo).
    #[arg(long, allow_negative_numbers = true)]
    pub hi: Option<i64>,

    /// Optional scenario file (yaml/json) supplying `stem`, `sym_ints`, `bound`.
    #[arg(long)]
    pub scenario: Option<PathBuf>,
}

/// Generate `driver_<stem>.c` for an instrumented unit.
pub fn driver_command(args: &DriverArgs) -> Result<PathBuf> {
    let scenario = scenario_or_default(args.scenario.as_deref())?;

    let stem = args
        .stem
        .clone()
        .or_else(|| scenario.stem.clone())
        .ok_or_else(|| anyhow!("--stem is required (or set `stem` in the scenario file)"))?;
    let sym_ints = list_or(&args.sym_int, &scenario.sym_ints);

    // Explicit --lo/--hi suppress a scenario bound so the two styles never mix.
    let bound_expr = args.bound.clone().or_else(|| {
        if args.lo.is_none() && args.hi.is_none() {
            scenario.bound.clone()
        } else {
            None
        }
    });
    let bound = resolve_bound(bound_expr.as_deref(), args.lo, args.hi)?;

    let written = synthesize_driver(&stem, &args.instrumented, &args.out, &sym_ints, bound)
        .with_context(|| format!("Failed to synthesize driver for {stem}"))?;

    println!("[ok] wrote {}", written.display());
    Ok(written)
}

use anyhow::Result;
use chainbench::commands::{
    driver_command, extract_command, instrument_command, DriverArgs, ExtractArgs, InstrumentArgs,
};
use clap::{Parser, Subcommand};

/// Harness preparation and finding extraction for CWE-labeled fragments.
///
/// This CLI is a thin wrapper around `chainbench-core` (exposed in code as
/// `chainbench_core`); every stage is a library call.
#[derive(Parser, Debug)]
#[command(
    name = "chainbench",
    version,
    about = "Instrument Juliet fragments, synthesize KLEE drivers, extract chain records",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Amalgamate source + adapter + main_single into one instrumented file (no main).
    ///
    /// The output is `instrumented_<stem>.c` when `--out` names a directory.
    Instrument(InstrumentArgs),

    /// Generate `driver_<stem>.c` that makes ints symbolic and calls `<stem>_bad()`.
    Driver(DriverArgs),

    /// Convert `test*.assert.err` + `.ktest`/`.kquery` into a JSON array of findings.
    Extract(ExtractArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    log::debug!("chainbench-core v{}", chainbench_core::version());

    match cli.command {
        Command::Instrument(args) => {
            instrument_command(&args)?;
        }
        Command::Driver(args) => {
            driver_command(&args)?;
        }
        Command::Extract(args) => {
            extract_command(&args)?;
        }
    }

    Ok(())
}

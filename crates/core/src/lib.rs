//! chainbench-core
//!
//! Core library for turning CWE-labeled source fragments into KLEE harnesses
//! and turning KLEE failure artifacts back into structured finding records.
//!
//! The three stages share a naming contract (`instrumented_<stem>.c`,
//! `driver_<stem>.c`, `<stem>_bad`) and are otherwise independent:
//! - [`amalgamate`]: fragment + adapter + scaffold into one unit, scaffold `main` removed.
//! - [`driver`]: a driver that marks ints symbolic, bounds them, and calls `<stem>_bad`.
//! - [`extract`]: `test*.assert.err` + `.ktest`/`.kquery` into JSON findings.
//!
//! All substantive logic lives here so it can be tested without the CLI.

pub mod amalgamate;
pub mod config;
pub mod driver;
pub mod effect;
pub mod error;
pub mod extract;
pub mod model;

pub use error::{ChainError, Result};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

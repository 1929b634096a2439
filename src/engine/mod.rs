//! Simulation engine.
//!
//! - [`history`]: append-only sample storage shared by both components
//! - [`runner`]: the driver loop, run reports and reproducibility checks

pub mod history;
pub mod runner;

pub use history::History;
pub use runner::{run, run_with, verify_reproducibility, ReproducibilitySummary, RunReport};

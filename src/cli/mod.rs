//! CLI module for knife-pendulum.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point [`run_cli`] is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{load_config, resolve_export, run_cli, run_simulation, verify};
pub use output::{
    format_step_line, print_help, print_reproducibility, print_run_header, print_run_report,
    print_version,
};

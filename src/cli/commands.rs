//! CLI command handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{ExportTarget, SimConfig};
use crate::engine::{run_with, verify_reproducibility};
use crate::error::SimResult;
use crate::visualization::{ExportConfig, ExportFormat, Exporter};

use super::output::{
    format_step_line, print_help, print_reproducibility, print_run_header, print_run_report,
    print_version,
};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            steps,
            export_path,
            format,
            verbose,
        } => run_simulation(
            config_path.as_deref(),
            steps,
            export_path,
            format,
            verbose,
        ),
        Command::Verify { config_path, runs } => verify(config_path.as_deref(), runs),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load a configuration file, or the defaults when no path is given.
///
/// # Errors
///
/// Returns error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> SimResult<SimConfig> {
    path.map_or_else(|| Ok(SimConfig::default()), SimConfig::load)
}

/// Resolve where the trajectory goes, CLI flags taking precedence over the file.
#[must_use]
pub fn resolve_export(
    config: &SimConfig,
    export_path: Option<PathBuf>,
    format: Option<ExportFormat>,
) -> Option<ExportTarget> {
    let mut target = match (export_path, config.export.clone()) {
        (Some(path), Some(existing)) => ExportTarget {
            path,
            settings: existing.settings,
        },
        (Some(path), None) => {
            let format = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
                ExportFormat::Csv
            } else {
                ExportFormat::JsonLines
            };
            ExportTarget {
                path,
                settings: ExportConfig {
                    format,
                    ..ExportConfig::default()
                },
            }
        }
        (None, existing) => existing?,
    };
    if let Some(format) = format {
        target.settings.format = format;
    }
    Some(target)
}

/// Run a simulation and print its summary.
#[must_use]
pub fn run_simulation(
    config_path: Option<&Path>,
    steps: Option<usize>,
    export_path: Option<PathBuf>,
    format: Option<ExportFormat>,
    verbose: bool,
) -> ExitCode {
    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };
    if let Some(steps) = steps {
        config.run.steps = steps;
    }

    print_run_header(&config);

    let result = run_with(&config, |knife| {
        if verbose {
            println!("{}", format_step_line(knife));
        }
    });
    let report = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    print_run_report(&report);

    if let Some(target) = resolve_export(&config, export_path, format) {
        let exporter = Exporter::with_config(target.settings.clone());
        if let Err(e) = exporter.export(&report.trajectory, &target.path) {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
        println!(
            "Trajectory written to {} ({} frames)",
            target.path.display(),
            report.trajectory.len()
        );
    }

    ExitCode::SUCCESS
}

/// Verify that a configuration reproduces bit-for-bit.
#[must_use]
pub fn verify(config_path: Option<&Path>, runs: usize) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match verify_reproducibility(&config, runs) {
        Ok(summary) => {
            print_reproducibility(&summary);
            if summary.identical {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

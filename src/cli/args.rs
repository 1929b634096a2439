//! CLI argument parsing.
//!
//! Kept free of I/O beyond diagnostics so parsing can be tested with
//! plain string slices.

use std::path::PathBuf;

use crate::visualization::ExportFormat;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a simulation.
    Run {
        /// Optional YAML configuration; defaults apply without one.
        config_path: Option<PathBuf>,
        /// Step count override.
        steps: Option<usize>,
        /// Trajectory output file.
        export_path: Option<PathBuf>,
        /// Trajectory output format.
        format: Option<ExportFormat>,
        /// Print the state after every step.
        verbose: bool,
    },
    /// Verify that repeated runs are bit-for-bit identical.
    Verify {
        /// Optional YAML configuration; defaults apply without one.
        config_path: Option<PathBuf>,
        /// Number of verification runs.
        runs: usize,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(&args[2..]),
            "verify" => Self::parse_verify_command(&args[2..]),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(rest: &[String]) -> Command {
        let mut config_path = None;
        let mut steps = None;
        let mut export_path = None;
        let mut format = None;
        let mut verbose = false;

        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "--steps" | "-n" => {
                    match rest.get(i + 1).map(|s| s.parse::<usize>()) {
                        Some(Ok(n)) => steps = Some(n),
                        Some(Err(_)) => eprintln!("Error: invalid step count '{}'", rest[i + 1]),
                        None => eprintln!("Error: '--steps' requires a value"),
                    }
                    i += 2;
                }
                "--export" | "-o" => {
                    match rest.get(i + 1) {
                        Some(path) => export_path = Some(PathBuf::from(path)),
                        None => eprintln!("Error: '--export' requires a path"),
                    }
                    i += 2;
                }
                "--format" | "-f" => {
                    match rest.get(i + 1).map(|s| s.parse::<ExportFormat>()) {
                        Some(Ok(f)) => format = Some(f),
                        Some(Err(e)) => eprintln!("Error: {e}"),
                        None => eprintln!("Error: '--format' requires a value"),
                    }
                    i += 2;
                }
                "-v" | "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                other if !other.starts_with('-') && config_path.is_none() => {
                    config_path = Some(PathBuf::from(other));
                    i += 1;
                }
                other => {
                    eprintln!("Warning: ignoring argument '{other}'");
                    i += 1;
                }
            }
        }

        Command::Run {
            config_path,
            steps,
            export_path,
            format,
            verbose,
        }
    }

    /// Parse the 'verify' command arguments.
    fn parse_verify_command(rest: &[String]) -> Command {
        let mut config_path = None;
        let mut runs = 3;

        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "--runs" => {
                    if let Some(Ok(n)) = rest.get(i + 1).map(|s| s.parse()) {
                        runs = n;
                    } else {
                        eprintln!("Error: '--runs' requires a positive number");
                    }
                    i += 2;
                }
                other if !other.starts_with('-') && config_path.is_none() => {
                    config_path = Some(PathBuf::from(other));
                    i += 1;
                }
                other => {
                    eprintln!("Warning: ignoring argument '{other}'");
                    i += 1;
                }
            }
        }

        Command::Verify { config_path, runs }
    }
}

//! CLI output formatting.

use crate::config::SimConfig;
use crate::engine::{ReproducibilitySummary, RunReport};
use crate::scenarios::{BoundaryKind, Knife};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print version information.
pub fn print_version() {
    println!("knife-pendulum {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"knife-pendulum - Knife sliding on a pendulum arm, explicit Euler integration

USAGE:
    knife-pendulum <COMMAND> [OPTIONS]

COMMANDS:
    run [config.yaml]           Run a simulation (defaults without a config)
        -n, --steps <N>         Override the step count
        -o, --export <PATH>     Write the trajectory to PATH
        -f, --format <FMT>      Export format: jsonl (default) or csv
        -v, --verbose           Print 'knife, pendulum' state after every step

    verify [config.yaml]        Check that repeated runs are bit-for-bit identical
        --runs <N>              Number of runs (default: 3)

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    knife-pendulum run
    knife-pendulum run released.yaml --steps 1200 --export out.csv --format csv
    knife-pendulum verify --runs 5

Set RUST_LOG=debug to see boundary events as they happen.
"
    );
}

/// One line of per-step state: `radial_position, radial_velocity angle, angular_velocity`.
#[must_use]
pub fn format_step_line(knife: &Knife<'_>) -> String {
    format!("{knife} {}", knife.pendulum())
}

/// Print the configuration a run is about to use.
pub fn print_run_header(config: &SimConfig) {
    println!("{RULE}");
    if !config.simulation.name.is_empty() {
        println!("Simulation: {}", config.simulation.name);
    }
    println!(
        "Pendulum: φ₀ = {:.6} rad, ω₀ = {} rad/s, dt = {}, g = {}, r = {}",
        config.pendulum.initial_angle,
        config.pendulum.initial_angular_velocity,
        config.pendulum.dt,
        config.pendulum.gravity,
        config.pendulum.arm_length
    );
    println!(
        "Knife:    l₀ = {}, threshold = {}, arm = {}",
        config.knife.start_position,
        config.knife.threshold(),
        config.knife.arm_max_length
    );
    println!("Steps:    {}", config.run.steps);
    println!("{RULE}\n");
}

/// Print the outcome of a run.
pub fn print_run_report(report: &RunReport) {
    println!("\n{RULE}");
    println!("Run Summary");
    println!("{RULE}\n");

    println!("  Steps:            {}", report.steps);
    match report.rotation_started_at {
        Some(step) => println!("  Rotation started: step {step}"),
        None => println!("  Rotation started: never"),
    }
    println!(
        "  Arm-end clamps:   {}",
        report.count_events(BoundaryKind::ArmEnd)
    );
    match report.pivot_reached_at() {
        Some(step) => {
            let speed = report
                .events
                .iter()
                .find(|e| e.kind == BoundaryKind::Pivot)
                .map_or(0.0, |e| e.radial_velocity);
            println!("  Pivot reached:    step {step} (knife speed {speed})");
        }
        None => println!("  Pivot reached:    never"),
    }

    if let Some(last) = report.trajectory.last() {
        println!("\nFinal State (t = {}):", last.time);
        println!("  Angle:            {}", last.angle);
        println!("  Angular velocity: {}", last.angular_velocity);
        println!("  Radial position:  {}", last.radial_position);
        println!("  Radial velocity:  {}", last.radial_velocity);
        println!("  Knife (x, y):     ({}, {})", last.x, last.y);
    }

    println!("\n  Digest: {}", report.digest);
    println!("\n{RULE}\n");
}

/// Print a reproducibility check.
pub fn print_reproducibility(summary: &ReproducibilitySummary) {
    let status = if summary.identical { "PASSED" } else { "FAILED" };
    let sym = if summary.identical { "✓" } else { "✗" };

    println!("{RULE}");
    println!("Reproducibility Check");
    println!("{RULE}\n");

    println!("  Runs:      {}", summary.runs);
    println!("  Identical: {}", summary.identical);
    println!("\n  Reference Hash: {}", summary.reference_hash);

    if summary.run_hashes.len() > 1 {
        println!("\n  Run Hashes:");
        for (i, hash) in summary.run_hashes.iter().enumerate() {
            let mark = if *hash == summary.reference_hash {
                "✓"
            } else {
                "✗"
            };
            println!("    {mark} Run {}: {hash}", i + 1);
        }
    }

    println!("\n{RULE}");
    println!("{sym} Result: {status}");
    println!("{RULE}\n");
}

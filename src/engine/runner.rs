//! Driver loop.
//!
//! Owns nothing beyond a single run: builds the pendulum, lets a knife
//! borrow it, calls [`Knife::advance`] the configured number of times and
//! packages the recorded histories into a [`RunReport`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::scenarios::{BoundaryEvent, BoundaryKind, Knife, Pendulum};
use crate::visualization::Trajectory;

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Completed advances.
    pub steps: usize,
    /// Step on which the pendulum started rotating.
    pub rotation_started_at: Option<usize>,
    /// Boundary clamps, in step order.
    pub events: Vec<BoundaryEvent>,
    /// Full recorded trajectory.
    pub trajectory: Trajectory,
    /// BLAKE3 digest (hex) of the serialized trajectory.
    pub digest: String,
}

impl RunReport {
    /// First step on which the knife reached the pivot.
    #[must_use]
    pub fn pivot_reached_at(&self) -> Option<usize> {
        self.events
            .iter()
            .find(|e| e.kind == BoundaryKind::Pivot)
            .map(|e| e.step)
    }

    /// Number of clamps of the given kind.
    #[must_use]
    pub fn count_events(&self, kind: BoundaryKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Result of running one configuration several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReproducibilitySummary {
    /// Number of runs performed.
    pub runs: usize,
    /// Whether all digests matched the first.
    pub identical: bool,
    /// Digest of the first run.
    pub reference_hash: String,
    /// Digest of every run.
    pub run_hashes: Vec<String>,
}

impl ReproducibilitySummary {
    /// Turn a mismatch into an error.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NonReproducible`] naming the first diverging digest.
    pub fn ensure_identical(&self) -> SimResult<()> {
        match self.run_hashes.iter().find(|h| **h != self.reference_hash) {
            Some(actual) => Err(SimError::NonReproducible {
                expected: self.reference_hash.clone(),
                actual: actual.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Run a configuration to completion.
///
/// # Errors
///
/// Returns [`SimError::InvalidConfiguration`] if the configuration does not
/// describe a valid pendulum and knife.
pub fn run(config: &SimConfig) -> SimResult<RunReport> {
    run_with(config, |_| {})
}

/// Run a configuration, calling `on_step` with the knife after every advance.
///
/// # Errors
///
/// Returns [`SimError::InvalidConfiguration`] if the configuration does not
/// describe a valid pendulum and knife.
pub fn run_with<F>(config: &SimConfig, mut on_step: F) -> SimResult<RunReport>
where
    F: FnMut(&Knife<'_>),
{
    config.check()?;

    let mut pendulum = Pendulum::from_config(&config.pendulum)?;
    let mut knife = Knife::with_threshold(
        config.knife.start_position,
        config.knife.threshold(),
        &mut pendulum,
        config.knife.arm_max_length,
    )?;
    knife.reserve(config.run.steps);

    info!(
        name = %config.simulation.name,
        steps = config.run.steps,
        start_position = config.knife.start_position,
        slide_threshold = knife.slide_threshold(),
        "starting run"
    );

    for _ in 0..config.run.steps {
        let events_before = knife.events().len();
        knife.advance();
        trace!(
            step = knife.steps(),
            knife = %knife,
            pendulum = %knife.pendulum(),
            "state"
        );
        on_step(&knife);

        let hit_pivot = knife.events()[events_before..]
            .iter()
            .any(|e| e.kind == BoundaryKind::Pivot);
        if config.run.stop_at_pivot && hit_pivot {
            debug!(step = knife.steps(), "stopping at pivot");
            break;
        }
    }

    let trajectory = Trajectory::from_knife(&knife, config.simulation.name.clone());
    let digest = digest(&trajectory)?;

    info!(
        steps = knife.steps(),
        rotation_started_at = ?knife.rotation_started_at(),
        boundary_events = knife.events().len(),
        %digest,
        "run finished"
    );

    Ok(RunReport {
        steps: knife.steps(),
        rotation_started_at: knife.rotation_started_at(),
        events: knife.events().to_vec(),
        trajectory,
        digest,
    })
}

/// Run `config` `runs` times and compare trajectory digests.
///
/// # Errors
///
/// Returns an error if `runs` is zero or any run fails.
pub fn verify_reproducibility(
    config: &SimConfig,
    runs: usize,
) -> SimResult<ReproducibilitySummary> {
    if runs == 0 {
        return Err(SimError::invalid_config("verification needs at least one run"));
    }

    let run_hashes = (0..runs)
        .map(|_| run(config).map(|report| report.digest))
        .collect::<SimResult<Vec<_>>>()?;
    let reference_hash = run_hashes[0].clone();
    let identical = run_hashes.iter().all(|h| *h == reference_hash);

    Ok(ReproducibilitySummary {
        runs,
        identical,
        reference_hash,
        run_hashes,
    })
}

/// BLAKE3 digest of the JSON serialization of a trajectory.
///
/// # Errors
///
/// Returns [`SimError::Serialization`] if the trajectory cannot be serialized.
pub fn digest(trajectory: &Trajectory) -> SimResult<String> {
    let bytes = serde_json::to_vec(trajectory)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

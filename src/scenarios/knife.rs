//! Knife sliding along the pendulum's arm.
//!
//! The knife is a point mass moving frictionlessly along the arm under
//! gravity and the centrifugal term of the rotating pendulum:
//!
//! ```text
//! θ  = φ - φ_ref
//! v' = v + (-g·cos(θ) + l·ω²) · dt
//! l' = l + v' · dt
//! ```
//!
//! Each step first latches the rotation trigger, then advances the pendulum,
//! then integrates the radial state against the pendulum's fresh angle and
//! finally clamps the knife to `[0, arm_max_length]`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::pendulum::Pendulum;
use crate::engine::history::History;
use crate::error::{SimError, SimResult};

/// Joint phase of the knife/pendulum system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Pendulum frozen, only the knife moves.
    SlidingOnly,
    /// Pendulum rotating and knife sliding.
    Rotating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlidingOnly => write!(f, "sliding-only"),
            Self::Rotating => write!(f, "rotating"),
        }
    }
}

/// Which end of the arm the knife hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// Knife reached the far end of the arm.
    ArmEnd,
    /// Knife reached the pivot.
    Pivot,
}

/// A clamp applied during one step.
///
/// Position and velocity are the unclamped values computed by the
/// integrator, before the boundary condition reset them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryEvent {
    /// 1-based step index on which the clamp happened.
    pub step: usize,
    /// Which bound was hit.
    pub kind: BoundaryKind,
    /// Radial position before clamping.
    pub radial_position: f64,
    /// Radial velocity before clamping.
    pub radial_velocity: f64,
}

/// Knife state with full radial history.
///
/// Holds a mutable borrow of the pendulum it slides on and drives it
/// through [`Knife::advance`].
#[derive(Debug)]
pub struct Knife<'p> {
    pendulum: &'p mut Pendulum,
    radial_position: History,
    radial_velocity: History,
    arm_max_length: f64,
    slide_threshold: f64,
    reference_angle: f64,
    rotation_started: bool,
    rotation_started_at: Option<usize>,
    events: Vec<BoundaryEvent>,
}

impl<'p> Knife<'p> {
    /// Create a knife at rest at `starting_radial_position`.
    ///
    /// The start position doubles as the slide threshold, and the
    /// pendulum's current angle becomes the reference angle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if the start position lies
    /// outside `[0, arm_max_length]`, any argument is not finite, or the
    /// pendulum has already been advanced.
    pub fn new(
        starting_radial_position: f64,
        pendulum: &'p mut Pendulum,
        arm_max_length: f64,
    ) -> SimResult<Self> {
        Self::with_threshold(
            starting_radial_position,
            starting_radial_position,
            pendulum,
            arm_max_length,
        )
    }

    /// Create a knife at rest at `initial_radial_position` whose rotation
    /// trigger fires once it is at or below `slide_threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if either position lies
    /// outside `[0, arm_max_length]`, any argument is not finite, or the
    /// pendulum has already been advanced.
    pub fn with_threshold(
        initial_radial_position: f64,
        slide_threshold: f64,
        pendulum: &'p mut Pendulum,
        arm_max_length: f64,
    ) -> SimResult<Self> {
        if !arm_max_length.is_finite() || arm_max_length < 0.0 {
            return Err(SimError::invalid_config(format!(
                "arm_max_length must be finite and non-negative, got {arm_max_length}"
            )));
        }
        check_on_arm(
            "initial radial position",
            initial_radial_position,
            arm_max_length,
        )?;
        check_on_arm("slide threshold", slide_threshold, arm_max_length)?;
        // Histories must stay index-aligned with the pendulum's.
        if pendulum.len() != 1 {
            return Err(SimError::invalid_config(format!(
                "pendulum already holds {} samples; a knife needs a fresh pendulum",
                pendulum.len()
            )));
        }

        let reference_angle = pendulum.latest_angle();
        Ok(Self {
            pendulum,
            radial_position: History::new(initial_radial_position),
            radial_velocity: History::new(0.0),
            arm_max_length,
            slide_threshold,
            reference_angle,
            rotation_started: false,
            rotation_started_at: None,
            events: Vec::new(),
        })
    }

    /// Reserve room for `additional` more steps in every history, the
    /// pendulum's included.
    pub fn reserve(&mut self, additional: usize) {
        self.radial_position.reserve(additional);
        self.radial_velocity.reserve(additional);
        self.pendulum.reserve(additional);
    }

    /// Advance the coupled system by one step.
    pub fn advance(&mut self) {
        let step = self.steps() + 1;
        let last_position = self.radial_position.latest();
        let last_velocity = self.radial_velocity.latest();

        if !self.rotation_started && last_position <= self.slide_threshold {
            self.rotation_started = true;
            self.rotation_started_at = Some(step);
            info!(step, radial_position = last_position, "pendulum rotation started");
        }

        self.pendulum.advance(self.rotation_started);

        let dt = self.pendulum.dt();
        let omega = self.pendulum.latest_angular_velocity();
        let relative_angle = self.pendulum.latest_angle() - self.reference_angle;

        let mut velocity = last_velocity
            + (-self.pendulum.gravity() * relative_angle.cos() + last_position * omega.powi(2))
                * dt;
        let mut position = last_position + velocity * dt;

        if position > self.arm_max_length {
            debug!(
                step,
                radial_position = position,
                radial_velocity = velocity,
                "knife clamped at arm end"
            );
            self.events.push(BoundaryEvent {
                step,
                kind: BoundaryKind::ArmEnd,
                radial_position: position,
                radial_velocity: velocity,
            });
            position = self.arm_max_length;
            velocity = 0.0;
        }

        if position < 0.0 {
            warn!(step, knife_speed = velocity, "knife reached the pivot");
            self.events.push(BoundaryEvent {
                step,
                kind: BoundaryKind::Pivot,
                radial_position: position,
                radial_velocity: velocity,
            });
            position = 0.0;
            velocity = 0.0;
        }

        self.radial_velocity.push(velocity);
        self.radial_position.push(position);
    }

    /// Cartesian trajectory `(x, y)` of the knife relative to the pivot.
    ///
    /// `x = -l·sin(φ - φ_ref)`, `y = l·cos(φ - φ_ref)` for every recorded
    /// pair of radial position `l` and pendulum angle `φ`.
    #[must_use]
    pub fn positions(&self) -> (Vec<f64>, Vec<f64>) {
        self.radial_position
            .iter()
            .zip(self.pendulum.angles().iter())
            .map(|(l, phi)| {
                let theta = phi - self.reference_angle;
                (-l * theta.sin(), l * theta.cos())
            })
            .unzip()
    }

    /// Full radial position history.
    #[must_use]
    pub const fn radial_positions(&self) -> &History {
        &self.radial_position
    }

    /// Full radial velocity history.
    #[must_use]
    pub const fn radial_velocities(&self) -> &History {
        &self.radial_velocity
    }

    /// Pendulum the knife slides on.
    #[must_use]
    pub fn pendulum(&self) -> &Pendulum {
        &*self.pendulum
    }

    /// Maximum extent of the arm.
    #[must_use]
    pub const fn arm_max_length(&self) -> f64 {
        self.arm_max_length
    }

    /// Radial position at or below which rotation starts.
    #[must_use]
    pub const fn slide_threshold(&self) -> f64 {
        self.slide_threshold
    }

    /// Pendulum angle captured at construction.
    #[must_use]
    pub const fn reference_angle(&self) -> f64 {
        self.reference_angle
    }

    /// Whether the rotation latch has fired.
    #[must_use]
    pub const fn rotation_started(&self) -> bool {
        self.rotation_started
    }

    /// Step on which the rotation latch fired.
    #[must_use]
    pub const fn rotation_started_at(&self) -> Option<usize> {
        self.rotation_started_at
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.rotation_started {
            Phase::Rotating
        } else {
            Phase::SlidingOnly
        }
    }

    /// Boundary clamps applied so far, in step order.
    #[must_use]
    pub fn events(&self) -> &[BoundaryEvent] {
        &self.events
    }

    /// Number of completed advances.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.radial_position.len() - 1
    }
}

impl fmt::Display for Knife<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            self.radial_position.latest(),
            self.radial_velocity.latest()
        )
    }
}

fn check_on_arm(name: &str, value: f64, arm_max_length: f64) -> SimResult<()> {
    if !value.is_finite() || value < 0.0 || value > arm_max_length {
        return Err(SimError::invalid_config(format!(
            "{name} {value} outside arm [0, {arm_max_length}]"
        )));
    }
    Ok(())
}

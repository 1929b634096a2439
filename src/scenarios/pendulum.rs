//! Rigid pendulum carrying the knife's arm.
//!
//! The pendulum stays frozen until it is told to rotate. Once rotating it
//! follows the simple-pendulum ODE, integrated with a first-order Euler
//! step that advances the angle with the *updated* angular velocity:
//!
//! ```text
//! ω' = ω + (g / r) · sin(φ) · dt
//! φ' = φ + ω' · dt
//! ```
//!
//! Both the angle and the angular velocity keep their full history; a frozen
//! step still appends a copy of the latest sample so the histories stay
//! index-aligned with the knife's.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::history::History;
use crate::error::{SimError, SimResult};

/// Default initial angle, `π / 3` computed by division.
pub const DEFAULT_INITIAL_ANGLE: f64 = std::f64::consts::PI / 3.0;
/// Default integration step (time units).
pub const DEFAULT_DT: f64 = 0.01;
/// Default gravitational acceleration (m/s²).
pub const DEFAULT_GRAVITY: f64 = 9.81;
/// Default length used by the restoring-force term (m).
pub const DEFAULT_ARM_LENGTH: f64 = 1.0;

/// Configuration for the pendulum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct PendulumConfig {
    /// Initial angle from vertical (radians).
    pub initial_angle: f64,
    /// Initial angular velocity (rad/s).
    pub initial_angular_velocity: f64,
    /// Fixed integration step.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub dt: f64,
    /// Gravitational acceleration (m/s²).
    #[validate(range(min = 0.0))]
    pub gravity: f64,
    /// Length in the restoring-force term (m).
    #[validate(range(exclusive_min = 0.0))]
    pub arm_length: f64,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            initial_angle: DEFAULT_INITIAL_ANGLE,
            initial_angular_velocity: 0.0,
            dt: DEFAULT_DT,
            gravity: DEFAULT_GRAVITY,
            arm_length: DEFAULT_ARM_LENGTH,
        }
    }
}

impl PendulumConfig {
    /// Pendulum released from rest at `angle`.
    #[must_use]
    pub fn at_rest(angle: f64) -> Self {
        Self {
            initial_angle: angle,
            ..Default::default()
        }
    }

    /// Theoretical period for small oscillations, `2π·sqrt(r/g)`.
    #[must_use]
    pub fn small_angle_period(&self) -> f64 {
        2.0 * std::f64::consts::PI * (self.arm_length / self.gravity).sqrt()
    }

    /// Check the constraints the validator attributes cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] on non-finite values or a
    /// non-positive step or length.
    pub fn check(&self) -> SimResult<()> {
        let fields = [
            ("initial_angle", self.initial_angle),
            ("initial_angular_velocity", self.initial_angular_velocity),
            ("dt", self.dt),
            ("gravity", self.gravity),
            ("arm_length", self.arm_length),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SimError::invalid_config(format!(
                    "pendulum.{name} must be finite, got {value}"
                )));
            }
        }
        if self.dt <= 0.0 {
            return Err(SimError::invalid_config(format!(
                "pendulum.dt must be positive, got {}",
                self.dt
            )));
        }
        if self.arm_length <= 0.0 {
            return Err(SimError::invalid_config(format!(
                "pendulum.arm_length must be positive, got {}",
                self.arm_length
            )));
        }
        Ok(())
    }
}

/// Pendulum state with full angular history.
#[derive(Debug, Clone, Serialize)]
pub struct Pendulum {
    angle: History,
    angular_velocity: History,
    dt: f64,
    gravity: f64,
    arm_length: f64,
}

impl Pendulum {
    /// Create a pendulum with the default physical constants.
    #[must_use]
    pub fn new(initial_angle: f64, initial_angular_velocity: f64) -> Self {
        Self {
            angle: History::new(initial_angle),
            angular_velocity: History::new(initial_angular_velocity),
            dt: DEFAULT_DT,
            gravity: DEFAULT_GRAVITY,
            arm_length: DEFAULT_ARM_LENGTH,
        }
    }

    /// Create a pendulum from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if the configuration is
    /// not physically meaningful.
    pub fn from_config(config: &PendulumConfig) -> SimResult<Self> {
        config.check()?;
        Ok(Self {
            angle: History::new(config.initial_angle),
            angular_velocity: History::new(config.initial_angular_velocity),
            dt: config.dt,
            gravity: config.gravity,
            arm_length: config.arm_length,
        })
    }

    /// Reserve room for `additional` more steps in both histories.
    pub fn reserve(&mut self, additional: usize) {
        self.angle.reserve(additional);
        self.angular_velocity.reserve(additional);
    }

    /// Advance one step.
    ///
    /// When `should_rotate` is false the latest state is repeated unchanged.
    pub fn advance(&mut self, should_rotate: bool) {
        let last_angle = self.angle.latest();
        let last_angular_velocity = self.angular_velocity.latest();

        let (angle, angular_velocity) = if should_rotate {
            let angular_velocity = last_angular_velocity
                + self.gravity / self.arm_length * last_angle.sin() * self.dt;
            let angle = last_angle + angular_velocity * self.dt;
            (angle, angular_velocity)
        } else {
            (last_angle, last_angular_velocity)
        };

        self.angular_velocity.push(angular_velocity);
        self.angle.push(angle);
    }

    /// Full angle history (radians).
    #[must_use]
    pub const fn angles(&self) -> &History {
        &self.angle
    }

    /// Full angular velocity history (rad/s).
    #[must_use]
    pub const fn angular_velocities(&self) -> &History {
        &self.angular_velocity
    }

    /// Most recent angle.
    #[must_use]
    pub fn latest_angle(&self) -> f64 {
        self.angle.latest()
    }

    /// Most recent angular velocity.
    #[must_use]
    pub fn latest_angular_velocity(&self) -> f64 {
        self.angular_velocity.latest()
    }

    /// Integration step.
    #[must_use]
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Gravitational acceleration.
    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Length in the restoring-force term.
    #[must_use]
    pub const fn arm_length(&self) -> f64 {
        self.arm_length
    }

    /// Number of recorded samples (advances + 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.angle.len()
    }

    /// Always false: the initial sample is recorded at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.angle.is_empty()
    }
}

impl fmt::Display for Pendulum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            self.angle.latest(),
            self.angular_velocity.latest()
        )
    }
}

//! Configuration system with YAML schema and validation.
//!
//! Mistake-proofing happens in three layers:
//! - Type-safe configuration structs (`serde`, unknown fields rejected)
//! - Schema constraints via `validator`
//! - Semantic checks that relate fields to each other (the knife must
//!   start on the arm)
//!
//! Every section has defaults, so an empty document yields the reference
//! run: pendulum at `PI / 3.0`, knife at 3.0 on a 4.0 arm, 600 steps.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{SimError, SimResult};
use crate::scenarios::pendulum::PendulumConfig;
use crate::visualization::ExportConfig;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Simulation metadata.
    #[serde(default)]
    pub simulation: SimulationMeta,

    /// Pendulum parameters.
    #[validate(nested)]
    #[serde(default)]
    pub pendulum: PendulumConfig,

    /// Knife parameters.
    #[validate(nested)]
    #[serde(default)]
    pub knife: KnifeConfig,

    /// Driver loop settings.
    #[validate(nested)]
    #[serde(default)]
    pub run: RunConfig,

    /// Optional trajectory export.
    #[serde(default)]
    pub export: Option<ExportTarget>,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            simulation: SimulationMeta::default(),
            pendulum: PendulumConfig::default(),
            knife: KnifeConfig::default(),
            run: RunConfig::default(),
            export: None,
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize configuration to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Validation`] for schema violations and
    /// [`SimError::InvalidConfiguration`] for semantic ones.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.pendulum.check()?;
        self.knife.check()
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    steps: Option<usize>,
    timestep: Option<f64>,
    initial_angle: Option<f64>,
    start_position: Option<f64>,
    slide_threshold: Option<f64>,
    arm_max_length: Option<f64>,
    stop_at_pivot: Option<bool>,
}

impl SimConfigBuilder {
    /// Set the number of steps.
    #[must_use]
    pub const fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Set the integration step.
    #[must_use]
    pub const fn timestep(mut self, dt: f64) -> Self {
        self.timestep = Some(dt);
        self
    }

    /// Set the pendulum's initial angle.
    #[must_use]
    pub const fn initial_angle(mut self, angle: f64) -> Self {
        self.initial_angle = Some(angle);
        self
    }

    /// Set the knife's starting radial position.
    #[must_use]
    pub const fn start_position(mut self, position: f64) -> Self {
        self.start_position = Some(position);
        self
    }

    /// Set an explicit rotation threshold.
    #[must_use]
    pub const fn slide_threshold(mut self, threshold: f64) -> Self {
        self.slide_threshold = Some(threshold);
        self
    }

    /// Set the arm's maximum length.
    #[must_use]
    pub const fn arm_max_length(mut self, length: f64) -> Self {
        self.arm_max_length = Some(length);
        self
    }

    /// Stop the run once the knife reaches the pivot.
    #[must_use]
    pub const fn stop_at_pivot(mut self, stop: bool) -> Self {
        self.stop_at_pivot = Some(stop);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SimConfig {
        let mut config = SimConfig::default();

        if let Some(steps) = self.steps {
            config.run.steps = steps;
        }
        if let Some(dt) = self.timestep {
            config.pendulum.dt = dt;
        }
        if let Some(angle) = self.initial_angle {
            config.pendulum.initial_angle = angle;
        }
        if let Some(position) = self.start_position {
            config.knife.start_position = position;
        }
        if self.slide_threshold.is_some() {
            config.knife.slide_threshold = self.slide_threshold;
        }
        if let Some(length) = self.arm_max_length {
            config.knife.arm_max_length = length;
        }
        if let Some(stop) = self.stop_at_pivot {
            config.run.stop_at_pivot = stop;
        }

        config
    }
}

/// Simulation metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationMeta {
    /// Simulation name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Knife configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct KnifeConfig {
    /// Starting radial position on the arm.
    #[validate(range(min = 0.0))]
    pub start_position: f64,
    /// Rotation threshold; defaults to `start_position` when absent.
    pub slide_threshold: Option<f64>,
    /// Maximum extent of the arm.
    #[validate(range(min = 0.0))]
    pub arm_max_length: f64,
}

impl Default for KnifeConfig {
    fn default() -> Self {
        Self {
            start_position: 3.0,
            slide_threshold: None,
            arm_max_length: 4.0,
        }
    }
}

impl KnifeConfig {
    /// Knife released at rest from the end of the arm, rotation starting
    /// once it has slid down to `threshold`.
    #[must_use]
    pub const fn released_from_arm_end(arm_max_length: f64, threshold: f64) -> Self {
        Self {
            start_position: arm_max_length,
            slide_threshold: Some(threshold),
            arm_max_length,
        }
    }

    /// Effective rotation threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.slide_threshold.unwrap_or(self.start_position)
    }

    /// Check that the knife starts on the arm.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] if a position lies outside
    /// `[0, arm_max_length]` or a value is not finite.
    pub fn check(&self) -> SimResult<()> {
        if !self.arm_max_length.is_finite() || self.arm_max_length < 0.0 {
            return Err(SimError::invalid_config(format!(
                "knife.arm_max_length must be finite and non-negative, got {}",
                self.arm_max_length
            )));
        }
        let positions = [
            ("knife.start_position", self.start_position),
            ("knife.slide_threshold", self.threshold()),
        ];
        for (name, value) in positions {
            if !value.is_finite() || value < 0.0 || value > self.arm_max_length {
                return Err(SimError::invalid_config(format!(
                    "{name} {value} outside arm [0, {}]",
                    self.arm_max_length
                )));
            }
        }
        Ok(())
    }
}

/// Driver loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of `advance` calls.
    #[validate(range(max = 10_000_000))]
    pub steps: usize,
    /// End the run after the step on which the knife reaches the pivot.
    pub stop_at_pivot: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 600,
            stop_at_pivot: false,
        }
    }
}

/// Where and how to write the trajectory after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTarget {
    /// Output file.
    pub path: PathBuf,
    /// Format and decimation.
    #[serde(flatten)]
    pub settings: ExportConfig,
}

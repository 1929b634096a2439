//! Trajectory capture and export.
//!
//! Turns the recorded histories of a knife and its pendulum into frames and
//! writes them out for external plotting tools:
//! - JSON Lines (one frame per line, metadata first)
//! - CSV (header row plus one row per frame)
//!
//! # Example
//!
//! ```rust
//! use knife_pendulum::scenarios::{Knife, Pendulum, DEFAULT_INITIAL_ANGLE};
//! use knife_pendulum::visualization::Trajectory;
//!
//! let mut pendulum = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
//! let mut knife = Knife::new(3.0, &mut pendulum, 4.0).unwrap();
//! knife.advance();
//! let trajectory = Trajectory::from_knife(&knife, "doc");
//! assert_eq!(trajectory.len(), 2);
//! ```

use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::scenarios::Knife;

// ============================================================================
// Trajectory Frame
// ============================================================================

/// State of the system at one recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFrame {
    /// Step index (0 = initial state).
    pub index: usize,
    /// Simulated time, `index · dt`.
    pub time: f64,
    /// Pendulum angle.
    pub angle: f64,
    /// Pendulum angular velocity.
    pub angular_velocity: f64,
    /// Knife radial position.
    pub radial_position: f64,
    /// Knife radial velocity.
    pub radial_velocity: f64,
    /// Knife Cartesian x relative to the pivot.
    pub x: f64,
    /// Knife Cartesian y relative to the pivot.
    pub y: f64,
}

/// Metadata for a trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMetadata {
    /// Simulation name.
    pub name: String,
    /// Integration step.
    pub timestep: f64,
    /// Number of completed advances.
    pub steps: usize,
    /// Pendulum angle the knife geometry is measured against.
    pub reference_angle: f64,
    /// Maximum extent of the arm.
    pub arm_max_length: f64,
    /// Rotation threshold.
    pub slide_threshold: f64,
    /// Step on which the pendulum started rotating.
    pub rotation_started_at: Option<usize>,
}

/// Collection of trajectory frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Metadata.
    pub metadata: TrajectoryMetadata,
    /// Frames in step order.
    pub frames: Vec<TrajectoryFrame>,
}

impl Trajectory {
    /// Capture every recorded step of `knife` and its pendulum.
    #[must_use]
    pub fn from_knife(knife: &Knife<'_>, name: impl Into<String>) -> Self {
        let pendulum = knife.pendulum();
        let dt = pendulum.dt();
        let (xs, ys) = knife.positions();

        let frames = pendulum
            .angles()
            .iter()
            .zip(pendulum.angular_velocities())
            .zip(knife.radial_positions().iter().zip(knife.radial_velocities()))
            .zip(xs.into_iter().zip(ys))
            .enumerate()
            .map(
                |(index, (((angle, angular_velocity), (radial_position, radial_velocity)), (x, y)))| {
                    TrajectoryFrame {
                        index,
                        time: index as f64 * dt,
                        angle,
                        angular_velocity,
                        radial_position,
                        radial_velocity,
                        x,
                        y,
                    }
                },
            )
            .collect();

        Self {
            metadata: TrajectoryMetadata {
                name: name.into(),
                timestep: dt,
                steps: knife.steps(),
                reference_angle: knife.reference_angle(),
                arm_max_length: knife.arm_max_length(),
                slide_threshold: knife.slide_threshold(),
                rotation_started_at: knife.rotation_started_at(),
            },
            frames,
        }
    }

    /// Get number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get frame at index.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&TrajectoryFrame> {
        self.frames.get(index)
    }

    /// Last recorded frame.
    #[must_use]
    pub fn last(&self) -> Option<&TrajectoryFrame> {
        self.frames.last()
    }

    /// Simulated duration covered by the frames.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.frames.last().map_or(0.0, |f| f.time)
    }
}

// ============================================================================
// Export Pipeline
// ============================================================================

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// JSON Lines (streaming JSON).
    #[default]
    JsonLines,
    /// CSV format.
    Csv,
}

impl FromStr for ExportFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "json-lines" | "jsonlines" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            other => Err(SimError::invalid_config(format!(
                "unknown export format '{other}' (expected csv or jsonl)"
            ))),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format.
    #[serde(default)]
    pub format: ExportFormat,
    /// Decimation factor (1 = every frame, 2 = every other, etc.).
    #[serde(default = "default_decimation")]
    pub decimation: usize,
}

const fn default_decimation() -> usize {
    1
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::JsonLines,
            decimation: default_decimation(),
        }
    }
}

/// Exporter for trajectories.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create new exporter with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config.
    #[must_use]
    pub const fn with_config(config: ExportConfig) -> Self {
        Self { config }
    }

    fn kept_frames<'a>(
        &self,
        trajectory: &'a Trajectory,
    ) -> impl Iterator<Item = &'a TrajectoryFrame> {
        trajectory.frames.iter().step_by(self.config.decimation.max(1))
    }

    /// Write trajectory as JSON Lines: metadata first, then one frame per line.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or writing fails.
    pub fn write_json_lines<W: IoWrite>(
        &self,
        trajectory: &Trajectory,
        writer: W,
    ) -> SimResult<()> {
        let mut writer = BufWriter::new(writer);

        let meta = serde_json::to_string(&trajectory.metadata)?;
        writeln!(writer, "{meta}")?;
        for frame in self.kept_frames(trajectory) {
            let json = serde_json::to_string(frame)?;
            writeln!(writer, "{json}")?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write trajectory as CSV.
    ///
    /// # Errors
    ///
    /// Returns error if writing fails.
    pub fn write_csv<W: IoWrite>(&self, trajectory: &Trajectory, writer: W) -> SimResult<()> {
        let mut writer = BufWriter::new(writer);

        writeln!(
            writer,
            "index,time,angle,angular_velocity,radial_position,radial_velocity,x,y"
        )?;

        for frame in self.kept_frames(trajectory) {
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                frame.index,
                frame.time,
                frame.angle,
                frame.angular_velocity,
                frame.radial_position,
                frame.radial_velocity,
                frame.x,
                frame.y
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export trajectory to JSON Lines file.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn to_json_lines(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let file = create(path)?;
        self.write_json_lines(trajectory, file)
    }

    /// Export trajectory to CSV file.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn to_csv(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let file = create(path)?;
        self.write_csv(trajectory, file)
    }

    /// Export using configured format.
    ///
    /// # Errors
    ///
    /// Returns error if export fails.
    pub fn export(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        match self.config.format {
            ExportFormat::JsonLines => self.to_json_lines(trajectory, path),
            ExportFormat::Csv => self.to_csv(trajectory, path),
        }
    }
}

fn create(path: &Path) -> SimResult<File> {
    File::create(path)
        .map_err(|e| SimError::io(format!("Failed to create {}: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::scenarios::Pendulum;
    use crate::scenarios::pendulum::DEFAULT_INITIAL_ANGLE;
    use tempfile::tempdir;

    fn sample_trajectory(steps: usize) -> Trajectory {
        let mut pendulum = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
        let mut knife = Knife::new(3.0, &mut pendulum, 4.0).unwrap();
        for _ in 0..steps {
            knife.advance();
        }
        Trajectory::from_knife(&knife, "test")
    }

    #[test]
    fn test_trajectory_from_knife() {
        let trajectory = sample_trajectory(10);
        assert_eq!(trajectory.len(), 11);
        assert!(!trajectory.is_empty());
        assert_eq!(trajectory.metadata.steps, 10);
        assert_eq!(trajectory.metadata.name, "test");
        assert_eq!(trajectory.metadata.rotation_started_at, Some(1));

        let first = trajectory.frame(0).unwrap();
        assert_eq!(first.index, 0);
        assert!((first.radial_position - 3.0).abs() < f64::EPSILON);
        assert!((first.angle - DEFAULT_INITIAL_ANGLE).abs() < f64::EPSILON);
        assert!(first.x.abs() < f64::EPSILON);
        assert!((first.y - 3.0).abs() < f64::EPSILON);

        assert_eq!(trajectory.last().unwrap().index, 10);
        assert!((trajectory.duration() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("JSONL".parse::<ExportFormat>().unwrap(), ExportFormat::JsonLines);
        assert!("parquet".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_write_csv_in_memory() {
        let trajectory = sample_trajectory(4);
        let mut buf = Vec::new();
        Exporter::new().write_csv(&trajectory, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("index,time,angle"));
        assert!(lines[1].starts_with("0,0,"));

        let fields: Vec<f64> = lines[5].split(',').map(|f| f.parse().unwrap()).collect();
        let frame = &trajectory.frames[4];
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[4].to_bits(), frame.radial_position.to_bits());
        assert_eq!(fields[7].to_bits(), frame.y.to_bits());
    }

    #[test]
    fn test_trajectory_frames_follow_histories() {
        let mut pendulum = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
        let mut knife = Knife::with_threshold(4.0, 3.0, &mut pendulum, 4.0).unwrap();
        for _ in 0..60 {
            knife.advance();
        }
        let trajectory = Trajectory::from_knife(&knife, "aligned");
        let (xs, _) = knife.positions();
        assert_eq!(trajectory.len(), 61);
        for (frame, x) in trajectory.frames.iter().zip(&xs) {
            let i = frame.index;
            let angle = knife.pendulum().angles().get(i).unwrap();
            let radial_velocity = knife.radial_velocities().get(i).unwrap();
            assert_eq!(frame.angle.to_bits(), angle.to_bits());
            assert_eq!(frame.radial_velocity.to_bits(), radial_velocity.to_bits());
            assert_eq!(frame.x.to_bits(), x.to_bits());
        }
    }

    #[test]
    fn test_write_json_lines_decimated() {
        let trajectory = sample_trajectory(10);
        let exporter = Exporter::with_config(ExportConfig {
            format: ExportFormat::JsonLines,
            decimation: 5,
        });
        let mut buf = Vec::new();
        exporter.write_json_lines(&trajectory, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // metadata + frames 0, 5, 10
        assert_eq!(lines.len(), 4);
        let meta: TrajectoryMetadata = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(meta.steps, 10);
        let frame: TrajectoryFrame = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(frame.index, 5);
        assert!((frame.radial_position - trajectory.frames[5].radial_position).abs() < 1e-12);
    }

    #[test]
    fn test_export_to_files() {
        let dir = tempdir().unwrap();
        let trajectory = sample_trajectory(3);

        let csv_path = dir.path().join("knife.csv");
        Exporter::with_config(ExportConfig {
            format: ExportFormat::Csv,
            decimation: 1,
        })
        .export(&trajectory, &csv_path)
        .unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv.lines().count(), 5);

        let jsonl_path = dir.path().join("knife.jsonl");
        Exporter::new().export(&trajectory, &jsonl_path).unwrap();
        let jsonl = std::fs::read_to_string(&jsonl_path).unwrap();
        assert_eq!(jsonl.lines().count(), 5);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let trajectory = sample_trajectory(1);
        let path = Path::new("/nonexistent/dir/out.jsonl");
        let result = Exporter::new().export(&trajectory, path);
        assert!(matches!(result, Err(SimError::Io(_))));
    }
}

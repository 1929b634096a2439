//! # knife-pendulum
//!
//! A knife (point mass) sliding frictionlessly along the arm of a rigid
//! pendulum. The pendulum stays put until the knife has slid to its
//! threshold; from then on both bodies evolve together.
//!
//! The integrator is a first-order Euler scheme, kept deliberately simple
//! with its known inaccuracies: reproducing the numerical behavior
//! matters more than physical accuracy. Every state variable keeps its
//! full history so trajectories can be replayed, exported and hashed.
//!
//! ## Example
//!
//! ```rust
//! use knife_pendulum::prelude::*;
//!
//! let mut pendulum = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
//! let mut knife = Knife::new(3.0, &mut pendulum, 4.0)?;
//! for _ in 0..600 {
//!     knife.advance();
//! }
//! assert_eq!(knife.radial_positions().len(), 601);
//! # Ok::<(), SimError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::suboptimal_flops,  // Euler update order is part of the numerical contract
    clippy::imprecise_flops,
    clippy::missing_const_for_fn,
)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod scenarios;
pub mod visualization;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{KnifeConfig, RunConfig, SimConfig, SimConfigBuilder};
    pub use crate::engine::{run, verify_reproducibility, History, RunReport};
    pub use crate::error::{SimError, SimResult};
    pub use crate::scenarios::{
        BoundaryEvent, BoundaryKind, Knife, Pendulum, PendulumConfig, Phase,
        DEFAULT_INITIAL_ANGLE,
    };
    pub use crate::visualization::{ExportFormat, Exporter, Trajectory};
}

/// Re-export for public API
pub use error::{SimError, SimResult};

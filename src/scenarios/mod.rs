//! Physical components of the knife/pendulum system.
//!
//! - [`pendulum`]: the rigid pendulum, frozen until told to rotate
//! - [`knife`]: the point mass sliding along the pendulum's arm, which
//!   drives the pendulum and decides when it starts rotating

pub mod knife;
pub mod pendulum;

pub use knife::{BoundaryEvent, BoundaryKind, Knife, Phase};
pub use pendulum::{Pendulum, PendulumConfig, DEFAULT_INITIAL_ANGLE};

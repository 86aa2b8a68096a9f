//! Deterministic simulation module
//!
//! All physics and merge logic lives here. This module must be pure and
//! deterministic:
//! - One explicit Euler step per frame
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aim;
pub mod attractor;
pub mod boundary;
pub mod collision;
pub mod levels;
pub mod merge;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use aim::{AimParams, launch_velocity};
pub use attractor::{Attractor, FieldParams};
pub use boundary::{Containment, EscapeAction, EscapeRule};
pub use collision::{CollisionParams, Contact, MassModel, ball_ball_contact, resolve_collisions};
pub use levels::{LevelTable, Tier};
pub use merge::{can_merge, merge_balls};
pub use state::{Ball, BallId, BallState, SimEvent, SimPhase, SimState};
pub use tick::{Dynamics, StepInput, advance, tick};
pub use trajectory::Trajectory;

//! Orbit Merge - merge balls into a black hole
//!
//! Core modules:
//! - `sim`: Deterministic simulation (attractor, collisions, merges, prediction)
//! - `config`: Data-driven tuning and variant presets
//! - `session`: Frame loop glue (fixed timestep, aim gesture, respawn)
//! - `spawn`: Seeded level picker for the next held ball
//! - `viewport`: Screen-size derived geometry

pub mod config;
pub mod session;
pub mod sim;
pub mod spawn;
pub mod viewport;

pub use config::{ConfigError, SimConfig, Variant};
pub use session::Session;
pub use viewport::Viewport;

use glam::Vec2;

/// Simulation constants and tuning defaults
pub mod consts {
    /// Fixed simulation timestep (one step per 60 Hz frame)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Solid core radius of the black hole
    pub const CORE_RADIUS: f32 = 26.0;
    /// Default bubble radius (balls must stay inside it)
    pub const ARENA_RADIUS: f32 = 240.0;

    /// Attractor strength (px³/frame²)
    pub const GRAVITY: f32 = 4000.0;
    /// Added to d² so the pull stays bounded near the center
    pub const SOFTENING: f32 = 900.0;
    /// Extra distance past the surface still counted as contact
    pub const CONTACT_MARGIN: f32 = 0.5;
    /// Tangential velocity kept per step while rolling on the core
    pub const SURFACE_DAMPING: f32 = 0.9;
    /// Velocity kept per step in free flight
    pub const AIR_DAMPING: f32 = 0.995;

    /// Ball-ball restitution along the contact normal
    pub const BALL_RESTITUTION: f32 = 0.2;
    /// Tangential impulse applied to touching balls resting on the core
    pub const SURFACE_NUDGE: f32 = 0.05;

    /// Consecutive frames outside the bubble before the run ends (~1 s)
    pub const ESCAPE_THRESHOLD_FRAMES: u32 = 60;

    /// Maximum drag distance that still adds launch power
    pub const MAX_STRETCH: f32 = 160.0;
    /// Launch speed at full stretch (px/frame)
    pub const MAX_LAUNCH_SPEED: f32 = 10.0;

    /// Predicted positions shown while aiming
    pub const PREDICTION_STEPS: usize = 120;

    /// Frames between a launch and the next held ball (~700 ms)
    pub const RESPAWN_DELAY_FRAMES: u32 = 42;

    /// Below this a length is treated as zero before normalizing
    pub const EPSILON: f32 = 1e-4;
}

/// Unit vector of `v`, or `fallback` when `v` is too short to normalize
#[inline]
pub fn direction_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.length();
    if len < consts::EPSILON {
        fallback
    } else {
        v / len
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_or_degenerate() {
        assert_eq!(direction_or(Vec2::ZERO, Vec2::Y), Vec2::Y);
        let d = direction_or(Vec2::new(3.0, 4.0), Vec2::Y);
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(2.0, std::f32::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 2.0).abs() < 1e-6);
    }
}

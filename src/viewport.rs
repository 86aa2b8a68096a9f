//! Screen-size derived geometry
//!
//! Converts a canvas size into the attractor center, bubble radius, spawn
//! point, and planet scale.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Bubble radius as a fraction of the shorter screen side
const BUBBLE_FRACTION: f32 = 0.42;
/// Bubble radius the level table radii were designed for
const LEVEL_REFERENCE_RADIUS: f32 = 180.0;
/// Spawn height as a fraction of screen height
const SPAWN_FRACTION: f32 = 0.12;
/// Spawn never sits closer than this to the top edge
const SPAWN_MIN_Y: f32 = 80.0;

/// Canvas dimensions in pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Attractor position: screen center
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Radius of the allowed play region
    pub fn bubble_radius(&self) -> f32 {
        self.width.min(self.height) * BUBBLE_FRACTION
    }

    /// Where new held balls appear
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, SPAWN_MIN_Y.max(self.height * SPAWN_FRACTION))
    }

    /// Multiplier for level radii so planets fill the bubble consistently
    pub fn level_scale(&self) -> f32 {
        self.bubble_radius() / LEVEL_REFERENCE_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_geometry() {
        let vp = Viewport::new(1280.0, 720.0);
        assert_eq!(vp.center(), Vec2::new(640.0, 360.0));
        assert!((vp.bubble_radius() - 302.4).abs() < 1e-3);
        assert!((vp.spawn_point().y - 86.4).abs() < 1e-3);
        assert!((vp.level_scale() - 1.68).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_floor() {
        let vp = Viewport::new(400.0, 300.0);
        assert_eq!(vp.spawn_point(), Vec2::new(200.0, 80.0));
    }
}

//! Slingshot aiming: drag delta -> launch velocity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Slingshot tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimParams {
    /// Drag distance at which power stops increasing
    pub max_stretch: f32,
    /// Launch speed at full stretch (px/frame)
    pub max_speed: f32,
}

impl Default for AimParams {
    fn default() -> Self {
        Self {
            max_stretch: MAX_STRETCH,
            max_speed: MAX_LAUNCH_SPEED,
        }
    }
}

/// Launch velocity for a drag from `anchor` (the held ball) to `pointer`
///
/// The ball flies away from the pointer, with speed proportional to the
/// clamped drag length.
pub fn launch_velocity(anchor: Vec2, pointer: Vec2, params: &AimParams) -> Vec2 {
    let pull = anchor - pointer;
    let len = pull.length();
    if len < EPSILON || params.max_stretch <= 0.0 {
        return Vec2::ZERO;
    }
    let stretch = len.min(params.max_stretch);
    let speed = stretch / params.max_stretch * params.max_speed;
    pull / len * speed
}

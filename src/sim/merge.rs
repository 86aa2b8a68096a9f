//! Merge rule: two equal-level balls become one ball of the next level

use glam::Vec2;

use super::levels::LevelTable;
use super::state::{Ball, BallId, BallState};

/// Equal level and not yet at the terminal tier
#[inline]
pub fn can_merge(a: &Ball, b: &Ball, levels: &LevelTable) -> bool {
    a.level == b.level && !levels.is_terminal(a.level)
}

/// The ball produced by merging `a` and `b`
///
/// Born at rest at the midpoint; the attractor picks it up next step.
pub fn merge_balls(a: &Ball, b: &Ball, id: BallId, levels: &LevelTable) -> Ball {
    let level = levels.clamp(a.level + 1);
    Ball {
        id,
        pos: (a.pos + b.pos) * 0.5,
        vel: Vec2::ZERO,
        level,
        radius: levels.radius(level),
        on_surface: false,
        state: BallState::Free,
    }
}

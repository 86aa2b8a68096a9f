//! Outer containment and the escape timer
//!
//! Containment keeps balls from drifting away; the escape timer turns a
//! ball that stays outside the bubble into a terminal condition.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Ball, BallId};
use crate::consts::{ARENA_RADIUS, ESCAPE_THRESHOLD_FRAMES};
use crate::direction_or;

/// Outer boundary policy, centered on the attractor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Containment {
    /// Attractor pull only
    #[default]
    None,
    /// Rigid circular wall
    CircleWall { radius: f32, restitution: f32 },
    /// Rigid axis-aligned box (screen edges)
    BoxWall { half_extents: Vec2, restitution: f32 },
    /// Soft quadratic well: inward pull grows with distance past `radius`
    Bowl { radius: f32, stiffness: f32 },
}

impl Containment {
    /// Containment acceleration for a ball at `offset` from the center
    pub fn acceleration(&self, offset: Vec2) -> Vec2 {
        match *self {
            Containment::Bowl { radius, stiffness } => {
                let d = offset.length();
                if d > radius {
                    -direction_or(offset, Vec2::ZERO) * stiffness * (d - radius)
                } else {
                    Vec2::ZERO
                }
            }
            _ => Vec2::ZERO,
        }
    }

    /// Push the ball back inside a rigid wall, reflecting outward velocity.
    /// Returns true on contact.
    pub fn enforce(&self, center: Vec2, ball: &mut Ball) -> bool {
        match *self {
            Containment::CircleWall {
                radius,
                restitution,
            } => {
                let offset = ball.pos - center;
                let limit = (radius - ball.radius).max(0.0);
                let d = offset.length();
                if d <= limit {
                    return false;
                }
                let normal = direction_or(offset, Vec2::Y);
                ball.pos = center + normal * limit;
                let outward = ball.vel.dot(normal);
                if outward > 0.0 {
                    ball.vel -= normal * outward * (1.0 + restitution);
                }
                true
            }
            Containment::BoxWall {
                half_extents,
                restitution,
            } => {
                let limit = (half_extents - Vec2::splat(ball.radius)).max(Vec2::ZERO);
                let mut rel = ball.pos - center;
                let mut hit = false;
                for axis in 0..2 {
                    if rel[axis] > limit[axis] {
                        rel[axis] = limit[axis];
                        if ball.vel[axis] > 0.0 {
                            ball.vel[axis] = -ball.vel[axis] * restitution;
                        }
                        hit = true;
                    } else if rel[axis] < -limit[axis] {
                        rel[axis] = -limit[axis];
                        if ball.vel[axis] < 0.0 {
                            ball.vel[axis] = -ball.vel[axis] * restitution;
                        }
                        hit = true;
                    }
                }
                ball.pos = center + rel;
                hit
            }
            Containment::None | Containment::Bowl { .. } => false,
        }
    }

    /// Radius of the region a ball can occupy, if the policy bounds it
    pub fn outer_radius(&self) -> Option<f32> {
        match *self {
            Containment::CircleWall { radius, .. } => Some(radius),
            Containment::BoxWall { half_extents, .. } => Some(half_extents.min_element()),
            Containment::Bowl { .. } | Containment::None => None,
        }
    }

    /// Same policy with its geometry multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        match *self {
            Containment::None => Containment::None,
            Containment::CircleWall {
                radius,
                restitution,
            } => Containment::CircleWall {
                radius: radius * factor,
                restitution,
            },
            Containment::BoxWall {
                half_extents,
                restitution,
            } => Containment::BoxWall {
                half_extents: half_extents * factor,
                restitution,
            },
            // Same pull at the same relative overshoot
            Containment::Bowl { radius, stiffness } => Containment::Bowl {
                radius: radius * factor,
                stiffness,
            },
        }
    }
}

/// What happens when a ball stays outside the allowed region too long
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeAction {
    /// End the run (single termination signal)
    #[default]
    GameOver,
    /// Remove the ball and keep playing
    Despawn,
}

/// Escape timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapeRule {
    /// Radius of the allowed region (the bubble)
    pub radius: f32,
    /// Consecutive frames outside before `action` fires
    pub threshold_frames: u32,
    pub action: EscapeAction,
}

impl Default for EscapeRule {
    fn default() -> Self {
        Self {
            radius: ARENA_RADIUS,
            threshold_frames: ESCAPE_THRESHOLD_FRAMES,
            action: EscapeAction::GameOver,
        }
    }
}

impl EscapeRule {
    /// True if the ball's center is past the bubble, inset by its own radius
    pub fn is_outside(&self, center: Vec2, ball: &Ball) -> bool {
        (ball.pos - center).length() > self.radius - ball.radius
    }
}

/// Count frames outside the bubble for every live ball
///
/// Balls back inside (or no longer live) lose their timer. Returns the ids
/// whose timer reached the threshold this frame, in live-set order.
pub fn update_escape_timers(
    timers: &mut BTreeMap<BallId, u32>,
    balls: &[Ball],
    center: Vec2,
    rule: &EscapeRule,
) -> Vec<BallId> {
    let mut expired = Vec::new();
    let mut next = BTreeMap::new();

    for ball in balls.iter().filter(|b| b.is_free()) {
        if !rule.is_outside(center, ball) {
            continue;
        }
        let frames = timers.get(&ball.id).copied().unwrap_or(0) + 1;
        if frames >= rule.threshold_frames {
            expired.push(ball.id);
        }
        next.insert(ball.id, frames);
    }

    *timers = next;
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::LevelTable;

    fn free_ball(id: BallId, pos: Vec2) -> Ball {
        let mut ball = Ball::new(id, pos, 0, &LevelTable::default());
        ball.launch(Vec2::ZERO);
        ball
    }

    #[test]
    fn test_bowl_pulls_back_past_radius() {
        let bowl = Containment::Bowl {
            radius: 100.0,
            stiffness: 0.01,
        };
        assert_eq!(bowl.acceleration(Vec2::new(50.0, 0.0)), Vec2::ZERO);
        let a = bowl.acceleration(Vec2::new(150.0, 0.0));
        assert!((a.x + 0.5).abs() < 1e-6);
        // Grows with overshoot
        let further = bowl.acceleration(Vec2::new(200.0, 0.0));
        assert!(further.length() > a.length());
    }

    #[test]
    fn test_circle_wall_reflects() {
        let wall = Containment::CircleWall {
            radius: 100.0,
            restitution: 0.5,
        };
        let mut ball = free_ball(1, Vec2::new(120.0, 0.0));
        ball.vel = Vec2::new(4.0, 1.0);
        assert!(wall.enforce(Vec2::ZERO, &mut ball));
        assert!((ball.pos.x - (100.0 - ball.radius)).abs() < 1e-4);
        assert!((ball.vel.x + 2.0).abs() < 1e-4);
        assert!((ball.vel.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_box_wall_clamps_each_axis() {
        let wall = Containment::BoxWall {
            half_extents: Vec2::new(100.0, 50.0),
            restitution: 1.0,
        };
        let mut ball = free_ball(1, Vec2::new(-150.0, 80.0));
        ball.vel = Vec2::new(-3.0, 2.0);
        assert!(wall.enforce(Vec2::ZERO, &mut ball));
        assert_eq!(ball.pos, Vec2::new(-100.0 + ball.radius, 50.0 - ball.radius));
        assert_eq!(ball.vel, Vec2::new(3.0, -2.0));
    }

    #[test]
    fn test_none_never_acts() {
        let mut ball = free_ball(1, Vec2::new(1e6, 0.0));
        assert!(!Containment::None.enforce(Vec2::ZERO, &mut ball));
        assert_eq!(Containment::None.acceleration(ball.pos), Vec2::ZERO);
        assert_eq!(Containment::None.outer_radius(), None);
    }

    #[test]
    fn test_escape_timer_counts_and_resets() {
        let rule = EscapeRule {
            radius: 100.0,
            threshold_frames: 3,
            action: EscapeAction::GameOver,
        };
        let mut timers = BTreeMap::new();
        let mut balls = vec![free_ball(1, Vec2::new(200.0, 0.0))];

        assert!(update_escape_timers(&mut timers, &balls, Vec2::ZERO, &rule).is_empty());
        assert!(update_escape_timers(&mut timers, &balls, Vec2::ZERO, &rule).is_empty());

        // Back inside resets the count
        balls[0].pos = Vec2::new(10.0, 0.0);
        assert!(update_escape_timers(&mut timers, &balls, Vec2::ZERO, &rule).is_empty());
        assert!(timers.is_empty());

        balls[0].pos = Vec2::new(200.0, 0.0);
        for _ in 0..2 {
            assert!(update_escape_timers(&mut timers, &balls, Vec2::ZERO, &rule).is_empty());
        }
        assert_eq!(
            update_escape_timers(&mut timers, &balls, Vec2::ZERO, &rule),
            vec![1]
        );
    }

    #[test]
    fn test_escape_inset_by_ball_radius() {
        let rule = EscapeRule {
            radius: 100.0,
            threshold_frames: 1,
            action: EscapeAction::Despawn,
        };
        let ball = free_ball(1, Vec2::new(90.0, 0.0));
        // 90 > 100 - 14
        assert!(rule.is_outside(Vec2::ZERO, &ball));
        let inside = free_ball(2, Vec2::new(80.0, 0.0));
        assert!(!rule.is_outside(Vec2::ZERO, &inside));
    }
}

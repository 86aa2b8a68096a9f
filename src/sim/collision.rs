//! Ball-ball collision detection and response
//!
//! Pairs are visited in a fixed `i < j` order. Overlaps are corrected by
//! moving both balls apart along the contact normal; the first same-level
//! pair found is handed back for merging instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::levels::LevelTable;
use super::merge::can_merge;
use super::state::Ball;
use crate::consts::*;
use crate::direction_or;

/// Normal used when two centers coincide
const COINCIDENT_NORMAL: Vec2 = Vec2::X;

/// How ball mass is derived for collision response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassModel {
    /// Every ball weighs the same; corrections split 50/50
    #[default]
    Uniform,
    /// Mass grows with radius²
    Area,
}

impl MassModel {
    /// Mass of a ball with `radius`
    pub fn mass(&self, radius: f32) -> f32 {
        match self {
            MassModel::Uniform => 1.0,
            MassModel::Area => radius * radius,
        }
    }

    /// Mass relative to a ball of `base_radius` (the smallest tier)
    pub fn ratio(&self, radius: f32, base_radius: f32) -> f32 {
        match self {
            MassModel::Uniform => 1.0,
            MassModel::Area if base_radius > EPSILON => (radius / base_radius).powi(2),
            MassModel::Area => 1.0,
        }
    }
}

/// Collision response tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionParams {
    pub mass_model: MassModel,
    /// Bounce along the contact normal (0 = fully inelastic)
    pub restitution: f32,
    /// Tangential impulse when either ball rests on the core
    pub surface_nudge: f32,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            mass_model: MassModel::Uniform,
            restitution: BALL_RESTITUTION,
            surface_nudge: SURFACE_NUDGE,
        }
    }
}

/// Overlap between two balls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the first ball toward the second
    pub normal: Vec2,
    /// How far the balls interpenetrate (for position correction)
    pub penetration: f32,
}

/// Check whether two balls overlap
pub fn ball_ball_contact(a: &Ball, b: &Ball) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let reach = a.radius + b.radius;
    if dist >= reach {
        return None;
    }
    Some(Contact {
        normal: direction_or(delta, COINCIDENT_NORMAL),
        penetration: reach - dist,
    })
}

/// Push two overlapping balls apart and apply the velocity response
///
/// Each ball moves by the other's share of the total mass, so the heavier
/// ball moves less. `center` is the attractor center; surface nudges act
/// along each ball's own tangent to the core.
pub fn separate(
    a: &mut Ball,
    b: &mut Ball,
    contact: &Contact,
    params: &CollisionParams,
    center: Vec2,
) {
    let mass_a = params.mass_model.mass(a.radius);
    let mass_b = params.mass_model.mass(b.radius);
    let total = mass_a + mass_b;
    let share_a = mass_b / total;
    let share_b = mass_a / total;
    let n = contact.normal;

    a.pos -= n * contact.penetration * share_a;
    b.pos += n * contact.penetration * share_b;

    // Only approaching pairs exchange momentum
    let approach = (b.vel - a.vel).dot(n);
    if approach < 0.0 {
        let impulse = -(1.0 + params.restitution) * approach / (1.0 / mass_a + 1.0 / mass_b);
        a.vel -= n * (impulse / mass_a);
        b.vel += n * (impulse / mass_b);
    }

    if (a.on_surface || b.on_surface) && params.surface_nudge > 0.0 {
        a.vel += surface_push(a.pos, center, -n) * params.surface_nudge * share_a;
        b.vel += surface_push(b.pos, center, n) * params.surface_nudge * share_b;
    }
}

/// Component of `push` along the core tangent at `pos`
fn surface_push(pos: Vec2, center: Vec2, push: Vec2) -> Vec2 {
    let tangent = direction_or(pos - center, Vec2::NEG_Y).perp();
    tangent * push.dot(tangent)
}

/// Resolve every overlapping pair in `i < j` order
///
/// Returns the first overlapping pair that is eligible to merge; pairs after
/// it are left for the next step.
pub fn resolve_collisions(
    balls: &mut [Ball],
    params: &CollisionParams,
    levels: &LevelTable,
    center: Vec2,
) -> Option<(usize, usize)> {
    let n = balls.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (left, right) = balls.split_at_mut(j);
            let (a, b) = (&mut left[i], &mut right[0]);
            let Some(contact) = ball_ball_contact(a, b) else {
                continue;
            };
            if can_merge(a, b, levels) {
                return Some((i, j));
            }
            separate(a, b, &contact, params, center);
        }
    }
    None
}

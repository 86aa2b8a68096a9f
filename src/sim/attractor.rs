//! Black hole attractor field
//!
//! Softened inverse-square pull toward a fixed center, plus a solid core
//! that balls roll on instead of passing through.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::MassModel;
use super::state::Ball;
use crate::consts::*;
use crate::direction_or;

/// Fallback outward normal when a ball sits exactly on the center
const DEGENERATE_NORMAL: Vec2 = Vec2::NEG_Y;

/// Tuning for the gravity law and surface behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    /// Strength `G` in `G / (d² + softening)`
    pub gravity: f32,
    /// Strictly positive; bounds the pull as d -> 0
    pub softening: f32,
    /// Extra distance past the surface still treated as contact
    pub contact_margin: f32,
    /// Tangential velocity kept per step while on the surface (< 1)
    pub surface_damping: f32,
    /// Velocity kept per step in free flight (< 1)
    pub air_damping: f32,
    /// How strongly mass increases rolling friction (0 = mass-independent)
    pub surface_drift: f32,
    /// Pairwise ball-ball pull `k * m_a * m_b`; 0 disables it
    pub mutual_gravity: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            softening: SOFTENING,
            contact_margin: CONTACT_MARGIN,
            surface_damping: SURFACE_DAMPING,
            air_damping: AIR_DAMPING,
            surface_drift: 0.0,
            mutual_gravity: 0.0,
        }
    }
}

impl FieldParams {
    /// Tangential velocity kept per step for a ball of the given mass ratio
    pub fn rolling_retention(&self, mass_ratio: f32) -> f32 {
        let exponent = (1.0 + self.surface_drift * (mass_ratio - 1.0)).max(0.0);
        self.surface_damping.powf(exponent)
    }
}

/// The fixed central body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub center: Vec2,
    /// Radius of the solid, non-penetrable core
    pub core_radius: f32,
}

impl Attractor {
    pub fn new(center: Vec2, core_radius: f32) -> Self {
        Self {
            center,
            core_radius,
        }
    }

    /// Distance from the center at which a ball of `radius` rests on the core
    #[inline]
    pub fn surface_distance(&self, radius: f32) -> f32 {
        self.core_radius + radius
    }

    /// Outward unit normal at `pos`
    #[inline]
    pub fn normal_at(&self, pos: Vec2) -> Vec2 {
        direction_or(pos - self.center, DEGENERATE_NORMAL)
    }

    /// Gravitational acceleration at `pos`
    pub fn acceleration(&self, params: &FieldParams, pos: Vec2) -> Vec2 {
        let to_center = self.center - pos;
        let dist_sq = to_center.length_squared();
        let magnitude = params.gravity / (dist_sq + params.softening);
        direction_or(to_center, Vec2::ZERO) * magnitude
    }

    /// True if the ball is close enough to the core to roll on it
    pub fn in_contact(&self, params: &FieldParams, ball: &Ball) -> bool {
        (ball.pos - self.center).length()
            < self.surface_distance(ball.radius) + params.contact_margin
    }

    /// Place the ball exactly on the surface circle and drop any inward
    /// radial velocity.
    pub fn clamp_to_surface(&self, ball: &mut Ball) {
        let normal = self.normal_at(ball.pos);
        ball.pos = self.center + normal * self.surface_distance(ball.radius);
        let radial = ball.vel.dot(normal);
        if radial < 0.0 {
            ball.vel -= normal * radial;
        }
        ball.on_surface = true;
    }

    /// Clamp the ball out of the core if it has been pushed inside.
    /// Returns true if a correction was applied.
    pub fn enforce_surface(&self, ball: &mut Ball) -> bool {
        if (ball.pos - self.center).length() < self.surface_distance(ball.radius) {
            self.clamp_to_surface(ball);
            true
        } else {
            false
        }
    }

    /// Advance one ball by a single explicit Euler step
    ///
    /// `extra` is added to the gravitational acceleration in free flight
    /// (containment forces). `mass_ratio` scales rolling friction when
    /// `surface_drift` is non-zero.
    pub fn advance(&self, params: &FieldParams, ball: &mut Ball, extra: Vec2, mass_ratio: f32) {
        // Balls moving away from the core leave contact and fly freely
        let normal = self.normal_at(ball.pos);
        let radial = ball.vel.dot(normal);
        if radial < EPSILON && self.in_contact(params, ball) {
            let tangential = ball.vel - normal * radial;
            ball.vel = tangential * params.rolling_retention(mass_ratio);
            ball.pos += ball.vel;
            self.clamp_to_surface(ball);
            return;
        }

        let accel = self.acceleration(params, ball.pos) + extra;
        ball.vel = ball.vel * params.air_damping + accel;
        ball.pos += ball.vel;
        ball.on_surface = false;

        // A single step must not tunnel into the core
        self.enforce_surface(ball);
    }
}

/// Per-ball acceleration from the pairwise pull between free balls
///
/// Each pair attracts with force `strength * m_a * m_b` along the line
/// between centers, independent of distance. Pairs are visited in `i < j`
/// order; coincident centers exert nothing.
pub fn mutual_accelerations(balls: &[Ball], strength: f32, mass_model: MassModel) -> Vec<Vec2> {
    let mut accel = vec![Vec2::ZERO; balls.len()];
    if strength == 0.0 {
        return accel;
    }
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            let (a, b) = (&balls[i], &balls[j]);
            if !a.is_free() || !b.is_free() {
                continue;
            }
            let dir = direction_or(b.pos - a.pos, Vec2::ZERO);
            let mass_a = mass_model.mass(a.radius);
            let mass_b = mass_model.mass(b.radius);
            let force = strength * mass_a * mass_b;
            accel[i] += dir * (force / mass_a);
            accel[j] -= dir * (force / mass_b);
        }
    }
    accel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::LevelTable;
    use proptest::prelude::*;

    fn ball_at(pos: Vec2) -> Ball {
        let mut ball = Ball::new(1, pos, 0, &LevelTable::default());
        ball.launch(Vec2::ZERO);
        ball
    }

    #[test]
    fn test_acceleration_points_inward() {
        let attractor = Attractor::new(Vec2::new(100.0, 100.0), CORE_RADIUS);
        let params = FieldParams::default();
        let a = attractor.acceleration(&params, Vec2::new(300.0, 100.0));
        assert!(a.x < 0.0);
        assert!(a.y.abs() < 1e-6);
        let expected = params.gravity / (200.0 * 200.0 + params.softening);
        assert!((a.length() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_acceleration_bounded_at_center() {
        let attractor = Attractor::new(Vec2::ZERO, CORE_RADIUS);
        let params = FieldParams::default();
        let a = attractor.acceleration(&params, Vec2::ZERO);
        assert!(a.is_finite());
        assert_eq!(a, Vec2::ZERO);

        let near = attractor.acceleration(&params, Vec2::new(1e-3, 0.0));
        assert!(near.length() <= params.gravity / params.softening + 1e-6);
    }

    #[test]
    fn test_inside_core_clamped_to_surface() {
        let attractor = Attractor::new(Vec2::ZERO, CORE_RADIUS);
        let params = FieldParams::default();
        let mut ball = ball_at(Vec2::new(10.0, 0.0));
        ball.vel = Vec2::new(-3.0, 0.0);
        attractor.advance(&params, &mut ball, Vec2::ZERO, 1.0);
        let d = ball.pos.length();
        assert!((d - (CORE_RADIUS + ball.radius)).abs() < 1e-3);
        assert!(ball.on_surface);
        // Inward velocity cancelled
        assert!(ball.vel.dot(ball.pos.normalize()) >= -1e-6);
    }

    #[test]
    fn test_ball_at_exact_center_is_guarded() {
        let attractor = Attractor::new(Vec2::new(50.0, 50.0), CORE_RADIUS);
        let params = FieldParams::default();
        let mut ball = ball_at(Vec2::new(50.0, 50.0));
        attractor.advance(&params, &mut ball, Vec2::ZERO, 1.0);
        assert!(ball.pos.is_finite());
        let d = (ball.pos - attractor.center).length();
        assert!((d - (CORE_RADIUS + ball.radius)).abs() < 1e-3);
    }

    #[test]
    fn test_surface_rolling_damped() {
        let attractor = Attractor::new(Vec2::ZERO, CORE_RADIUS);
        let params = FieldParams::default();
        let surface = CORE_RADIUS + 14.0;
        let mut ball = ball_at(Vec2::new(0.0, surface));
        ball.vel = Vec2::new(2.0, 0.0);
        attractor.advance(&params, &mut ball, Vec2::ZERO, 1.0);
        assert!(ball.on_surface);
        assert!(ball.vel.length() < 2.0);
        assert!((ball.pos.length() - surface).abs() < 1e-3);
    }

    #[test]
    fn test_free_flight_damped_euler() {
        let attractor = Attractor::new(Vec2::ZERO, CORE_RADIUS);
        let params = FieldParams {
            gravity: 0.0,
            ..Default::default()
        };
        let mut ball = ball_at(Vec2::new(200.0, 0.0));
        ball.vel = Vec2::new(0.0, 4.0);
        attractor.advance(&params, &mut ball, Vec2::ZERO, 1.0);
        assert!(!ball.on_surface);
        assert!((ball.vel.y - 4.0 * params.air_damping).abs() < 1e-6);
        assert!((ball.pos.y - 4.0 * params.air_damping).abs() < 1e-6);
    }

    #[test]
    fn test_heavier_balls_roll_less_with_drift() {
        let params = FieldParams {
            surface_drift: 1.0,
            ..Default::default()
        };
        assert!(params.rolling_retention(4.0) < params.rolling_retention(1.0));
        let flat = FieldParams::default();
        assert_eq!(flat.rolling_retention(4.0), flat.surface_damping);
    }

    #[test]
    fn test_outward_velocity_on_surface_decays() {
        let attractor = Attractor::new(Vec2::ZERO, CORE_RADIUS);
        let params = FieldParams::default();
        let surface = CORE_RADIUS + 14.0;
        let mut ball = ball_at(Vec2::new(0.0, surface));
        ball.on_surface = true;
        ball.vel = Vec2::new(0.0, 5.0);

        attractor.advance(&params, &mut ball, Vec2::ZERO, 1.0);
        // Leaves the surface instead of being pinned with its velocity
        assert!(!ball.on_surface);
        assert!(ball.pos.length() > surface);

        for _ in 0..300 {
            attractor.advance(&params, &mut ball, Vec2::ZERO, 1.0);
        }
        assert!(ball.on_surface);
        assert!((ball.pos.length() - surface).abs() < 1e-3);
        assert!(ball.vel.length() < 1e-3);
    }

    #[test]
    fn test_mutual_pull_equal_and_opposite() {
        let a = ball_at(Vec2::new(-50.0, 0.0));
        let b = ball_at(Vec2::new(50.0, 0.0));
        let accel = mutual_accelerations(&[a, b], 0.01, MassModel::Uniform);
        assert!((accel[0] - Vec2::new(0.01, 0.0)).length() < 1e-7);
        assert!((accel[0] + accel[1]).length() < 1e-7);
    }

    #[test]
    fn test_mutual_pull_heavier_ball_accelerates_less() {
        let levels = LevelTable::default();
        let mut small = Ball::new(1, Vec2::ZERO, 0, &levels);
        let mut big = Ball::new(2, Vec2::new(100.0, 0.0), 4, &levels);
        small.launch(Vec2::ZERO);
        big.launch(Vec2::ZERO);
        let accel = mutual_accelerations(&[small, big], 1e-5, MassModel::Area);
        assert!(accel[0].x > 0.0);
        assert!(accel[1].x < 0.0);
        assert!(accel[1].length() < accel[0].length());
    }

    #[test]
    fn test_mutual_pull_off_or_degenerate() {
        let a = ball_at(Vec2::new(5.0, 5.0));
        let b = ball_at(Vec2::new(5.0, 5.0));
        let held = Ball::new(3, Vec2::new(90.0, 0.0), 0, &LevelTable::default());
        let off = mutual_accelerations(&[a, b], 0.0, MassModel::Uniform);
        assert!(off.iter().all(|v| *v == Vec2::ZERO));
        let coincident = mutual_accelerations(&[a, b, held], 0.01, MassModel::Uniform);
        assert!(coincident.iter().all(|v| *v == Vec2::ZERO));
    }

    proptest! {
        #[test]
        fn prop_inside_surface_lands_on_surface(
            angle in 0.0f32..std::f32::consts::TAU,
            depth in 0.0f32..0.95,
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
        ) {
            let attractor = Attractor::new(Vec2::new(320.0, 240.0), CORE_RADIUS);
            let params = FieldParams::default();
            let mut ball = ball_at(Vec2::ZERO);
            let surface = CORE_RADIUS + ball.radius;
            ball.pos = attractor.center
                + Vec2::new(angle.cos(), angle.sin()) * surface * (1.0 - depth);
            ball.vel = Vec2::new(vx, vy);
            attractor.advance(&params, &mut ball, Vec2::ZERO, 1.0);
            let d = (ball.pos - attractor.center).length();
            prop_assert!(d >= surface - 1e-3);
            prop_assert!(ball.on_surface || d > surface);
        }
    }
}

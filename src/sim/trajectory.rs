//! Aim preview
//!
//! Runs the live per-ball physics on a private copy of the held ball and
//! yields where it would be after each step. The iterator owns everything it
//! touches, so it cannot reach live state.

use std::iter::FusedIterator;

use glam::Vec2;

use super::state::{Ball, BallState};
use super::tick::Dynamics;

/// Lazily simulated launch path
#[derive(Debug, Clone)]
pub struct Trajectory {
    ball: Ball,
    dynamics: Dynamics,
    /// Stop once the ball's edge reaches this distance from the center
    boundary: Option<f32>,
    remaining: usize,
    finished: bool,
}

impl Trajectory {
    /// Preview `ball` launched with `velocity` for at most `steps` steps
    pub fn new(
        ball: Ball,
        velocity: Vec2,
        dynamics: Dynamics,
        boundary: Option<f32>,
        steps: usize,
    ) -> Self {
        let mut ball = ball;
        ball.state = BallState::Free;
        ball.vel = velocity;
        ball.on_surface = false;
        Self {
            ball,
            dynamics,
            boundary,
            remaining: steps,
            finished: false,
        }
    }

    /// True once the path hit the core or left the play area
    pub fn is_finished(&self) -> bool {
        self.finished || self.remaining == 0
    }

    fn crossed_boundary(&self) -> bool {
        self.boundary.is_some_and(|limit| {
            (self.ball.pos - self.dynamics.attractor.center).length() + self.ball.radius >= limit
        })
    }
}

impl Iterator for Trajectory {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.is_finished() {
            return None;
        }
        self.remaining -= 1;
        self.dynamics.integrate(&mut self.ball);
        if self.ball.on_surface || self.crossed_boundary() {
            self.finished = true;
        }
        Some(self.ball.pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_finished() {
            (0, Some(0))
        } else {
            (1, Some(self.remaining))
        }
    }
}

impl FusedIterator for Trajectory {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::boundary::Containment;
    use crate::sim::state::SimState;
    use proptest::prelude::*;

    const CENTER: Vec2 = Vec2::new(400.0, 300.0);

    fn aiming_state() -> SimState {
        let config = SimConfig {
            containment: Containment::None,
            escape: None,
            ..SimConfig::default()
        };
        let mut state = SimState::new(config, CENTER);
        state.spawn_held(Vec2::new(400.0, 80.0), 0);
        state
    }

    #[test]
    fn test_prediction_does_not_touch_live_state() {
        let state = aiming_state();
        let before = state.clone();
        let points: Vec<Vec2> = state
            .predict(Vec2::new(2.0, 3.0))
            .expect("held ball")
            .collect();
        assert!(!points.is_empty());
        assert_eq!(state.held, before.held);
        assert_eq!(state.balls, before.balls);
        assert_eq!(state.time_ticks, before.time_ticks);
    }

    #[test]
    fn test_prediction_matches_live_step() {
        let mut state = aiming_state();
        let velocity = Vec2::new(1.5, 2.0);
        let predicted: Vec<Vec2> = state.predict(velocity).expect("held").take(5).collect();

        state.launch_held(velocity);
        let mut actual = Vec::new();
        for _ in 0..5 {
            crate::sim::tick(&mut state, &crate::sim::StepInput::default());
            actual.push(state.balls[0].pos);
        }
        assert_eq!(predicted, actual);
    }

    #[test]
    fn test_stops_on_core_surface() {
        let state = aiming_state();
        // Straight down the well
        let points: Vec<Vec2> = state.predict(Vec2::new(0.0, 8.0)).expect("held").collect();
        assert!(points.len() < state.config.prediction_steps);
        let last = *points.last().expect("at least one point");
        let radius = state.config.levels.radius(0);
        let d = (last - CENTER).length();
        assert!((d - (state.config.core_radius + radius)).abs() < 1e-3);
    }

    #[test]
    fn test_stops_at_boundary() {
        let mut state = aiming_state();
        state.config.escape = Some(crate::sim::boundary::EscapeRule {
            radius: 250.0,
            threshold_frames: 60,
            action: Default::default(),
        });
        // Straight up and away
        let mut path = state.predict(Vec2::new(0.0, -10.0)).expect("held");
        let count = path.by_ref().count();
        assert!(count < state.config.prediction_steps);
        assert!(path.is_finished());
        assert_eq!(path.next(), None);
    }

    #[test]
    fn test_no_held_ball_no_prediction() {
        let mut state = aiming_state();
        state.launch_held(Vec2::ZERO);
        assert!(state.predict(Vec2::ONE).is_none());
    }

    proptest! {
        #[test]
        fn prop_prediction_idempotent(vx in -10.0f32..10.0, vy in -10.0f32..10.0) {
            let state = aiming_state();
            let first: Vec<Vec2> = state.predict(Vec2::new(vx, vy)).expect("held").collect();
            let second: Vec<Vec2> = state.predict(Vec2::new(vx, vy)).expect("held").collect();
            prop_assert_eq!(first, second);
        }
    }
}

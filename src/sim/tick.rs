//! Fixed timestep simulation step
//!
//! One call advances the whole live set by exactly one frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attractor::{Attractor, FieldParams, mutual_accelerations};
use super::boundary::{Containment, EscapeAction, update_escape_timers};
use super::collision::{MassModel, resolve_collisions};
use super::state::{Ball, SimEvent, SimPhase, SimState};

/// Input commands for a single step (deterministic)
#[derive(Debug, Clone, Default)]
pub struct StepInput {
    /// Launch the held ball with this velocity
    pub launch: Option<Vec2>,
}

/// Everything needed to move one ball, by value
///
/// Shared by the live step and the trajectory predictor so both follow the
/// same physics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dynamics {
    pub attractor: Attractor,
    pub field: FieldParams,
    pub containment: Containment,
    pub mass_model: MassModel,
    /// Radius of the smallest tier, the unit for mass ratios
    pub base_radius: f32,
}

impl Dynamics {
    /// Gravity, containment, and surface handling for one free ball
    pub fn integrate(&self, ball: &mut Ball) {
        self.integrate_with(ball, Vec2::ZERO);
    }

    /// [`Dynamics::integrate`] with an additional free-flight acceleration
    pub fn integrate_with(&self, ball: &mut Ball, pull: Vec2) {
        let extra = pull
            + self
                .containment
                .acceleration(ball.pos - self.attractor.center);
        let mass_ratio = self.mass_model.ratio(ball.radius, self.base_radius);
        self.attractor.advance(&self.field, ball, extra, mass_ratio);
        self.containment.enforce(self.attractor.center, ball);
    }
}

/// Advance the simulation by one frame
///
/// Order: queued launch, ball-ball pull and per-ball physics, collisions
/// (at most one merge), escape timers. After game over this is a no-op.
pub fn tick(state: &mut SimState, input: &StepInput) -> Vec<SimEvent> {
    let mut events = Vec::new();
    if state.phase == SimPhase::GameOver {
        return events;
    }

    state.time_ticks += 1;

    if let Some(velocity) = input.launch {
        events.extend(state.launch_held(velocity));
    }

    // --- ATTRACTOR + CONTAINMENT ---
    let dynamics = state.dynamics();
    let pulls = mutual_accelerations(
        &state.balls,
        dynamics.field.mutual_gravity,
        dynamics.mass_model,
    );
    for (ball, pull) in state.balls.iter_mut().zip(pulls) {
        if ball.is_free() {
            dynamics.integrate_with(ball, pull);
        }
    }

    // --- COLLISIONS / MERGE ---
    let merge = resolve_collisions(
        &mut state.balls,
        &state.config.collision,
        &state.config.levels,
        dynamics.attractor.center,
    );
    if let Some((i, j)) = merge {
        events.push(state.apply_merge(i, j));
    }
    // Separation may have pushed a ball into the core
    for ball in &mut state.balls {
        dynamics.attractor.enforce_surface(ball);
    }

    // --- ESCAPE TIMERS ---
    if let Some(rule) = state.config.escape {
        let expired = update_escape_timers(
            &mut state.escape_timers,
            &state.balls,
            state.attractor.center,
            &rule,
        );
        match rule.action {
            EscapeAction::GameOver => {
                if let Some(id) = expired.first() {
                    log::info!(
                        "Ball {} stayed outside for {} frames: game over",
                        id,
                        rule.threshold_frames
                    );
                    state.phase = SimPhase::GameOver;
                    events.push(SimEvent::GameOver);
                }
            }
            EscapeAction::Despawn => {
                for id in expired {
                    if state.remove_ball(id).is_some() {
                        log::info!("Ball {} escaped and was removed", id);
                        events.push(SimEvent::Escaped { id });
                    }
                }
            }
        }
    }

    // Ensure deterministic ordering
    state.normalize_order();

    if !events.is_empty() {
        log::debug!("Tick {}: {:?}", state.time_ticks, events);
    }
    events
}

/// Value-in, value-out form of [`tick`]
pub fn advance(mut state: SimState, input: &StepInput) -> (SimState, Vec<SimEvent>) {
    let events = tick(&mut state, input);
    (state, events)
}

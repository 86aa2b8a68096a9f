//! Simulation state and core entity types
//!
//! Everything a step reads or writes lives in [`SimState`]; there are no
//! ambient globals.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attractor::Attractor;
use super::levels::LevelTable;
use super::merge::merge_balls;
use super::tick::Dynamics;
use super::trajectory::Trajectory;
use crate::config::SimConfig;

/// Stable entity identifier, allocated in increasing order
pub type BallId = u32;

/// Current phase of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Steps advance the live set
    Running,
    /// Escape threshold exceeded; steps are no-ops
    GameOver,
}

/// Ball state - held for aiming or free-moving
///
/// The only transition is `Held -> Free`, on launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Waiting at the spawn point, excluded from physics
    Held,
    /// Launched: subject to gravity, containment, and collisions
    Free,
}

/// A merge-able ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Merge tier, always a valid index into the level table
    pub level: usize,
    /// Derived from `level`; never set independently
    pub radius: f32,
    /// Resting against the core this step
    pub on_surface: bool,
    pub state: BallState,
}

impl Ball {
    /// New held ball at rest
    pub fn new(id: BallId, pos: Vec2, level: usize, levels: &LevelTable) -> Self {
        let level = levels.clamp(level);
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            level,
            radius: levels.radius(level),
            on_surface: false,
            state: BallState::Held,
        }
    }

    /// Release from held state with the given velocity
    pub fn launch(&mut self, velocity: Vec2) {
        if self.state == BallState::Held {
            self.vel = velocity;
            self.state = BallState::Free;
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == BallState::Free
    }

    /// Distance between centers
    pub fn distance_to(&self, other: &Ball) -> f32 {
        (other.pos - self.pos).length()
    }
}

/// Something observable happened during a step or command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A new held ball is waiting to be aimed
    Spawned { id: BallId, level: usize },
    /// The held ball joined the live set
    Launched { id: BallId },
    /// Two balls became one at the next level
    Merged {
        consumed: [BallId; 2],
        created: BallId,
        level: usize,
        pos: Vec2,
    },
    /// A ball stayed outside the allowed region and was removed
    Escaped { id: BallId },
    /// A ball stayed outside the allowed region; the run is over
    GameOver,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Tuning for this session
    pub config: SimConfig,
    /// The central black hole
    pub attractor: Attractor,
    /// Live set: free balls, sorted by id for determinism
    pub balls: Vec<Ball>,
    /// Ball waiting to be launched (at most one)
    pub held: Option<Ball>,
    /// Consecutive frames each ball has spent outside the allowed region
    pub escape_timers: BTreeMap<BallId, u32>,
    /// Current phase
    pub phase: SimPhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Next entity ID
    next_id: BallId,
}

impl SimState {
    /// Empty simulation around an attractor at `center`
    pub fn new(config: SimConfig, center: Vec2) -> Self {
        let attractor = Attractor::new(center, config.core_radius);
        Self {
            config,
            attractor,
            balls: Vec::new(),
            held: None,
            escape_timers: BTreeMap::new(),
            phase: SimPhase::Running,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> BallId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SimPhase::GameOver
    }

    /// Create the held ball. Refused while another ball is already held.
    pub fn spawn_held(&mut self, pos: Vec2, level: usize) -> Option<SimEvent> {
        if self.held.is_some() {
            log::warn!("Spawn ignored: a ball is already held");
            return None;
        }
        if level > self.config.levels.max_level() {
            log::warn!(
                "Spawn level {} out of range, clamped to {}",
                level,
                self.config.levels.max_level()
            );
        }
        let id = self.next_entity_id();
        let ball = Ball::new(id, pos, level, &self.config.levels);
        let level = ball.level;
        self.held = Some(ball);
        log::debug!("Spawned held ball {} at level {}", id, level);
        Some(SimEvent::Spawned { id, level })
    }

    /// Move the held ball into the live set with `velocity`
    pub fn launch_held(&mut self, velocity: Vec2) -> Option<SimEvent> {
        let Some(mut ball) = self.held.take() else {
            log::warn!("Launch ignored: no ball is held");
            return None;
        };
        ball.launch(velocity);
        let id = ball.id;
        self.balls.push(ball);
        log::info!("Launched ball {} with velocity {:?}", id, velocity);
        Some(SimEvent::Launched { id })
    }

    /// Per-ball physics bundle for the current geometry
    pub fn dynamics(&self) -> Dynamics {
        Dynamics {
            attractor: self.attractor,
            field: self.config.field,
            containment: self.config.containment,
            mass_model: self.config.collision.mass_model,
            base_radius: self.config.levels.radius(0),
        }
    }

    /// Preview the path the held ball would take if launched with `velocity`
    pub fn predict(&self, velocity: Vec2) -> Option<Trajectory> {
        let held = self.held?;
        Some(Trajectory::new(
            held,
            velocity,
            self.dynamics(),
            self.boundary_radius(),
            self.config.prediction_steps,
        ))
    }

    /// Radius past which a ball counts as leaving the play area
    pub fn boundary_radius(&self) -> Option<f32> {
        self.config
            .escape
            .map(|rule| rule.radius)
            .or_else(|| self.config.containment.outer_radius())
    }

    /// Replace balls `i` and `j` (i < j) with their merged successor
    pub fn apply_merge(&mut self, i: usize, j: usize) -> SimEvent {
        debug_assert!(i < j && j < self.balls.len());
        let id = self.next_entity_id();
        let b = self.balls.remove(j);
        let a = self.balls.remove(i);
        let merged = merge_balls(&a, &b, id, &self.config.levels);
        self.escape_timers.remove(&a.id);
        self.escape_timers.remove(&b.id);
        self.balls.push(merged);
        log::info!(
            "Merged balls {} + {} into {} (level {})",
            a.id,
            b.id,
            id,
            merged.level
        );
        SimEvent::Merged {
            consumed: [a.id, b.id],
            created: id,
            level: merged.level,
            pos: merged.pos,
        }
    }

    /// Remove a live ball by id
    pub fn remove_ball(&mut self, id: BallId) -> Option<Ball> {
        let idx = self.balls.iter().position(|b| b.id == id)?;
        self.escape_timers.remove(&id);
        Some(self.balls.remove(idx))
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Move the attractor, carrying every ball along so relative geometry holds
    pub fn set_center(&mut self, center: Vec2) {
        let delta = center - self.attractor.center;
        self.attractor.center = center;
        for ball in self.balls.iter_mut().chain(self.held.iter_mut()) {
            ball.pos += delta;
        }
    }

    /// Rescale containment and escape geometry to a new arena radius
    pub fn set_arena_radius(&mut self, arena_radius: f32) {
        if self.config.arena_radius <= 0.0 || arena_radius <= 0.0 {
            return;
        }
        let factor = arena_radius / self.config.arena_radius;
        self.config.containment = self.config.containment.scaled(factor);
        if let Some(rule) = self.config.escape.as_mut() {
            rule.radius *= factor;
        }
        self.config.arena_radius = arena_radius;
    }

    /// Ensure balls are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
    }
}

//! Frame loop glue around the simulation
//!
//! Owns the fixed-timestep accumulator, the aim gesture, and the respawn
//! cooldown. Input handlers only record intent here; the launch is applied
//! at the start of the next simulation step.

use glam::Vec2;

use crate::config::SimConfig;
use crate::consts::*;
use crate::sim::{SimEvent, SimState, StepInput, Trajectory, launch_velocity, tick};
use crate::spawn::SpawnPicker;
use crate::viewport::Viewport;

/// One play session
#[derive(Debug, Clone)]
pub struct Session {
    state: SimState,
    viewport: Viewport,
    spawner: SpawnPicker,
    accumulator: f32,
    input: StepInput,
    /// Pointer position while an aim gesture is active
    aim_pointer: Option<Vec2>,
    /// Frames until the next held ball appears
    respawn_countdown: Option<u32>,
    /// Events since the last drain
    events: Vec<SimEvent>,
}

impl Session {
    /// Start a session with a held ball waiting at the spawn point
    pub fn new(config: SimConfig, viewport: Viewport, seed: u64) -> Self {
        let spawner = SpawnPicker::new(seed, config.max_spawn_level);
        let state = SimState::new(config, viewport.center());
        let mut session = Self {
            state,
            viewport,
            spawner,
            accumulator: 0.0,
            input: StepInput::default(),
            aim_pointer: None,
            respawn_countdown: None,
            events: Vec::new(),
        };
        session.spawn_next();
        log::info!("Session started with seed {}", seed);
        session
    }

    /// Read-only view for rendering
    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn is_aiming(&self) -> bool {
        self.aim_pointer.is_some()
    }

    fn spawn_next(&mut self) {
        let level = self.spawner.next_level();
        let event = self.state.spawn_held(self.viewport.spawn_point(), level);
        self.events.extend(event);
    }

    /// Begin aiming. Ignored unless a ball is held and no launch is pending.
    pub fn pointer_down(&mut self, pos: Vec2) -> bool {
        if self.is_game_over() || self.state.held.is_none() || self.input.launch.is_some() {
            return false;
        }
        self.aim_pointer = Some(pos);
        true
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if let Some(pointer) = self.aim_pointer.as_mut() {
            *pointer = pos;
        }
    }

    /// Launch velocity for the current drag
    pub fn aim_velocity(&self) -> Option<Vec2> {
        let pointer = self.aim_pointer?;
        let held = self.state.held?;
        Some(launch_velocity(held.pos, pointer, &self.state.config.aim))
    }

    /// Preview of the current aim; re-create it each frame the aim changes
    pub fn predicted_path(&self) -> Option<Trajectory> {
        self.state.predict(self.aim_velocity()?)
    }

    /// Release the drag and queue the launch for the next step
    pub fn pointer_up(&mut self) -> Option<Vec2> {
        let velocity = self.aim_velocity();
        self.aim_pointer = None;
        if let Some(velocity) = velocity {
            self.input.launch = Some(velocity);
        }
        velocity
    }

    /// Abandon the drag without launching
    pub fn cancel_aim(&mut self) {
        self.aim_pointer = None;
    }

    /// Advance by wall-clock `dt` seconds. Returns the number of steps run.
    pub fn update(&mut self, dt: f32) -> u32 {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
            self.step_frame();
            self.accumulator -= FRAME_DT;
            substeps += 1;
        }
        substeps
    }

    /// Run exactly one simulation step
    pub fn step_frame(&mut self) {
        if self.is_game_over() {
            return;
        }

        // One-shot input is consumed by this step
        let input = std::mem::take(&mut self.input);
        let events = tick(&mut self.state, &input);

        for event in &events {
            match event {
                SimEvent::Launched { .. } => {
                    self.respawn_countdown = Some(self.state.config.respawn_delay_frames);
                }
                SimEvent::GameOver => {
                    self.aim_pointer = None;
                    self.respawn_countdown = None;
                    log::info!("Game over after {} frames", self.state.time_ticks);
                }
                _ => {}
            }
        }
        self.events.extend(events);

        if let Some(frames) = self.respawn_countdown {
            if frames <= 1 {
                self.respawn_countdown = None;
                self.spawn_next();
            } else {
                self.respawn_countdown = Some(frames - 1);
            }
        }
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a new canvas size between steps
    pub fn resize(&mut self, viewport: Viewport) {
        self.state.set_center(viewport.center());
        self.state.set_arena_radius(viewport.bubble_radius());
        if let Some(held) = self.state.held.as_mut() {
            held.pos = viewport.spawn_point();
        }
        self.viewport = viewport;
        log::info!(
            "Resized to {}x{} (bubble {:.1})",
            viewport.width,
            viewport.height,
            viewport.bubble_radius()
        );
    }
}

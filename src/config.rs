//! Simulation tuning and variant presets
//!
//! Every tunable physics constant lives here. Configs load from
//! JSON; missing fields fall back to the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{
    AimParams, CollisionParams, Containment, EscapeAction, EscapeRule, FieldParams, LevelTable,
    MassModel,
};
use crate::viewport::Viewport;

/// Failure to load or validate a config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: `{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Named tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Rigid outer wall, game over when a ball lingers outside the bubble
    #[default]
    Bubble,
    /// Soft quadratic well, heavy balls, escapees are removed
    Bowl,
    /// Attractor pull only
    Open,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Bubble => "Bubble",
            Variant::Bowl => "Bowl",
            Variant::Open => "Open",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bubble" => Some(Variant::Bubble),
            "bowl" => Some(Variant::Bowl),
            "open" | "none" => Some(Variant::Open),
            _ => None,
        }
    }
}

/// All tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Radius of the solid core
    pub core_radius: f32,
    /// Reference radius the containment/escape geometry was built for
    pub arena_radius: f32,
    pub field: FieldParams,
    pub collision: CollisionParams,
    pub containment: Containment,
    /// Escape timer; `None` disables termination entirely
    pub escape: Option<EscapeRule>,
    pub levels: LevelTable,
    pub aim: AimParams,
    /// Maximum predicted points while aiming
    pub prediction_steps: usize,
    /// Held balls are drawn from `0..=max_spawn_level`
    pub max_spawn_level: usize,
    /// Frames between a launch and the next held ball
    pub respawn_delay_frames: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::preset(Variant::default(), ARENA_RADIUS)
    }
}

impl SimConfig {
    /// Preset tuning for a bubble of `arena_radius`
    pub fn preset(variant: Variant, arena_radius: f32) -> Self {
        let escape = |radius: f32, action: EscapeAction| {
            Some(EscapeRule {
                radius,
                threshold_frames: ESCAPE_THRESHOLD_FRAMES,
                action,
            })
        };

        let mut config = Self {
            core_radius: CORE_RADIUS,
            arena_radius,
            field: FieldParams::default(),
            collision: CollisionParams::default(),
            containment: Containment::None,
            escape: escape(arena_radius, EscapeAction::GameOver),
            levels: LevelTable::default(),
            aim: AimParams::default(),
            prediction_steps: PREDICTION_STEPS,
            max_spawn_level: 0,
            respawn_delay_frames: RESPAWN_DELAY_FRAMES,
        };

        match variant {
            Variant::Bubble => {
                config.containment = Containment::CircleWall {
                    radius: arena_radius * 1.25,
                    restitution: 0.6,
                };
            }
            Variant::Bowl => {
                config.containment = Containment::Bowl {
                    radius: arena_radius * 0.85,
                    stiffness: 0.004,
                };
                config.escape = escape(arena_radius * 1.5, EscapeAction::Despawn);
                config.collision.mass_model = MassModel::Area;
                config.field.surface_drift = 0.5;
                config.max_spawn_level = 2;
            }
            Variant::Open => {}
        }

        config
    }

    /// Preset sized to a screen: bubble from the viewport, planets scaled
    /// to match.
    pub fn for_viewport(variant: Variant, viewport: &Viewport) -> Self {
        let mut config = Self::preset(variant, viewport.bubble_radius());
        config.levels = config.levels.scaled(viewport.level_scale());
        config
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every parameter against the constraints the physics relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason })
            }
        }

        check(self.core_radius > 0.0, "core_radius", "must be positive")?;
        check(self.arena_radius > 0.0, "arena_radius", "must be positive")?;

        let field = &self.field;
        check(field.gravity >= 0.0, "field.gravity", "must not be negative")?;
        check(field.softening > 0.0, "field.softening", "must be positive")?;
        check(
            field.contact_margin >= 0.0,
            "field.contact_margin",
            "must not be negative",
        )?;
        check(
            (0.0..1.0).contains(&field.surface_damping),
            "field.surface_damping",
            "must be in [0, 1)",
        )?;
        check(
            field.air_damping > 0.0 && field.air_damping < 1.0,
            "field.air_damping",
            "must be in (0, 1)",
        )?;
        check(
            field.surface_drift >= 0.0,
            "field.surface_drift",
            "must not be negative",
        )?;
        check(
            field.mutual_gravity >= 0.0,
            "field.mutual_gravity",
            "must not be negative",
        )?;

        check(
            (0.0..=1.0).contains(&self.collision.restitution),
            "collision.restitution",
            "must be in [0, 1]",
        )?;
        check(
            self.collision.surface_nudge >= 0.0,
            "collision.surface_nudge",
            "must not be negative",
        )?;

        match self.containment {
            Containment::None => {}
            Containment::CircleWall {
                radius,
                restitution,
            } => {
                check(radius > 0.0, "containment.radius", "must be positive")?;
                check(
                    (0.0..=1.0).contains(&restitution),
                    "containment.restitution",
                    "must be in [0, 1]",
                )?;
            }
            Containment::BoxWall {
                half_extents,
                restitution,
            } => {
                check(
                    half_extents.min_element() > 0.0,
                    "containment.half_extents",
                    "must be positive",
                )?;
                check(
                    (0.0..=1.0).contains(&restitution),
                    "containment.restitution",
                    "must be in [0, 1]",
                )?;
            }
            Containment::Bowl { radius, stiffness } => {
                check(radius > 0.0, "containment.radius", "must be positive")?;
                check(stiffness >= 0.0, "containment.stiffness", "must not be negative")?;
            }
        }

        if let Some(rule) = &self.escape {
            check(rule.radius > 0.0, "escape.radius", "must be positive")?;
            check(
                rule.threshold_frames > 0,
                "escape.threshold_frames",
                "must be at least 1",
            )?;
        }

        check(!self.levels.is_empty(), "levels.tiers", "must not be empty")?;
        check(self.levels.scale > 0.0, "levels.scale", "must be positive")?;
        check(
            self.levels.tiers.iter().all(|t| t.radius > 0.0),
            "levels.tiers",
            "radii must be positive",
        )?;
        check(
            self.levels.is_monotonic(),
            "levels.tiers",
            "radii must increase with level",
        )?;

        check(self.aim.max_stretch > 0.0, "aim.max_stretch", "must be positive")?;
        check(self.aim.max_speed >= 0.0, "aim.max_speed", "must not be negative")?;
        check(
            self.prediction_steps > 0,
            "prediction_steps",
            "must be at least 1",
        )?;
        check(
            self.max_spawn_level <= self.levels.max_level(),
            "max_spawn_level",
            "must be a valid level",
        )?;

        Ok(())
    }
}

//! Merge tiers: level -> radius/color lookup
//!
//! The last tier is terminal; two balls at that level never merge.

use serde::{Deserialize, Serialize};

/// Size and color of one merge tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Unscaled radius (table scale is applied on lookup)
    pub radius: f32,
    /// 0xRRGGBB fill color for the render collaborator
    pub color: u32,
}

/// Eight planet tiers, ending in the sun
const PLANETS: [Tier; 8] = [
    Tier { radius: 14.0, color: 0x94a3b8 },
    Tier { radius: 18.0, color: 0x38bdf8 },
    Tier { radius: 22.0, color: 0x22c55e },
    Tier { radius: 28.0, color: 0xf59e0b },
    Tier { radius: 36.0, color: 0xfbbf24 },
    Tier { radius: 44.0, color: 0xf59e0b },
    Tier { radius: 52.0, color: 0xef4444 },
    Tier { radius: 60.0, color: 0xfde047 },
];

/// Ordered list of merge tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    pub tiers: Vec<Tier>,
    /// Uniform multiplier applied to every radius
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

fn unit_scale() -> f32 {
    1.0
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            tiers: PLANETS.to_vec(),
            scale: 1.0,
        }
    }
}

impl LevelTable {
    /// Table with the given tiers at unit scale
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers, scale: 1.0 }
    }

    /// Copy of this table with every radius multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            tiers: self.tiers.clone(),
            scale: self.scale * factor,
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Highest (terminal) level
    pub fn max_level(&self) -> usize {
        self.tiers.len().saturating_sub(1)
    }

    /// True if balls at `level` can no longer merge
    pub fn is_terminal(&self, level: usize) -> bool {
        level >= self.max_level()
    }

    /// Clamp an arbitrary level into the table
    pub fn clamp(&self, level: usize) -> usize {
        level.min(self.max_level())
    }

    /// Scaled radius for `level` (clamped to the table)
    pub fn radius(&self, level: usize) -> f32 {
        self.tiers
            .get(self.clamp(level))
            .map(|t| t.radius * self.scale)
            .unwrap_or(0.0)
    }

    /// Fill color for `level` (clamped to the table)
    pub fn color(&self, level: usize) -> u32 {
        self.tiers.get(self.clamp(level)).map(|t| t.color).unwrap_or(0)
    }

    /// Radii strictly increase with level
    pub fn is_monotonic(&self) -> bool {
        self.tiers.windows(2).all(|w| w[0].radius < w[1].radius)
    }
}

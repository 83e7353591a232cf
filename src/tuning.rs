//! Data-driven physics constants
//!
//! Every per-kind movement constant lives here so a host can override
//! balance from a JSON file without rebuilding. All values are per-tick
//! impulses except `max_speed`, which is in units per second.

use serde::Deserialize;

/// Movement constants for one kind of dynamic entity
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MoverTuning {
    /// Vertical impulse per tick (negative pulls down)
    pub gravity: f32,
    /// Horizontal acceleration step per tick at full input
    pub accel: f32,
    /// Top horizontal speed, units per second
    pub max_speed: f32,
    /// Deceleration step per tick when no input is held
    pub friction: f32,
    /// Upward impulse applied on jump
    pub jump_force: f32,
    /// Total jumps before the entity must land again
    pub max_jumps: u32,
}

impl Default for MoverTuning {
    fn default() -> Self {
        Self {
            gravity: -4.0,
            accel: 10.0,
            max_speed: 20.0,
            friction: 2.0,
            jump_force: 50.0,
            max_jumps: 2,
        }
    }
}

/// Constants for the flying bat
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BatTuning {
    /// Half-extent of the player-detection probe, world units
    pub sight: f32,
    /// Flight speed toward the target, units per second
    pub speed: f32,
    /// Velocity step per tick while steering
    pub accel: f32,
}

impl Default for BatTuning {
    fn default() -> Self {
        Self {
            sight: 10.0,
            speed: 8.0,
            accel: 0.5,
        }
    }
}

/// Full balance table for a level
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: MoverTuning,
    pub walker: MoverTuning,
    pub bat: BatTuning,
}

impl Tuning {
    /// Parse a tuning override file. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

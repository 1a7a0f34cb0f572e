//! Movement tuning

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Movement configuration, loaded once and never mutated by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Top horizontal speed in units per second at full input
    pub move_speed: f32,
    /// Rate used while steering towards a non-zero target speed
    pub acceleration: f32,
    /// Rate used while braking towards zero
    pub deceleration: f32,
    /// Exponent applied to the scaled speed error (< 1 softens large errors)
    pub velocity_power: f32,
    /// Largest horizontal impulse removed per physics step with no input
    pub friction: f32,
    /// Upward impulse of a jump
    pub jump_force: f32,
    /// Fraction of upward speed kept when jump is released early
    pub jump_cut_multiplier: f32,
    /// Grace period after leaving the ground during which a ground jump is allowed
    pub coyote_time: f32,
    /// How long a jump press is remembered before it can execute
    pub jump_buffer_time: f32,
    /// Jumps allowed between two landings
    pub max_jumps: u32,
    /// Where the character is placed when the controller starts
    pub spawn_point: Vec3,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 14.5,
            acceleration: 13.0,
            deceleration: 16.0,
            velocity_power: 0.9,
            friction: 0.2,
            jump_force: 16.0,
            jump_cut_multiplier: 0.6,
            coyote_time: 0.15,
            jump_buffer_time: 0.1,
            max_jumps: 2,
            spawn_point: Vec3::ZERO,
        }
    }
}

/// Invalid movement tuning
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("velocity_power must be in (0, 2], got {0}")]
    VelocityPower(f32),

    #[error("jump_cut_multiplier must be in [0, 1], got {0}")]
    JumpCutMultiplier(f32),

    #[error("max_jumps must be at least 1")]
    NoJumps,
}

impl MovementConfig {
    /// Check every value is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("move_speed", self.move_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("friction", self.friction),
            ("jump_force", self.jump_force),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
        ];
        for (field, value) in positive {
            // Also rejects NaN
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if !(self.velocity_power > 0.0 && self.velocity_power <= 2.0) {
            return Err(ConfigError::VelocityPower(self.velocity_power));
        }
        if !(0.0..=1.0).contains(&self.jump_cut_multiplier) {
            return Err(ConfigError::JumpCutMultiplier(self.jump_cut_multiplier));
        }
        if self.max_jumps == 0 {
            return Err(ConfigError::NoJumps);
        }
        Ok(())
    }
}

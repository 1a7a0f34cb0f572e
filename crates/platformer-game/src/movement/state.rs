//! Per-character movement state

use serde::{Deserialize, Serialize};

/// Where the character is in the jump cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpPhase {
    /// Standing on walkable ground
    Grounded,
    /// Contact lost but the coyote window is still open
    Coyote,
    /// Going up after a jump
    Rising,
    /// Airborne and not in a jump rise
    Falling,
}

/// Mutable state owned by one controller for the character's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Horizontal intent in [-1, 1]
    pub horizontal_input: f32,
    /// Which way the character faces
    pub facing_right: bool,
    /// Counts down from coyote time; > 0 means a ground jump is allowed
    pub grounded_timer: f32,
    /// Counts down from jump buffer time; > 0 means a jump was requested recently
    pub jump_buffer_timer: f32,
    /// From jump execution until the body starts falling
    pub is_jumping: bool,
    /// Jumps executed since the last landing
    pub jump_count: u32,
    /// Ground sensor result from the last input tick
    pub on_ground: bool,
    /// Whether the last input tick counted as standing (grounded and not rising)
    pub supported: bool,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            horizontal_input: 0.0,
            facing_right: true,
            grounded_timer: 0.0,
            jump_buffer_timer: 0.0,
            is_jumping: false,
            jump_count: 0,
            on_ground: false,
            supported: false,
        }
    }
}

impl MovementState {
    /// Whether the coyote window is open
    pub fn in_coyote_window(&self) -> bool {
        self.grounded_timer > 0.0
    }

    /// Whether a jump press is still buffered
    pub fn jump_buffered(&self) -> bool {
        self.jump_buffer_timer > 0.0
    }

    /// Count both timers down. They may go negative, only the sign matters.
    pub fn decay_timers(&mut self, dt: f32) {
        self.grounded_timer -= dt;
        self.jump_buffer_timer -= dt;
    }

    /// Classify the current state given the body's vertical velocity
    pub fn phase(&self, vel_y: f32) -> JumpPhase {
        if self.is_jumping && vel_y >= 0.0 {
            JumpPhase::Rising
        } else if self.on_ground && !self.is_jumping {
            JumpPhase::Grounded
        } else if self.in_coyote_window() {
            JumpPhase::Coyote
        } else {
            JumpPhase::Falling
        }
    }
}

/// Things the controller did that a presentation layer may react to
#[derive(Debug, Clone, PartialEq)]
pub enum MovementEvent {
    /// A jump executed
    Jumped {
        /// Jumps since the last landing, this one included
        count: u32,
        /// Upward impulse applied
        impulse: f32,
    },
    /// Jump released early, upward speed trimmed
    JumpCut {
        /// Downward impulse applied (negative)
        impulse: f32,
    },
    /// Ground contact regained
    Landed,
    /// Facing flipped
    Turned {
        facing_right: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_go_negative() {
        let mut state = MovementState {
            grounded_timer: 0.05,
            jump_buffer_timer: 0.1,
            ..Default::default()
        };
        state.decay_timers(0.08);
        assert!(!state.in_coyote_window());
        assert!(state.grounded_timer < 0.0);
        assert!(state.jump_buffered());
    }

    #[test]
    fn test_phase() {
        let mut state = MovementState::default();
        assert_eq!(state.phase(0.0), JumpPhase::Falling);

        state.on_ground = true;
        assert_eq!(state.phase(0.0), JumpPhase::Grounded);

        state.on_ground = false;
        state.grounded_timer = 0.1;
        assert_eq!(state.phase(-1.0), JumpPhase::Coyote);

        state.is_jumping = true;
        assert_eq!(state.phase(5.0), JumpPhase::Rising);
        // Still overlapping the floor right after take-off
        state.on_ground = true;
        assert_eq!(state.phase(5.0), JumpPhase::Rising);

        state.on_ground = false;
        state.grounded_timer = 0.0;
        assert_eq!(state.phase(-2.0), JumpPhase::Falling);
    }
}

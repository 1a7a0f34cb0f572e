//! Horizontal force model
//!
//! Run force steers the body towards `input * move_speed` with a power curve.
//! Friction is an impulse that brakes a body with no input without ever
//! reversing it.

use super::MovementConfig;

/// Inputs (and target speeds) with a magnitude below this count as neutral
pub const INPUT_DEAD_ZONE: f32 = 0.01;

/// Continuous horizontal force steering `current_vel_x` towards the input target.
///
/// `sign(diff) * (|diff| * rate) ^ velocity_power`, where the rate is
/// `acceleration` while a target speed is requested and `deceleration` when
/// braking to zero.
pub fn compute_run_force(input: f32, current_vel_x: f32, config: &MovementConfig) -> f32 {
    let target_speed = input * config.move_speed;
    let speed_diff = target_speed - current_vel_x;

    // 0^p is fine for p > 0 but keep zero exact, and no signum(0) surprises
    if speed_diff == 0.0 {
        return 0.0;
    }

    let rate = if target_speed.abs() > INPUT_DEAD_ZONE {
        config.acceleration
    } else {
        config.deceleration
    };

    (speed_diff.abs() * rate).powf(config.velocity_power) * speed_diff.signum()
}

/// Braking impulse opposite to `current_vel_x`, never larger than the speed itself
pub fn compute_friction(current_vel_x: f32, friction: f32) -> f32 {
    let amount = current_vel_x.abs().min(friction.abs());
    if amount == 0.0 {
        return 0.0;
    }
    -amount * current_vel_x.signum()
}

/// Whether input should flip the facing direction
pub fn needs_turn(input: f32, facing_right: bool) -> bool {
    input != 0.0 && (input > 0.0) != facing_right
}

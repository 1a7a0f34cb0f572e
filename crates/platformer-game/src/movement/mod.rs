//! Platformer movement
//!
//! Force-based horizontal locomotion and the jump state machine (coyote time,
//! jump buffering, multi-jump, variable height via early release).

mod collaborators;
mod config;
mod controller;
mod locomotion;
pub mod rapier;
mod state;

pub use collaborators::{
    Body, ContactEnter, ContactHandler, FixedCapacity, ForceMode, GroundSensor, LocomotionContext,
    SpawnHandler,
};
pub use config::{ConfigError, MovementConfig};
pub use controller::MovementController;
pub use locomotion::{compute_friction, compute_run_force, needs_turn, INPUT_DEAD_ZONE};
pub use rapier::{RapierCharacter, SharedPhysics};
pub use state::{JumpPhase, MovementEvent, MovementState};

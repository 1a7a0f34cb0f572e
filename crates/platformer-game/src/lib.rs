//! Platformer Game - Movement controller and input
//!
//! Provides the character movement controller, its rapier-backed
//! collaborators and keyboard input mapping.

pub mod input;
pub mod movement;

pub use input::{InputAction, InputBindings, InputHandler, InputState};
pub use movement::{
    Body, ConfigError, ContactEnter, ContactHandler, FixedCapacity, ForceMode, GroundSensor,
    JumpPhase, LocomotionContext, MovementConfig, MovementController, MovementEvent, MovementState,
    RapierCharacter, SharedPhysics, SpawnHandler,
};

//! Platformer Core - Shared types and frame timing
//!
//! This crate provides the foundational types used by the other crates:
//! - Mathematical primitives (re-exported from glam)
//! - Transform used for the character's presentation (facing mirror)
//! - Opaque contact identities handed to pickup handlers
//! - Frame clock with a fixed-timestep accumulator

pub mod time;
pub mod types;

pub use glam::{Mat4, Quat, Vec2, Vec3};
pub use time::{GameTime, TimeConfig};
pub use types::{ContactId, Transform};

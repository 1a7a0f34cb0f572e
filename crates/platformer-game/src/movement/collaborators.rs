//! Seams between the movement controller and the outside world
//!
//! The controller never looks anything up. Everything it talks to is handed
//! in at construction through these traits.

use glam::Vec3;
use platformer_core::ContactId;

/// How a force is fed to the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Accumulated and integrated during the next physics step
    Continuous,
    /// Changes velocity immediately (by impulse / mass)
    Impulse,
}

/// The rigid body being driven
pub trait Body {
    /// Current linear velocity
    fn velocity(&self) -> Vec3;

    /// Apply a force or an impulse
    fn apply_force(&mut self, force: Vec3, mode: ForceMode);
}

/// Short range test for walkable ground under the body
pub trait GroundSensor {
    fn is_grounded(&self) -> bool;
}

/// Reports how many contact points currently support jumping.
///
/// One is enough for a ground jump, more than one unlocks air jumps.
pub trait LocomotionContext {
    fn extra_jump_capacity(&self) -> u32;
}

/// Moves the character to its spawn point when the controller starts
pub trait SpawnHandler {
    fn reset_position(&mut self, spawn: Vec3);
}

/// Something entered a contact volume that is not ground
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEnter {
    /// The collider that was touched
    pub collider: ContactId,
    /// Name of the object owning that collider, if known
    pub owner: Option<String>,
}

/// Receives contact entries forwarded by the controller
pub trait ContactHandler {
    fn on_contact_enter(&mut self, contact: &ContactEnter);
}

impl<F: FnMut(&ContactEnter)> ContactHandler for F {
    fn on_contact_enter(&mut self, contact: &ContactEnter) {
        self(contact)
    }
}

impl<T: Body + ?Sized> Body for &mut T {
    fn velocity(&self) -> Vec3 {
        (**self).velocity()
    }

    fn apply_force(&mut self, force: Vec3, mode: ForceMode) {
        (**self).apply_force(force, mode)
    }
}

impl<T: GroundSensor + ?Sized> GroundSensor for &T {
    fn is_grounded(&self) -> bool {
        (**self).is_grounded()
    }
}

impl<T: GroundSensor + ?Sized> GroundSensor for &mut T {
    fn is_grounded(&self) -> bool {
        (**self).is_grounded()
    }
}

impl<T: LocomotionContext + ?Sized> LocomotionContext for &T {
    fn extra_jump_capacity(&self) -> u32 {
        (**self).extra_jump_capacity()
    }
}

impl<T: LocomotionContext + ?Sized> LocomotionContext for &mut T {
    fn extra_jump_capacity(&self) -> u32 {
        (**self).extra_jump_capacity()
    }
}

impl<T: SpawnHandler + ?Sized> SpawnHandler for &mut T {
    fn reset_position(&mut self, spawn: Vec3) {
        (**self).reset_position(spawn)
    }
}

/// A jump capacity that never changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCapacity(pub u32);

impl LocomotionContext for FixedCapacity {
    fn extra_jump_capacity(&self) -> u32 {
        self.0
    }
}

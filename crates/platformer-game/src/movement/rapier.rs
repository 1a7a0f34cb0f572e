//! Collaborators backed by the rapier physics world
//!
//! The world is shared between the scheduler (which steps it) and the
//! character adapter (which reads velocity, pushes forces and probes for
//! ground), so it lives behind `Rc<RefCell<_>>`. Everything runs on one thread.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use platformer_core::ContactId;
use platformer_physics::{GroundProbe, PhysicsError, PhysicsWorld, SensorEntry};
use rapier3d::prelude::{ColliderHandle, Group, RigidBodyHandle};

use super::collaborators::{Body, ContactEnter, ForceMode, GroundSensor, SpawnHandler};

/// Physics world shared by the scheduler and the character adapters
pub type SharedPhysics = Rc<RefCell<PhysicsWorld>>;

/// A character body in a [`PhysicsWorld`], usable as body, ground sensor and spawn handler
#[derive(Clone)]
pub struct RapierCharacter {
    physics: SharedPhysics,
    body: RigidBodyHandle,
    collider: ColliderHandle,
    probe: GroundProbe,
    /// Distance from the collider's bottom to the body origin
    foot_offset: f32,
}

impl RapierCharacter {
    /// Resolve the body and its collider. Fails if either is missing.
    pub fn new(
        physics: SharedPhysics,
        body: RigidBodyHandle,
        probe_radius: f32,
    ) -> Result<Self, PhysicsError> {
        let (collider, probe, foot_offset) = {
            let world = physics.borrow();
            let collider = world.primary_collider(body)?;
            let probe = GroundProbe::new(&world, body, probe_radius)?;
            let foot_offset = probe
                .origin(&world)
                .map(|bottom| world.translation(body).y - bottom.y)
                .ok_or(PhysicsError::MissingCollider(body))?;
            (collider, probe, foot_offset)
        };

        Ok(Self {
            physics,
            body,
            collider,
            probe,
            foot_offset,
        })
    }

    /// Restrict which collision groups count as ground
    pub fn with_ground_groups(mut self, groups: Group) -> Self {
        self.probe = self.probe.with_groups(groups);
        self
    }

    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body
    }

    /// Capsule centre in world space
    pub fn position(&self) -> Vec3 {
        self.physics.borrow().translation(self.body)
    }

    /// Turn a trigger entry into a contact for this character, if it was this
    /// character that entered
    pub fn contact_from(&self, entry: &SensorEntry) -> Option<ContactEnter> {
        (entry.other == self.collider).then(|| ContactEnter {
            collider: contact_id(entry.sensor),
            owner: entry.label.clone(),
        })
    }
}

/// Stable identity for a collider handle
pub fn contact_id(handle: ColliderHandle) -> ContactId {
    let (index, generation) = handle.into_raw_parts();
    ContactId::from_raw_parts(index, generation)
}

impl Body for RapierCharacter {
    fn velocity(&self) -> Vec3 {
        self.physics.borrow().linear_velocity(self.body)
    }

    fn apply_force(&mut self, force: Vec3, mode: ForceMode) {
        let mut physics = self.physics.borrow_mut();
        match mode {
            ForceMode::Continuous => physics.add_force(self.body, force),
            ForceMode::Impulse => physics.apply_impulse(self.body, force),
        }
    }
}

impl GroundSensor for RapierCharacter {
    fn is_grounded(&self) -> bool {
        self.probe.is_grounded(&self.physics.borrow())
    }
}

/// The spawn point is where the character's feet go
impl SpawnHandler for RapierCharacter {
    fn reset_position(&mut self, spawn: Vec3) {
        let origin = spawn + Vec3::Y * self.foot_offset;
        self.physics.borrow_mut().teleport(self.body, origin);
    }
}

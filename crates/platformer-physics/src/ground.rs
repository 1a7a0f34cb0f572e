//! Short range ground probe
//!
//! A small ball placed at the bottom-centre of the character's collider
//! bounds. Only colliders in the ground group count, triggers never do.

use glam::Vec3;
use rapier3d::prelude::*;

use crate::{PhysicsError, PhysicsWorld};

/// Ground contact query for one character body
#[derive(Debug, Clone)]
pub struct GroundProbe {
    /// Body being probed
    pub body: RigidBodyHandle,
    /// Ball radius (default: 0.1m)
    pub radius: f32,
    /// Groups that count as ground
    pub ground_groups: Group,
}

impl GroundProbe {
    /// Create a probe for a body, failing if the body has no collider.
    ///
    /// Ground defaults to the world's configured ground group.
    pub fn new(
        physics: &PhysicsWorld,
        body: RigidBodyHandle,
        radius: f32,
    ) -> Result<Self, PhysicsError> {
        physics.primary_collider(body)?;
        Ok(Self {
            body,
            radius,
            ground_groups: physics.config.ground_group,
        })
    }

    /// Restrict which groups count as ground
    pub fn with_groups(mut self, groups: Group) -> Self {
        self.ground_groups = groups;
        self
    }

    /// Probe origin: bottom-centre of the collider's bounding box
    pub fn origin(&self, physics: &PhysicsWorld) -> Option<Vec3> {
        let collider = physics.primary_collider(self.body).ok()?;
        let aabb = physics.get_collider(collider)?.compute_aabb();
        let center = aabb.center();
        Some(Vec3::new(center.x, aabb.mins.y, center.z))
    }

    /// Whether the probe overlaps walkable geometry
    pub fn is_grounded(&self, physics: &PhysicsWorld) -> bool {
        let Some(origin) = self.origin(physics) else {
            return false;
        };

        let filter = QueryFilter::new()
            .exclude_sensors()
            .exclude_rigid_body(self.body)
            .groups(InteractionGroups::new(Group::ALL, self.ground_groups));

        physics.intersects_ball(origin, self.radius, filter).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CharacterBodyConfig, PhysicsConfig};

    fn world_with_character(bottom: Vec3) -> (PhysicsWorld, RigidBodyHandle) {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let (body, _) = world.spawn_character(&CharacterBodyConfig::default(), bottom);
        (world, body)
    }

    #[test]
    fn test_probe_origin_is_collider_bottom() {
        let (world, body) = world_with_character(Vec3::new(1.0, 2.0, 0.0));
        let probe = GroundProbe::new(&world, body, 0.1).unwrap();
        let origin = probe.origin(&world).unwrap();
        assert!((origin.x - 1.0).abs() < 0.001);
        assert!((origin.y - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_grounded_near_floor() {
        let (world, body) = world_with_character(Vec3::new(0.0, 0.05, 0.0));
        let probe = GroundProbe::new(&world, body, 0.1).unwrap();
        assert!(probe.is_grounded(&world));
    }

    #[test]
    fn test_not_grounded_in_air() {
        let (world, body) = world_with_character(Vec3::new(0.0, 2.0, 0.0));
        let probe = GroundProbe::new(&world, body, 0.1).unwrap();
        assert!(!probe.is_grounded(&world));
    }

    #[test]
    fn test_triggers_are_not_ground() {
        let (mut world, body) = world_with_character(Vec3::new(0.0, 2.0, 0.0));
        world.create_trigger("Coin", Vec3::splat(0.5), Vec3::new(0.0, 2.0, 0.0));
        let probe = GroundProbe::new(&world, body, 0.1).unwrap();
        assert!(!probe.is_grounded(&world));
    }

    #[test]
    fn test_ledge_counts_as_ground() {
        let (mut world, body) = world_with_character(Vec3::new(3.0, 1.05, 0.0));
        world.create_static_box(Vec3::new(1.0, 0.5, 1.0), Vec3::new(3.0, 0.5, 0.0));
        let probe = GroundProbe::new(&world, body, 0.1).unwrap();
        assert!(probe.is_grounded(&world));
    }

    #[test]
    fn test_follows_world_ground_group() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig {
            ground_group: Group::GROUP_5,
            ..Default::default()
        });
        world.create_ground(0.0);
        let config = CharacterBodyConfig::default();
        let (body, _) = world.spawn_character(&config, Vec3::new(0.0, 0.05, 0.0));

        let probe = GroundProbe::new(&world, body, 0.1).unwrap();
        assert_eq!(probe.ground_groups, Group::GROUP_5);
        assert!(probe.is_grounded(&world));

        let default_group = probe.with_groups(crate::GROUND_GROUP);
        assert!(!default_group.is_grounded(&world));
    }

    #[test]
    fn test_other_groups_ignored() {
        let (world, body) = world_with_character(Vec3::new(0.0, 0.05, 0.0));
        let probe = GroundProbe::new(&world, body, 0.1)
            .unwrap()
            .with_groups(Group::GROUP_3);
        assert!(!probe.is_grounded(&world));
    }
}

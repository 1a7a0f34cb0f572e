//! Platformer Physics - Rigid body simulation using rapier3d
//!
//! Provides the world the movement controller pushes forces into: dynamic
//! character bodies, static level geometry, trigger volumes and the short
//! range ground probe.

mod events;
mod ground;

pub use events::{ContactEventQueue, SensorEntry};
pub use ground::GroundProbe;

use std::collections::HashMap;

use glam::Vec3;
use nalgebra::Unit;
use rapier3d::prelude::*;
use tracing::debug;

/// Collision group used by walkable level geometry
pub const GROUND_GROUP: Group = Group::GROUP_1;
/// Collision group used by character bodies
pub const CHARACTER_GROUP: Group = Group::GROUP_2;

/// Errors raised while resolving physics handles
#[derive(Debug, Clone, thiserror::Error)]
pub enum PhysicsError {
    #[error("Rigid body {0:?} does not exist")]
    MissingBody(RigidBodyHandle),

    #[error("Rigid body {0:?} has no collider attached")]
    MissingCollider(RigidBodyHandle),
}

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/50)
    pub timestep: f32,
    /// Group for walkable level geometry (default: [`GROUND_GROUP`])
    pub ground_group: Group,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 50.0,
            ground_group: GROUND_GROUP,
        }
    }
}

/// Shape and mass of a character body
#[derive(Debug, Clone)]
pub struct CharacterBodyConfig {
    /// Capsule height (default: 1.0m)
    pub height: f32,
    /// Capsule radius (default: 0.3m)
    pub radius: f32,
    /// Total mass (default: 1kg, so impulses map 1:1 onto velocity)
    pub mass: f32,
}

impl Default for CharacterBodyConfig {
    fn default() -> Self {
        Self {
            height: 1.0,
            radius: 0.3,
            mass: 1.0,
        }
    }
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Impulse joint storage
    pub impulse_joint_set: ImpulseJointSet,
    /// Multi-body joint storage
    pub multibody_joint_set: MultibodyJointSet,

    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Physics pipeline
    physics_pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,
    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,
    /// Continuous collision detection solver
    ccd_solver: CCDSolver,
    /// Query pipeline for shape queries
    query_pipeline: QueryPipeline,
    /// Collision events gathered during a step
    events: ContactEventQueue,
    /// Sensor entries not yet handed out
    pending_entries: Vec<SensorEntry>,
    /// Owner labels for trigger volumes
    labels: HashMap<ColliderHandle, String>,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            events: ContactEventQueue::default(),
            pending_entries: Vec::new(),
            labels: HashMap::new(),
        }
    }

    /// Step the physics simulation.
    ///
    /// Continuous forces added since the previous step are integrated once and
    /// then cleared.
    pub fn step(&mut self) {
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.events,
        );

        for (_, body) in self.rigid_body_set.iter_mut() {
            if body.is_dynamic() {
                body.reset_forces(false);
            }
        }

        let entries = self.events.drain_sensor_entries(&self.collider_set, &self.labels);
        self.pending_entries.extend(entries);

        // Update query pipeline after physics step
        self.refresh_queries();
    }

    /// Rebuild the query acceleration structure from current collider poses
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Take the sensor entries produced by the steps run so far
    pub fn drain_sensor_entries(&mut self) -> Vec<SensorEntry> {
        std::mem::take(&mut self.pending_entries)
    }

    /// Add a static collider (ground, walls, etc.)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Add a dynamic rigid body with a collider
    pub fn add_dynamic_body(
        &mut self,
        rigid_body: RigidBody,
        collider: Collider,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let rb_handle = self.rigid_body_set.insert(rigid_body);
        let col_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        (rb_handle, col_handle)
    }

    /// Spawn a platformer character: upright capsule, no rotation, motion
    /// restricted to the XY plane.
    ///
    /// `position` is the point at the bottom of the capsule.
    pub fn spawn_character(
        &mut self,
        config: &CharacterBodyConfig,
        position: Vec3,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y + config.height / 2.0, position.z])
            .lock_rotations()
            .enabled_translations(true, true, false)
            .can_sleep(false)
            .build();

        let half_height = (config.height - 2.0 * config.radius) / 2.0;
        let collider = ColliderBuilder::capsule_y(half_height.max(0.01), config.radius)
            .mass(config.mass)
            .friction(0.0) // Horizontal braking is up to the movement controller
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(0.0)
            .collision_groups(InteractionGroups::new(CHARACTER_GROUP, Group::ALL))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let handles = self.add_dynamic_body(body, collider);
        self.refresh_queries();
        debug!(?position, "Spawned character body");
        handles
    }

    /// Remove a rigid body and its colliders
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.rigid_body_set.get(handle) {
            for collider in body.colliders() {
                self.labels.remove(collider);
            }
        }
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Get a collider by handle
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Resolve a body handle, failing if it is gone
    pub fn body(&self, handle: RigidBodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.rigid_body_set
            .get(handle)
            .ok_or(PhysicsError::MissingBody(handle))
    }

    /// First collider attached to a body
    pub fn primary_collider(
        &self,
        handle: RigidBodyHandle,
    ) -> Result<ColliderHandle, PhysicsError> {
        self.body(handle)?
            .colliders()
            .first()
            .copied()
            .ok_or(PhysicsError::MissingCollider(handle))
    }

    /// Linear velocity of a body, zero if the handle is stale
    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Vec3 {
        self.rigid_body_set
            .get(handle)
            .map(|body| {
                let v = body.linvel();
                Vec3::new(v.x, v.y, v.z)
            })
            .unwrap_or(Vec3::ZERO)
    }

    /// Body translation (capsule centre), zero if the handle is stale
    pub fn translation(&self, handle: RigidBodyHandle) -> Vec3 {
        self.rigid_body_set
            .get(handle)
            .map(|body| {
                let t = body.translation();
                Vec3::new(t.x, t.y, t.z)
            })
            .unwrap_or(Vec3::ZERO)
    }

    /// Add a force that is integrated during the next step only
    pub fn add_force(&mut self, handle: RigidBodyHandle, force: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.add_force(vector![force.x, force.y, force.z], true);
        }
    }

    /// Apply an instantaneous impulse (changes velocity by impulse / mass)
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    /// Move a body to a position and stop it
    pub fn teleport(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(vector![position.x, position.y, position.z], true);
            body.set_linvel(vector![0.0, 0.0, 0.0], true);
            body.reset_forces(true);
        }
        // Collider poses follow their parent only after a step, sync them now
        // so probes see the new location.
        if let Some(body) = self.rigid_body_set.get(handle) {
            let pose = *body.position();
            for &collider in body.colliders() {
                if let Some(collider) = self.collider_set.get_mut(collider) {
                    collider.set_position(pose);
                }
            }
        }
        self.refresh_queries();
    }

    /// Test whether anything matching `filter` overlaps a ball
    pub fn intersects_ball(
        &self,
        center: Vec3,
        radius: f32,
        filter: QueryFilter,
    ) -> Option<ColliderHandle> {
        let shape_pos = Isometry::translation(center.x, center.y, center.z);
        self.query_pipeline.intersection_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &rapier3d::parry::shape::Ball::new(radius),
            filter,
        )
    }

    /// Create a ground plane collider
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .collision_groups(InteractionGroups::new(self.config.ground_group, Group::ALL))
            .build();
        let handle = self.add_static_collider(ground);
        self.refresh_queries();
        handle
    }

    /// Create a static box collider in the ground group (platforms, ledges)
    pub fn create_static_box(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .friction(0.7)
            .collision_groups(InteractionGroups::new(self.config.ground_group, Group::ALL))
            .build();
        let handle = self.add_static_collider(collider);
        self.refresh_queries();
        handle
    }

    /// Create a labelled trigger volume.
    ///
    /// Triggers never block movement and never count as ground; entering one
    /// produces a [`SensorEntry`] carrying the label.
    pub fn create_trigger(
        &mut self,
        label: impl Into<String>,
        half_extents: Vec3,
        position: Vec3,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .sensor(true)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let handle = self.add_static_collider(collider);
        self.labels.insert(handle, label.into());
        self.refresh_queries();
        handle
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character_world() -> (PhysicsWorld, RigidBodyHandle) {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let config = CharacterBodyConfig::default();
        let (body, _) = world.spawn_character(&config, Vec3::new(0.0, 2.0, 0.0));
        (world, body)
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.config.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_ground_creation() {
        let mut world = PhysicsWorld::new();
        let ground = world.create_ground(0.0);
        assert!(world.get_collider(ground).is_some());
    }

    #[test]
    fn test_level_geometry_uses_configured_ground_group() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig {
            ground_group: Group::GROUP_4,
            ..Default::default()
        });
        let ground = world.create_ground(0.0);
        let ledge = world.create_static_box(Vec3::splat(0.5), Vec3::new(3.0, 0.5, 0.0));

        for handle in [ground, ledge] {
            let groups = world.get_collider(handle).unwrap().collision_groups();
            assert_eq!(groups.memberships, Group::GROUP_4);
        }
    }

    #[test]
    fn test_character_falls_and_lands() {
        let (mut world, body) = character_world();
        for _ in 0..150 {
            world.step();
        }
        let pos = world.translation(body);
        assert!(pos.y > 0.4 && pos.y < 0.6, "capsule should rest on the ground, y = {}", pos.y);
        assert!(world.linear_velocity(body).y.abs() < 0.1);
    }

    #[test]
    fn test_impulse_changes_velocity_by_mass() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        let config = CharacterBodyConfig::default();
        let (body, _) = world.spawn_character(&config, Vec3::new(0.0, 5.0, 0.0));
        world.step();

        world.apply_impulse(body, Vec3::new(0.0, 4.0, 0.0));
        assert!((world.linear_velocity(body).y - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_forces_reset_after_step() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        let config = CharacterBodyConfig::default();
        let (body, _) = world.spawn_character(&config, Vec3::new(0.0, 5.0, 0.0));

        world.add_force(body, Vec3::new(10.0, 0.0, 0.0));
        world.step();
        let after_one = world.linear_velocity(body).x;
        assert!((after_one - 10.0 * world.config.timestep).abs() < 0.01);

        // No new force: velocity is carried, not increased
        world.step();
        assert!((world.linear_velocity(body).x - after_one).abs() < 0.001);
    }

    #[test]
    fn test_depth_axis_is_locked() {
        let (mut world, body) = character_world();
        world.apply_impulse(body, Vec3::new(0.0, 0.0, 5.0));
        world.step();
        assert_eq!(world.translation(body).z, 0.0);
    }

    #[test]
    fn test_teleport_stops_body() {
        let (mut world, body) = character_world();
        world.apply_impulse(body, Vec3::new(3.0, 3.0, 0.0));
        world.teleport(body, Vec3::new(4.0, 1.0, 0.0));
        assert_eq!(world.translation(body), Vec3::new(4.0, 1.0, 0.0));
        assert_eq!(world.linear_velocity(body), Vec3::ZERO);
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let (mut world, body) = character_world();
        world.remove_rigid_body(body);
        assert!(matches!(world.body(body), Err(PhysicsError::MissingBody(_))));
        assert_eq!(world.linear_velocity(body), Vec3::ZERO);
    }

    #[test]
    fn test_trigger_entry_reported_once() {
        let (mut world, body) = character_world();
        let coin =
            world.create_trigger("Coin", Vec3::new(0.5, 0.3, 0.5), Vec3::new(0.0, 1.0, 0.0));
        let character_collider = world.primary_collider(body).unwrap();

        let mut entries = Vec::new();
        for _ in 0..150 {
            world.step();
            entries.extend(world.drain_sensor_entries());
        }

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sensor, coin);
        assert_eq!(entries[0].other, character_collider);
        assert_eq!(entries[0].label.as_deref(), Some("Coin"));
    }
}

//! Core types shared between the physics world and the movement controller

use std::fmt;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque identity of a collider that the character touched.
///
/// The movement controller never interprets it; it is forwarded as-is to
/// whoever handles pickups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub u64);

impl ContactId {
    /// Pack an arena index and generation into a contact id
    pub fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | index as u64)
    }

    /// Split back into (index, generation)
    pub fn into_raw_parts(self) -> (u32, u32) {
        (self.0 as u32, (self.0 >> 32) as u32)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.into_raw_parts();
        write!(f, "{index}v{generation}")
    }
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Compute the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Mirror along the local X axis
    pub fn mirror_x(&mut self) {
        self.scale.x = -self.scale.x;
    }

    /// Whether the X axis is currently mirrored
    pub fn is_mirrored_x(&self) -> bool {
        self.scale.x < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let matrix = transform.matrix();
        let translation = matrix.col(3).truncate();
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_mirror_x_twice_restores() {
        let mut transform = Transform::default();
        transform.mirror_x();
        assert!(transform.is_mirrored_x());
        assert_eq!(transform.matrix().col(0).x, -1.0);

        transform.mirror_x();
        assert_eq!(transform, Transform::default());
    }

    #[test]
    fn test_contact_id_raw_parts() {
        let id = ContactId::from_raw_parts(7, 3);
        assert_eq!(id.into_raw_parts(), (7, 3));
        assert_eq!(id.to_string(), "7v3");
    }
}

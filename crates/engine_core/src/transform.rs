//! Transform component and utilities for spatial positioning.

use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
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
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Map a point from this transform's local space into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * local)
    }

    /// Map a world-space point into this transform's local space.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        (self.rotation.inverse() * (world - self.position)) / self.scale
    }

    /// Look at a target position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if let Some(rotation) = look_rotation(target - self.position, up) {
            self.rotation = rotation;
        }
    }
}

/// Rotation whose forward axis points along `direction`.
///
/// Returns `None` for a zero-length direction. When `direction` is parallel to
/// `up`, world Z is used as the up hint instead.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    let forward = direction.normalize_or_zero();
    if forward.length_squared() < 0.0001 {
        return None;
    }
    let up = if forward.cross(up).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        up
    };
    Some(Quat::from_mat4(&Mat4::look_at_rh(Vec3::ZERO, forward, up)).inverse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_forward_is_negative_z() {
        let t = Transform::default();
        assert!((t.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!((t.right() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        t.look_at(Vec3::new(10.0, 0.0, 50.0), Vec3::Y);
        assert!((t.forward() - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn look_rotation_handles_vertical_direction() {
        let rotation = look_rotation(Vec3::Y, Vec3::Y).expect("non-zero direction");
        assert!(((rotation * Vec3::NEG_Z) - Vec3::Y).length() < 1e-4);
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn point_round_trip_through_local_space() {
        let t = Transform::from_position_rotation(
            Vec3::new(5.0, -2.0, 7.0),
            Quat::from_rotation_y(1.1),
        );
        let local = Vec3::new(3.0, 4.0, -12.0);
        let world = t.transform_point(local);
        assert!((t.inverse_transform_point(world) - local).length() < 1e-4);
    }
}

//! Position, rotation and scale of anything placed in the world.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

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
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Facing direction. Unrotated transforms face -Z.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Heading of [`Transform::forward`] about +Y, in radians.
    /// Zero when facing -Z; positive turns toward -X (counter-clockwise seen from above).
    pub fn yaw(&self) -> f32 {
        let forward = self.forward();
        (-forward.x).atan2(-forward.z)
    }

    /// Turn to face `target`. A target on top of the current position is ignored,
    /// since it has no direction.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if (target - self.position).length_squared() <= 1e-4 {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, up);
        self.rotation = Quat::from_mat4(&view).inverse();
    }
}

/// Model matrix block for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform> for TransformRaw {
    fn from(transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_position(Vec3::new(0.0, 2.0, 5.0));
        t.look_at(Vec3::ZERO, Vec3::Y);
        let expected = (Vec3::ZERO - t.position).normalize();
        assert!(t.forward().distance(expected) < 1e-4);
    }

    #[test]
    fn look_at_same_point_is_ignored() {
        let mut t = Transform::from_position(Vec3::ONE);
        t.rotation = Quat::from_rotation_y(0.3);
        let before = t.rotation;
        t.look_at(Vec3::ONE, Vec3::Y);
        assert_eq!(t.rotation, before);
    }

    #[test]
    fn yaw_matches_rotation_about_y() {
        let mut t = Transform::default();
        assert!(t.yaw().abs() < 1e-6);
        t.rotation = Quat::from_rotation_y(0.75);
        assert!((t.yaw() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn raw_matrix_places_origin_at_position() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let raw = TransformRaw::from(&t);
        assert_eq!(raw.model[3], [1.0, 2.0, 3.0, 1.0]);
    }
}

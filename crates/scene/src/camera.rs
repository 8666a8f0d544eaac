//! Scene camera: a pose plus a perspective projection.

use crate::error::SceneError;
use crate::material::{ShaderMaterial, UniformValue, UNIFORM_PROJECTION, UNIFORM_VIEW};
use bytemuck::{Pod, Zeroable};
use engine_core::Transform;
use glam::{Mat4, Vec3};

/// Perspective parameters. `fov_degrees` is vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Width over height.
    pub aspect: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// The viewpoint handed to the renderer. Its pose is owned by the chase camera rig.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    pub transform: Transform,
    pub projection: Projection,
}

impl Camera {
    pub fn new(position: Vec3, projection: Projection) -> Self {
        Self {
            transform: Transform::from_position(position),
            projection,
        }
    }

    /// Follow the window size. A zero height is treated as one pixel.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.projection.aspect = width as f32 / height.max(1) as f32;
    }

    /// World-to-view transform: the inverse of the camera pose, ignoring scale.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.transform.rotation, self.transform.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    /// Write the view and projection matrices into a shader material's named uniforms.
    pub fn write_uniforms(&self, material: &mut ShaderMaterial) -> Result<(), SceneError> {
        material.set(UNIFORM_VIEW, UniformValue::Mat4(self.view_matrix()))?;
        material.set(UNIFORM_PROJECTION, UniformValue::Mat4(self.projection_matrix()))
    }
}

/// Camera block for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// xyz = eye position, w = 1.
    pub position: [f32; 4],
}

impl From<&Camera> for CameraUniform {
    fn from(camera: &Camera) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix();
        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            position: camera.position().extend(1.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ShaderSource;

    fn looking_at_origin() -> Camera {
        let mut camera = Camera::new(Vec3::new(0.0, 2.0, 5.0), Projection::default());
        camera.transform.look_at(Vec3::ZERO, Vec3::Y);
        camera
    }

    #[test]
    fn view_matches_look_at() {
        let camera = looking_at_origin();
        let expected = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert!(camera.view_matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = looking_at_origin();
        let clip = camera.view_projection_matrix() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn aspect_follows_window_size() {
        let mut camera = Camera::default();
        camera.set_aspect(1920, 1080);
        assert!((camera.projection.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect(640, 0);
        assert_eq!(camera.projection.aspect, 640.0);
    }

    #[test]
    fn uniforms_written_to_shader_material() {
        let camera = looking_at_origin();
        let mut material = ShaderMaterial::new(ShaderSource::Embedded("v"), ShaderSource::Embedded("f"));
        camera.write_uniforms(&mut material).unwrap();
        assert_eq!(material.uniforms().view, camera.view_matrix().to_cols_array_2d());
        assert_eq!(
            material.uniforms().projection,
            camera.projection_matrix().to_cols_array_2d()
        );
    }

    #[test]
    fn gpu_block_carries_eye_position() {
        let uniform = CameraUniform::from(&looking_at_origin());
        assert_eq!(uniform.position, [0.0, 2.0, 5.0, 1.0]);
    }
}

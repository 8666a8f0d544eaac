//! Chase camera that orbits the character.
//!
//! Dragging sets the target yaw instantly; the rig eases its current yaw towards it
//! and trails the ideal orbit position with exponential smoothing. Zoom scales the
//! orbit distance and is applied without smoothing.

use crate::config::CameraConfig;
use engine_core::math::lerp;
use engine_core::Vec3;
use input::FrameInput;
use scene::{Camera, Projection};
use std::f32::consts::PI;

pub struct CameraRig {
    pub camera: Camera,
    current_yaw: f32,
    target_yaw: f32,
    zoom_level: f32,
    settings: CameraConfig,
}

impl CameraRig {
    /// Camera at `(0, base_height, base_distance)` looking at the origin, with the orbit
    /// yaw matching that placement so the first update does not swing around.
    pub fn new(settings: &CameraConfig) -> Self {
        let projection = Projection {
            fov_degrees: settings.fov_degrees,
            near: settings.near,
            far: settings.far,
            ..Projection::default()
        };
        let mut camera = Camera::new(Vec3::new(0.0, settings.base_height, settings.base_distance), projection);
        camera.transform.look_at(Vec3::ZERO, Vec3::Y);

        Self {
            camera,
            current_yaw: PI,
            target_yaw: PI,
            zoom_level: 1.0_f32.clamp(settings.min_zoom, settings.max_zoom),
            settings: settings.clone(),
        }
    }

    pub fn current_yaw(&self) -> f32 {
        self.current_yaw
    }

    pub fn target_yaw(&self) -> f32 {
        self.target_yaw
    }

    pub fn zoom_level(&self) -> f32 {
        self.zoom_level
    }

    /// Heading of the camera's actual orientation. Movement input is relative to this.
    pub fn view_yaw(&self) -> f32 {
        self.camera.transform.yaw()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Apply one frame of drained drag motion and wheel events. Each wheel event is
    /// clamped on its own, so scrolling past a limit and back lands inside the range.
    pub fn apply_input(&mut self, input: &FrameInput, wheel: impl IntoIterator<Item = f32>) {
        if input.drag_delta_x != 0.0 {
            self.rotate(input.drag_delta_x);
        }
        for delta in wheel {
            self.zoom(delta);
        }
    }

    /// Turn the target yaw by a horizontal drag in pixels.
    pub fn rotate(&mut self, drag_delta_x: f32) {
        self.target_yaw -= drag_delta_x * self.settings.rotation_speed;
    }

    /// Change the zoom level by a wheel delta in pixels, clamped to the configured range.
    pub fn zoom(&mut self, wheel_delta: f32) {
        let zoom = self.zoom_level + wheel_delta * self.settings.zoom_sensitivity;
        self.zoom_level = zoom.clamp(self.settings.min_zoom, self.settings.max_zoom);
        log::trace!("Camera zoom {:.3}", self.zoom_level);
    }

    /// Orbit position the camera is easing towards.
    pub fn ideal_position(&self, target: Vec3) -> Vec3 {
        let distance = self.settings.base_distance * self.zoom_level;
        let (sin, cos) = self.current_yaw.sin_cos();
        target - distance * Vec3::new(sin, 0.0, cos) + Vec3::new(0.0, self.settings.base_height, 0.0)
    }

    /// Follow `target`. Does nothing until there is something to follow.
    pub fn update(&mut self, target: Option<Vec3>) {
        let Some(target) = target else {
            return;
        };
        self.current_yaw = lerp(self.current_yaw, self.target_yaw, self.settings.rotation_lerp);
        let ideal = self.ideal_position(target);
        let transform = &mut self.camera.transform;
        transform.position = transform.position.lerp(ideal, self.settings.position_lerp);
        transform.look_at(target + Vec3::new(0.0, self.settings.eye_height_offset, 0.0), Vec3::Y);
    }
}

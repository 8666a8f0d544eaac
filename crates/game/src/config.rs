//! Game configuration (window, controller, camera, water, simulation). Loaded from config.ron at startup.

use crate::error::ConfigError;
use engine_core::Vec3;
use input::DragButton;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent game settings. Loaded from `config.ron` in the current directory.
/// Every field falls back to its default when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub controller: ControllerConfig,
    pub water: WaterConfig,
    pub camera: CameraConfig,
    pub input: InputConfig,
    pub simulation: SimulationConfig,
    pub assets: AssetPaths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Shoreline".to_string(),
        }
    }
}

/// Character body and locomotion tunables. Speeds and forces are impulse magnitudes
/// applied once per simulation tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub move_speed: f32,
    pub jump_force: f32,
    pub swim_speed: f32,
    /// Vertical impulse per tick while holding ascend in water.
    pub ascend_rate: f32,
    /// Upward impulse per metre below the water line.
    pub buoyancy_coefficient: f32,
    /// Ground probe length measured from the body center.
    pub ground_ray_length: f32,
    /// Swim animation phase advance per submerged tick.
    pub swim_phase_step: f32,
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    pub spawn_position: [f32; 3],
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
    pub lock_rotations: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 10.0,
            swim_speed: 2.0,
            ascend_rate: 3.0,
            buoyancy_coefficient: 2.0,
            ground_ray_length: 1.1,
            swim_phase_step: 0.1,
            capsule_radius: 0.5,
            capsule_half_height: 0.5,
            spawn_position: [0.0, 2.0, 0.0],
            linear_damping: 0.5,
            angular_damping: 0.5,
            friction: 0.7,
            restitution: 0.2,
            lock_rotations: true,
        }
    }
}

impl ControllerConfig {
    pub fn spawn(&self) -> Vec3 {
        Vec3::from(self.spawn_position)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Height of the water surface.
    pub level: f32,
    /// The character counts as submerged below `level + submerge_margin`.
    pub submerge_margin: f32,
    /// `iGlobalTime` advance per rendered frame.
    pub time_step: f32,
    pub size: f32,
    pub segments: u32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            level: 0.0,
            submerge_margin: 0.5,
            time_step: 0.01,
            size: 100.0,
            segments: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub base_distance: f32,
    pub base_height: f32,
    /// Look-at point height above the character position.
    pub eye_height_offset: f32,
    pub rotation_lerp: f32,
    pub position_lerp: f32,
    /// Radians of yaw per dragged pixel.
    pub rotation_speed: f32,
    /// Zoom change per wheel pixel.
    pub zoom_sensitivity: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_distance: 5.0,
            base_height: 2.0,
            eye_height_offset: 0.0,
            rotation_lerp: 0.1,
            position_lerp: 0.1,
            rotation_speed: 0.01,
            zoom_sensitivity: 0.001,
            min_zoom: 0.5,
            max_zoom: 3.0,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Mouse button used to orbit the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragButtonConfig {
    Left,
    #[default]
    Right,
    Middle,
}

impl From<DragButtonConfig> for DragButton {
    fn from(value: DragButtonConfig) -> Self {
        match value {
            DragButtonConfig::Left => DragButton::Left,
            DragButtonConfig::Right => DragButton::Right,
            DragButtonConfig::Middle => DragButton::Middle,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub drag_button: DragButtonConfig,
}

/// How physics steps are scheduled against rendered frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StepMode {
    /// Exactly one physics step and controller tick per rendered frame.
    PerFrame,
    /// Fixed-rate steps drained from a time accumulator, capped per frame.
    Fixed { hz: f64, max_steps: u32 },
}

impl Default for StepMode {
    fn default() -> Self {
        StepMode::Fixed {
            hz: 60.0,
            max_steps: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub step_mode: StepMode,
    pub gravity: [f32; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_mode: StepMode::default(),
            gravity: [0.0, -9.81, 0.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub character_model: PathBuf,
    pub environment_model: PathBuf,
    pub water_vertex_shader: PathBuf,
    pub water_fragment_shader: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            character_model: PathBuf::from("assets/models/character/character.glb"),
            environment_model: PathBuf::from("assets/models/environment/environment.glb"),
            water_vertex_shader: PathBuf::from("assets/shaders/water.vert.glsl"),
            water_fragment_shader: PathBuf::from("assets/shaders/water.frag.glsl"),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::from_ron(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Parse a config from RON text.
    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(data)?)
    }

    /// Reject tunables that would break the controller or camera invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        for (name, value) in [("rotation_lerp", cam.rotation_lerp), ("position_lerp", cam.position_lerp)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "camera.{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if !(cam.min_zoom > 0.0 && cam.min_zoom <= cam.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "camera zoom range [{}, {}] is empty or non-positive",
                cam.min_zoom, cam.max_zoom
            )));
        }
        let ctl = &self.controller;
        if ctl.capsule_radius <= 0.0 || ctl.capsule_half_height < 0.0 {
            return Err(ConfigError::Invalid("character capsule dimensions must be positive".into()));
        }
        if ctl.ground_ray_length <= 0.0 {
            return Err(ConfigError::Invalid("controller.ground_ray_length must be positive".into()));
        }
        if ctl.buoyancy_coefficient < 0.0 {
            return Err(ConfigError::Invalid("controller.buoyancy_coefficient must not be negative".into()));
        }
        if let StepMode::Fixed { hz, max_steps } = self.simulation.step_mode {
            if !(hz > 0.0) || max_steps == 0 {
                return Err(ConfigError::Invalid(format!(
                    "fixed step mode needs hz > 0 and max_steps > 0, got {hz} Hz / {max_steps}"
                )));
            }
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_ron_keeps_other_defaults() {
        let config = GameConfig::from_ron("(camera: (min_zoom: 0.8), water: (level: 1.5))").unwrap();
        assert_eq!(config.camera.min_zoom, 0.8);
        assert_eq!(config.camera.max_zoom, 3.0);
        assert_eq!(config.water.level, 1.5);
        assert_eq!(config.controller.move_speed, 5.0);
    }

    #[test]
    fn step_mode_parses() {
        let config = GameConfig::from_ron("(simulation: (step_mode: PerFrame))").unwrap();
        assert_eq!(config.simulation.step_mode, StepMode::PerFrame);
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let mut config = GameConfig::default();
        config.camera.min_zoom = 4.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn lerp_factor_outside_unit_interval_is_rejected() {
        let mut config = GameConfig::default();
        config.camera.rotation_lerp = 1.5;
        assert!(config.validate().is_err());
        config.camera.rotation_lerp = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        assert!(matches!(GameConfig::from_ron("(camera: "), Err(ConfigError::Parse(_))));
    }
}

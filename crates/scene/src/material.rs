//! Materials and named shader uniforms.

use crate::error::SceneError;
use bytemuck::{Pod, Zeroable};
use engine_core::TransformRaw;
use glam::{Mat4, Vec2};

/// Elapsed-time uniform, advanced by the frame loop.
pub const UNIFORM_GLOBAL_TIME: &str = "iGlobalTime";
/// Viewport size in pixels.
pub const UNIFORM_RESOLUTION: &str = "iResolution";
pub const UNIFORM_MODEL: &str = "modelMatrix";
pub const UNIFORM_VIEW: &str = "viewMatrix";
pub const UNIFORM_PROJECTION: &str = "projectionMatrix";

/// Shader source that can be either embedded at compile time or loaded at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    /// Embedded fallback source.
    Embedded(&'static str),
    /// Runtime-loaded shader source.
    Runtime(String),
}

impl ShaderSource {
    /// Get the shader source as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShaderSource::Embedded(s) => s,
            ShaderSource::Runtime(s) => s.as_str(),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ShaderSource::Embedded(_))
    }
}

/// A value assignable to a named uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Mat4(Mat4),
}

/// Uniform block shared by the custom shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub model: TransformRaw,
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub global_time: f32,
    pub _pad: f32,
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self {
            model: TransformRaw {
                model: Mat4::IDENTITY.to_cols_array_2d(),
            },
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            resolution: [1.0, 1.0],
            global_time: 0.0,
            _pad: 0.0,
        }
    }
}

/// Custom shader material with named uniform slots.
#[derive(Debug, Clone)]
pub struct ShaderMaterial {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
    uniforms: ShaderUniforms,
}

impl ShaderMaterial {
    pub fn new(vertex: ShaderSource, fragment: ShaderSource) -> Self {
        Self {
            vertex,
            fragment,
            uniforms: ShaderUniforms::default(),
        }
    }

    /// Swap in new sources, keeping uniform values.
    pub fn replace_sources(&mut self, vertex: ShaderSource, fragment: ShaderSource) {
        self.vertex = vertex;
        self.fragment = fragment;
    }

    /// Raw uniform block for upload.
    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    /// Assign a uniform by name.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), SceneError> {
        let mismatch = |expected| SceneError::UniformType {
            name: name.to_string(),
            expected,
        };
        match (name, value) {
            (UNIFORM_GLOBAL_TIME, UniformValue::Float(t)) => self.uniforms.global_time = t,
            (UNIFORM_GLOBAL_TIME, _) => return Err(mismatch("float")),
            (UNIFORM_RESOLUTION, UniformValue::Vec2(r)) => self.uniforms.resolution = r.into(),
            (UNIFORM_RESOLUTION, _) => return Err(mismatch("vec2")),
            (UNIFORM_MODEL, UniformValue::Mat4(m)) => self.uniforms.model.model = m.to_cols_array_2d(),
            (UNIFORM_VIEW, UniformValue::Mat4(m)) => self.uniforms.view = m.to_cols_array_2d(),
            (UNIFORM_PROJECTION, UniformValue::Mat4(m)) => {
                self.uniforms.projection = m.to_cols_array_2d()
            }
            (UNIFORM_MODEL | UNIFORM_VIEW | UNIFORM_PROJECTION, _) => return Err(mismatch("mat4")),
            _ => return Err(SceneError::UnknownUniform(name.to_string())),
        }
        Ok(())
    }

    /// Read a float uniform by name.
    pub fn float(&self, name: &str) -> Option<f32> {
        (name == UNIFORM_GLOBAL_TIME).then_some(self.uniforms.global_time)
    }

    /// Read a vec2 uniform by name.
    pub fn vec2(&self, name: &str) -> Option<Vec2> {
        (name == UNIFORM_RESOLUTION).then(|| Vec2::from(self.uniforms.resolution))
    }
}

/// Lit surface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
}

impl StandardMaterial {
    /// Material from a 0xRRGGBB color with default roughness.
    pub fn from_hex(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xFF) as f32 / 255.0;
        Self {
            color: [channel(16), channel(8), channel(0)],
            roughness: 1.0,
            metalness: 0.0,
        }
    }

    pub fn with_surface(mut self, roughness: f32, metalness: f32) -> Self {
        self.roughness = roughness;
        self.metalness = metalness;
        self
    }
}

/// Material attached to a mesh node.
#[derive(Debug, Clone)]
pub enum Material {
    Standard(StandardMaterial),
    Shader(ShaderMaterial),
}

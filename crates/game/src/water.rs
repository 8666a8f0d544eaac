//! Animated water surface.

use crate::config::WaterConfig;
use engine_core::{Vec2, Vec3};
use scene::{
    Camera, Material, MeshData, NodeDesc, NodeId, Scene, SceneError, ShaderMaterial, ShaderPair, UniformValue,
    UNIFORM_GLOBAL_TIME, UNIFORM_MODEL, UNIFORM_RESOLUTION,
};

/// Name of the water node in the scene.
pub const WATER_NODE: &str = "water";

/// Typed handle to the water node, resolved once at creation.
pub struct Water {
    node: NodeId,
    time: f32,
    time_step: f32,
}

impl Water {
    /// Spawn the water plane at the water level using `shaders` (usually the fallback pair
    /// until the runtime sources arrive).
    pub fn spawn(
        scene: &mut Scene,
        config: &WaterConfig,
        shaders: ShaderPair,
        resolution: (u32, u32),
    ) -> Result<Self, SceneError> {
        let mesh = scene.add_mesh(MeshData::grid(config.size, config.size, config.segments));
        let material = ShaderMaterial::new(shaders.vertex, shaders.fragment);
        let node = scene.spawn(
            NodeDesc::new(mesh, Material::Shader(material))
                .named(WATER_NODE)
                .at(Vec3::new(0.0, config.level, 0.0)),
        );

        let mut water = Self {
            node,
            time: 0.0,
            time_step: config.time_step,
        };
        water.set_resolution(scene, resolution.0, resolution.1)?;
        Ok(water)
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance `iGlobalTime` by one frame.
    pub fn advance(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.time += self.time_step;
        let time = self.time;
        scene.with_shader_material(self.node, |m| m.set(UNIFORM_GLOBAL_TIME, UniformValue::Float(time)))?
    }

    pub fn set_resolution(&mut self, scene: &mut Scene, width: u32, height: u32) -> Result<(), SceneError> {
        let resolution = Vec2::new(width as f32, height as f32);
        scene.with_shader_material(self.node, |m| m.set(UNIFORM_RESOLUTION, UniformValue::Vec2(resolution)))?
    }

    /// Model, view and projection matrices for this frame.
    pub fn sync_matrices(&self, scene: &mut Scene, camera: &Camera) -> Result<(), SceneError> {
        let model = scene
            .transform(self.node)
            .ok_or(SceneError::NodeNotFound)?
            .to_matrix();
        scene.with_shader_material(self.node, |m| {
            m.set(UNIFORM_MODEL, UniformValue::Mat4(model))?;
            camera.write_uniforms(m)
        })?
    }

    /// Swap in runtime shader sources. Uniform values carry over.
    pub fn replace_shaders(&mut self, scene: &mut Scene, shaders: ShaderPair) -> Result<(), SceneError> {
        scene.with_shader_material(self.node, |m| m.replace_sources(shaders.vertex, shaders.fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::ShaderSource;

    fn water(scene: &mut Scene) -> Water {
        Water::spawn(scene, &WaterConfig::default(), ShaderPair::fallback(), (800, 600)).unwrap()
    }

    #[test]
    fn time_advances_per_frame() {
        let mut scene = Scene::new();
        let mut water = water(&mut scene);
        for _ in 0..10 {
            water.advance(&mut scene).unwrap();
        }
        let t = scene
            .with_shader_material(water.node(), |m| m.float(UNIFORM_GLOBAL_TIME))
            .unwrap()
            .unwrap();
        assert!((t - 0.1).abs() < 1e-5);
    }

    #[test]
    fn resolution_tracks_resize() {
        let mut scene = Scene::new();
        let mut water = water(&mut scene);
        let initial = scene
            .with_shader_material(water.node(), |m| m.vec2(UNIFORM_RESOLUTION))
            .unwrap();
        assert_eq!(initial, Some(Vec2::new(800.0, 600.0)));
        water.set_resolution(&mut scene, 1920, 1080).unwrap();
        let resized = scene
            .with_shader_material(water.node(), |m| m.vec2(UNIFORM_RESOLUTION))
            .unwrap();
        assert_eq!(resized, Some(Vec2::new(1920.0, 1080.0)));
    }

    #[test]
    fn runtime_shaders_keep_uniforms() {
        let mut scene = Scene::new();
        let mut water = water(&mut scene);
        water.advance(&mut scene).unwrap();
        water
            .replace_shaders(
                &mut scene,
                ShaderPair {
                    vertex: ShaderSource::Runtime("v".into()),
                    fragment: ShaderSource::Runtime("f".into()),
                },
            )
            .unwrap();
        let (fragment, time) = scene
            .with_shader_material(water.node(), |m| (m.fragment.clone(), m.float(UNIFORM_GLOBAL_TIME)))
            .unwrap();
        assert_eq!(fragment, ShaderSource::Runtime("f".into()));
        assert!(time.unwrap() > 0.0);
    }

    #[test]
    fn matrices_follow_node_and_camera() {
        let mut scene = Scene::new();
        let water = water(&mut scene);
        let mut camera = Camera::new(Vec3::new(0.0, 3.0, 6.0), Default::default());
        camera.transform.look_at(Vec3::ZERO, Vec3::Y);
        water.sync_matrices(&mut scene, &camera).unwrap();
        let uniforms = scene
            .with_shader_material(water.node(), |m| *m.uniforms())
            .unwrap();
        assert_eq!(uniforms.view, camera.view_matrix().to_cols_array_2d());
        let model = scene.transform(water.node()).unwrap().to_matrix();
        assert_eq!(uniforms.model.model, model.to_cols_array_2d());
    }

    #[test]
    fn water_sits_at_level() {
        let mut scene = Scene::new();
        let config = WaterConfig {
            level: 1.25,
            ..WaterConfig::default()
        };
        let water = Water::spawn(&mut scene, &config, ShaderPair::fallback(), (1, 1)).unwrap();
        assert_eq!(scene.transform(water.node()).unwrap().position.y, 1.25);
        assert_eq!(scene.find_by_name(WATER_NODE), Some(water.node()));
    }
}

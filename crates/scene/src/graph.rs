//! Scene graph: named mesh nodes stored in a hecs world.
//!
//! Nodes are flat (no parenting). A node is an entity carrying a [`Transform`],
//! a [`MeshInstance`] and a [`Material`]; names and shadow flags are optional.

use crate::error::SceneError;
use crate::material::{Material, ShaderMaterial};
use crate::mesh::MeshData;
use engine_core::{Quat, Transform, Vec3};
use hecs::{Entity, World};

/// Handle of a scene node.
pub type NodeId = Entity;

/// Index into the scene's mesh storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Links a node to the mesh it draws.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance {
    pub mesh: MeshId,
}

/// Lookup name of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

/// Shadow participation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shadows {
    pub cast: bool,
    pub receive: bool,
}

impl Shadows {
    pub const BOTH: Self = Self {
        cast: true,
        receive: true,
    };
    pub const CAST: Self = Self {
        cast: true,
        receive: false,
    };
    pub const RECEIVE: Self = Self {
        cast: false,
        receive: true,
    };
}

/// Light sources described as scene data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
        shadow: Option<ShadowConfig>,
    },
}

/// Orthographic shadow map settings for a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half-extent of the square shadow frustum.
    pub extent: f32,
}

/// Everything needed to spawn a mesh node.
#[derive(Debug, Clone)]
pub struct NodeDesc {
    pub name: Option<String>,
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Transform,
    pub shadows: Shadows,
}

impl NodeDesc {
    pub fn new(mesh: MeshId, material: Material) -> Self {
        Self {
            name: None,
            mesh,
            material,
            transform: Transform::default(),
            shadows: Shadows::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn shadows(mut self, shadows: Shadows) -> Self {
        self.shadows = shadows;
        self
    }
}

/// The live scene handed to the renderer each frame.
#[derive(Default)]
pub struct Scene {
    world: World,
    meshes: Vec<MeshData>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store mesh data and return its id.
    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0 as usize)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Add a mesh node.
    pub fn spawn(&mut self, desc: NodeDesc) -> NodeId {
        let entity = self.world.spawn((
            desc.transform,
            MeshInstance { mesh: desc.mesh },
            desc.material,
            desc.shadows,
        ));
        if let Some(name) = desc.name {
            // Entity was just spawned, insert cannot fail.
            let _ = self.world.insert_one(entity, Name(name));
        }
        entity
    }

    /// Remove a node. Returns false if it was already gone.
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.world.despawn(node).is_ok()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.world.contains(node)
    }

    pub fn node_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Find the first node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.world
            .query::<&Name>()
            .iter()
            .find(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity)
    }

    pub fn transform(&self, node: NodeId) -> Option<Transform> {
        self.world.get::<&Transform>(node).ok().map(|t| *t)
    }

    pub fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.update_transform(node, |t| *t = transform)
    }

    pub fn set_position(&mut self, node: NodeId, position: Vec3) -> Result<(), SceneError> {
        self.update_transform(node, |t| t.position = position)
    }

    pub fn set_scale(&mut self, node: NodeId, scale: Vec3) -> Result<(), SceneError> {
        self.update_transform(node, |t| t.scale = scale)
    }

    fn update_transform(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut Transform),
    ) -> Result<(), SceneError> {
        let mut transform = self
            .world
            .get::<&mut Transform>(node)
            .map_err(|_| SceneError::NodeNotFound)?;
        f(&mut transform);
        Ok(())
    }

    pub fn shadows(&self, node: NodeId) -> Option<Shadows> {
        self.world.get::<&Shadows>(node).ok().map(|s| *s)
    }

    /// Run `f` against the node's shader material.
    pub fn with_shader_material<R>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut ShaderMaterial) -> R,
    ) -> Result<R, SceneError> {
        let mut material = self
            .world
            .get::<&mut Material>(node)
            .map_err(|_| SceneError::NodeNotFound)?;
        match &mut *material {
            Material::Shader(shader) => Ok(f(shader)),
            Material::Standard(_) => Err(SceneError::NotAShaderMaterial),
        }
    }

    /// Iterate drawable nodes as (transform, mesh, material, shadows).
    pub fn for_each_node(&self, mut f: impl FnMut(NodeId, &Transform, MeshId, &Material, Shadows)) {
        for (entity, (transform, instance, material, shadows)) in self
            .world
            .query::<(&Transform, &MeshInstance, &Material, &Shadows)>()
            .iter()
        {
            f(entity, transform, instance.mesh, material, *shadows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{ShaderSource, StandardMaterial, UniformValue, UNIFORM_GLOBAL_TIME};

    fn standard() -> Material {
        Material::Standard(StandardMaterial::from_hex(0x808080))
    }

    #[test]
    fn spawn_find_and_remove() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(MeshData::plane(1.0, 1.0));
        let water = scene.spawn(NodeDesc::new(mesh, standard()).named("water"));
        scene.spawn(NodeDesc::new(mesh, standard()));

        assert_eq!(scene.find_by_name("water"), Some(water));
        assert_eq!(scene.find_by_name("lava"), None);
        assert_eq!(scene.node_count(), 2);

        assert!(scene.remove(water));
        assert!(!scene.remove(water));
        assert_eq!(scene.find_by_name("water"), None);
    }

    #[test]
    fn transform_setters_apply() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(MeshData::plane(1.0, 1.0));
        let node = scene.spawn(NodeDesc::new(mesh, standard()).at(Vec3::Y));
        scene.set_position(node, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        scene.set_scale(node, Vec3::splat(0.1)).unwrap();
        let t = scene.transform(node).unwrap();
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::splat(0.1));
    }

    #[test]
    fn operations_on_removed_node_fail() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(MeshData::plane(1.0, 1.0));
        let node = scene.spawn(NodeDesc::new(mesh, standard()));
        scene.remove(node);
        assert!(matches!(
            scene.set_position(node, Vec3::ZERO),
            Err(SceneError::NodeNotFound)
        ));
        assert!(scene.transform(node).is_none());
    }

    #[test]
    fn shader_material_access() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(MeshData::plane(1.0, 1.0));
        let shader = ShaderMaterial::new(ShaderSource::Embedded("v"), ShaderSource::Embedded("f"));
        let water = scene.spawn(NodeDesc::new(mesh, Material::Shader(shader)));
        let rock = scene.spawn(NodeDesc::new(mesh, standard()).shadows(Shadows::BOTH));

        scene
            .with_shader_material(water, |m| m.set(UNIFORM_GLOBAL_TIME, UniformValue::Float(2.0)))
            .unwrap()
            .unwrap();
        let t = scene
            .with_shader_material(water, |m| m.float(UNIFORM_GLOBAL_TIME))
            .unwrap();
        assert_eq!(t, Some(2.0));
        assert!(matches!(
            scene.with_shader_material(rock, |_| ()),
            Err(SceneError::NotAShaderMaterial)
        ));
        assert_eq!(scene.shadows(rock), Some(Shadows::BOTH));
    }

    #[test]
    fn for_each_node_visits_every_drawable() {
        let mut scene = Scene::new();
        let plane = scene.add_mesh(MeshData::plane(1.0, 1.0));
        let cube = scene.add_mesh(MeshData::cuboid(Vec3::ONE));
        scene.spawn(NodeDesc::new(plane, standard()));
        let rock = scene.spawn(NodeDesc::new(cube, standard()).at(Vec3::X).shadows(Shadows::CAST));

        let mut seen = Vec::new();
        scene.for_each_node(|id, transform, mesh, _, shadows| seen.push((id, transform.position, mesh, shadows)));
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&(rock, Vec3::X, cube, Shadows::CAST)));
    }
}

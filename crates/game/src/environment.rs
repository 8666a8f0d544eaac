//! Static level: ground, decorations, lights and the optional environment model.

use engine_core::{Quat, Vec3};
use physics::{ColliderDesc, ColliderHandle, PhysicsWorld, ShapeDesc};
use scene::{Light, Material, MeshData, NodeDesc, NodeId, Scene, ShadowConfig, Shadows, StandardMaterial};

/// Tree trunk positions on the XZ plane.
pub const TREES: [(f32, f32); 5] = [(-5.0, -5.0), (5.0, -7.0), (-7.0, 3.0), (8.0, 6.0), (-3.0, 8.0)];

/// Rocks as (x, z, radius).
pub const ROCKS: [(f32, f32, f32); 4] = [(-3.0, -2.0, 0.5), (4.0, 3.0, 0.7), (-6.0, 5.0, 0.4), (7.0, -4.0, 0.6)];

pub const GROUND_HEIGHT: f32 = -0.5;
const GROUND_HALF_EXTENTS: Vec3 = Vec3::new(50.0, 0.1, 50.0);
/// Stand-in collision volume for the loaded environment model.
const MODEL_HALF_EXTENTS: Vec3 = Vec3::new(5.0, 1.0, 5.0);

/// Handles to everything the level placed.
pub struct Environment {
    pub ground: NodeId,
    pub ground_collider: ColliderHandle,
    pub decorations: Vec<NodeId>,
    pub colliders: Vec<ColliderHandle>,
    /// Loaded environment model and its collider, once the background load finishes.
    pub model: Option<(NodeId, ColliderHandle)>,
}

impl Environment {
    /// Ground, trees and rocks. Always present, whether or not the model loads.
    pub fn build(scene: &mut Scene, physics: &mut PhysicsWorld) -> Self {
        let ground_mesh = scene.add_mesh(MeshData::plane(100.0, 100.0));
        let ground = scene.spawn(
            NodeDesc::new(
                ground_mesh,
                Material::Standard(StandardMaterial::from_hex(0x228B22).with_surface(0.8, 0.2)),
            )
            .named("ground")
            .at(Vec3::new(0.0, GROUND_HEIGHT, 0.0))
            .shadows(Shadows::RECEIVE),
        );
        let ground_collider = physics.add_static_collider(
            Vec3::new(0.0, GROUND_HEIGHT, 0.0),
            Quat::IDENTITY,
            &ColliderDesc::new(ShapeDesc::Cuboid {
                half_extents: GROUND_HALF_EXTENTS,
            })
            .friction(0.7),
        );

        let mut env = Self {
            ground,
            ground_collider,
            decorations: Vec::new(),
            colliders: Vec::new(),
            model: None,
        };
        env.add_trees(scene, physics);
        env.add_rocks(scene, physics);
        log::info!(
            "Basic environment ready: {} decorations, {} colliders",
            env.decorations.len(),
            env.colliders.len() + 1
        );
        env
    }

    fn add_trees(&mut self, scene: &mut Scene, physics: &mut PhysicsWorld) {
        let trunk_mesh = scene.add_mesh(MeshData::cylinder(0.2, 0.2, 1.5, 8));
        let crown_mesh = scene.add_mesh(MeshData::cone(1.0, 2.0, 8));
        let trunk_material = Material::Standard(StandardMaterial::from_hex(0x8B4513));
        let crown_material = Material::Standard(StandardMaterial::from_hex(0x006400));

        for (x, z) in TREES {
            self.decorations.push(scene.spawn(
                NodeDesc::new(trunk_mesh, trunk_material.clone())
                    .at(Vec3::new(x, 0.25, z))
                    .shadows(Shadows::BOTH),
            ));
            self.decorations.push(scene.spawn(
                NodeDesc::new(crown_mesh, crown_material.clone())
                    .at(Vec3::new(x, 1.5, z))
                    .shadows(Shadows::BOTH),
            ));
            self.colliders.push(physics.add_static_collider(
                Vec3::new(x, 0.0, z),
                Quat::IDENTITY,
                &ColliderDesc::new(ShapeDesc::Cylinder {
                    half_height: 0.75,
                    radius: 0.2,
                })
                .friction(0.8),
            ));
        }
    }

    fn add_rocks(&mut self, scene: &mut Scene, physics: &mut PhysicsWorld) {
        let material = Material::Standard(StandardMaterial::from_hex(0x808080).with_surface(0.9, 0.1));
        for (x, z, radius) in ROCKS {
            let mesh = scene.add_mesh(MeshData::sphere(radius, 8, 6));
            let center = Vec3::new(x, radius / 2.0, z);
            self.decorations.push(scene.spawn(
                NodeDesc::new(mesh, material.clone())
                    .at(center)
                    .shadows(Shadows::BOTH),
            ));
            self.colliders.push(physics.add_static_collider(
                center,
                Quat::IDENTITY,
                &ColliderDesc::new(ShapeDesc::Ball { radius }).friction(0.6),
            ));
        }
    }

    /// Add the loaded environment model at the origin with a box collider.
    /// A second call replaces the previous model.
    pub fn install_model(&mut self, scene: &mut Scene, physics: &mut PhysicsWorld, mesh: MeshData) -> NodeId {
        if let Some((node, collider)) = self.model.take() {
            scene.remove(node);
            physics.remove_collider(collider);
        }
        let mesh = scene.add_mesh(mesh);
        let node = scene.spawn(
            NodeDesc::new(mesh, Material::Standard(StandardMaterial::from_hex(0xFFFFFF)))
                .named("environment")
                .shadows(Shadows::BOTH),
        );
        let collider = physics.add_static_collider(
            Vec3::ZERO,
            Quat::IDENTITY,
            &ColliderDesc::new(ShapeDesc::Cuboid {
                half_extents: MODEL_HALF_EXTENTS,
            })
            .friction(0.7),
        );
        self.model = Some((node, collider));
        log::info!("Environment model installed");
        node
    }
}

/// Ambient fill plus a shadow-casting sun.
pub fn add_lights(scene: &mut Scene) {
    scene.add_light(Light::Ambient {
        color: [1.0, 1.0, 1.0],
        intensity: 0.5,
    });
    scene.add_light(Light::Directional {
        color: [1.0, 1.0, 1.0],
        intensity: 1.0,
        position: Vec3::new(5.0, 10.0, 7.5),
        shadow: Some(ShadowConfig {
            map_size: 2048,
            near: 0.5,
            far: 50.0,
            extent: 20.0,
        }),
    });
}

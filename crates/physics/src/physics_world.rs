//! Physics world management with Rapier3D.

use crate::collision::{CollisionGroup, PhysicsBody};
use engine_core::{Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Static,
}

/// Collider shape with shape-specific dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDesc {
    /// Y-aligned capsule: half-height of the cylindrical part plus cap radius.
    Capsule { half_height: f32, radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Y-aligned cylinder.
    Cylinder { half_height: f32, radius: f32 },
    Ball { radius: f32 },
}

/// Rigid-body descriptor.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub translation: Vec3,
    pub rotation: Quat,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Keep the body upright (characters).
    pub lock_rotations: bool,
}

impl BodyDesc {
    pub fn dynamic(translation: Vec3) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            translation,
            rotation: Quat::IDENTITY,
            linear_damping: 0.0,
            angular_damping: 0.0,
            lock_rotations: false,
        }
    }

    pub fn fixed(translation: Vec3) -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic(translation)
        }
    }

    pub fn damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn lock_rotations(mut self, lock: bool) -> Self {
        self.lock_rotations = lock;
        self
    }
}

/// Collider descriptor.
#[derive(Debug, Clone, Copy)]
pub struct ColliderDesc {
    pub shape: ShapeDesc,
    pub friction: f32,
    pub restitution: f32,
    pub groups: InteractionGroups,
}

impl ColliderDesc {
    /// Environment collider (collides with everything).
    pub fn new(shape: ShapeDesc) -> Self {
        Self {
            shape,
            friction: 0.5,
            restitution: 0.0,
            groups: CollisionGroup::interaction(CollisionGroup::environment()),
        }
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn groups(mut self, groups: (Group, Group)) -> Self {
        self.groups = CollisionGroup::interaction(groups);
        self
    }

    fn build(&self) -> ColliderBuilder {
        let builder = match self.shape {
            ShapeDesc::Capsule { half_height, radius } => ColliderBuilder::capsule_y(half_height, radius),
            ShapeDesc::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ShapeDesc::Cylinder { half_height, radius } => ColliderBuilder::cylinder(half_height, radius),
            ShapeDesc::Ball { radius } => ColliderBuilder::ball(radius),
        };
        builder
            .friction(self.friction)
            .restitution(self.restitution)
            .collision_groups(self.groups)
    }
}

fn isometry(translation: Vec3, rotation: Quat) -> Isometry3<Real> {
    Isometry3::from_parts(
        Translation3::new(translation.x, translation.y, translation.z),
        UnitQuaternion::from_quaternion(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z)),
    )
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    /// Create a new physics world with the given gravity vector.
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![gravity.x, gravity.y, gravity.z],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Set the integration timestep in seconds.
    pub fn set_timestep(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Step the physics simulation. Also refreshes the query pipeline.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for raycasting (needed after adding colliders before the first step).
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a rigid body from a descriptor and return its handle.
    pub fn add_body(&mut self, desc: &BodyDesc) -> RigidBodyHandle {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let mut builder = builder
            .position(isometry(desc.translation, desc.rotation))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping);
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        self.rigid_body_set.insert(builder.build())
    }

    /// Attach a collider to an existing body.
    pub fn add_collider(&mut self, body_handle: RigidBodyHandle, desc: &ColliderDesc) -> ColliderHandle {
        let collider = desc.build().build();
        self.collider_set.insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Create a body and its single collider in one go.
    pub fn spawn(&mut self, body: &BodyDesc, collider: &ColliderDesc) -> PhysicsBody {
        let rigid_body = self.add_body(body);
        let collider = self.add_collider(rigid_body, collider);
        PhysicsBody { rigid_body, collider }
    }

    /// Add a parentless collider fixed in the world (static level geometry).
    pub fn add_static_collider(&mut self, translation: Vec3, rotation: Quat, desc: &ColliderDesc) -> ColliderHandle {
        let collider = desc.build().position(isometry(translation, rotation)).build();
        self.collider_set.insert(collider)
    }

    /// Current translation of a rigid body, or `None` if the handle is stale.
    pub fn body_translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    /// Linear velocity of a rigid body.
    pub fn body_linvel(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let v = body.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    /// Apply an impulse to a dynamic body. Returns false if the handle is stale.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3, wake_up: bool) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], wake_up);
                true
            }
            None => false,
        }
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground(world: &mut PhysicsWorld) {
        let desc = ColliderDesc::new(ShapeDesc::Cuboid {
            half_extents: Vec3::new(50.0, 0.1, 50.0),
        });
        world.add_static_collider(Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, &desc);
    }

    #[test]
    fn dynamic_body_falls_under_gravity() {
        let mut world = PhysicsWorld::new();
        let body = world.add_body(&BodyDesc::dynamic(Vec3::new(0.0, 10.0, 0.0)));
        world.add_collider(body, &ColliderDesc::new(ShapeDesc::Ball { radius: 0.5 }));
        for _ in 0..10 {
            world.step();
        }
        let y = world.body_translation(body).unwrap().y;
        assert!(y < 10.0);
    }

    #[test]
    fn capsule_comes_to_rest_on_ground() {
        let mut world = PhysicsWorld::new();
        ground(&mut world);
        let body = world.spawn(
            &BodyDesc::dynamic(Vec3::new(0.0, 2.0, 0.0)).lock_rotations(true),
            &ColliderDesc::new(ShapeDesc::Capsule { half_height: 0.5, radius: 0.5 }),
        );
        for _ in 0..240 {
            world.step();
        }
        // Ground top is at -0.4, capsule center sits 1.0 above its foot.
        let y = world.body_translation(body.rigid_body).unwrap().y;
        assert!((y - 0.6).abs() < 0.05, "resting height was {y}");
    }

    #[test]
    fn impulse_changes_velocity() {
        let mut world = PhysicsWorld::with_gravity(Vec3::ZERO);
        let body = world.spawn(
            &BodyDesc::dynamic(Vec3::ZERO),
            &ColliderDesc::new(ShapeDesc::Ball { radius: 0.5 }),
        );
        world.step();
        assert!(world.apply_impulse(body.rigid_body, Vec3::new(5.0, 0.0, 0.0), true));
        world.step();
        let v = world.body_linvel(body.rigid_body).unwrap();
        assert!(v.x > 0.0);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut world = PhysicsWorld::new();
        let body = world.add_body(&BodyDesc::dynamic(Vec3::ZERO));
        world.remove_body(body);
        assert!(world.body_translation(body).is_none());
        assert!(!world.apply_impulse(body, Vec3::Y, true));
    }
}

//! Physics-driven third-person locomotion.
//!
//! The controller never writes the body position. Each tick it reads the body
//! translation, classifies the motion state from it, and feeds impulses back into
//! the physics world. Facing and swim phase are cosmetic and only drive the mesh.

use crate::config::{ControllerConfig, WaterConfig};
use engine_core::{Quat, Transform, Vec3};
use input::MovementFlags;
use physics::{BodyDesc, ColliderDesc, CollisionGroup, PhysicsBody, PhysicsWorld, RayFilter, ShapeDesc};

/// Mutually exclusive locomotion state, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Grounded,
    Airborne,
    Submerged,
}

/// Horizontal movement direction for the held keys, relative to the camera heading.
///
/// Each active key contributes its unit axis (forward -Z, backward +Z, left -X, right +X)
/// rotated by `yaw` about +Y. The sum is normalized, so opposing keys cancel to zero.
pub fn movement_direction(flags: MovementFlags, yaw: f32) -> Vec3 {
    let mut local = Vec3::ZERO;
    if flags.forward {
        local += Vec3::NEG_Z;
    }
    if flags.backward {
        local += Vec3::Z;
    }
    if flags.left {
        local += Vec3::NEG_X;
    }
    if flags.right {
        local += Vec3::X;
    }
    let dir = Quat::from_rotation_y(yaw) * local;
    if dir.length_squared() > 0.0 {
        dir.normalize()
    } else {
        Vec3::ZERO
    }
}

/// Upward impulse proportional to depth below the water surface; zero at or above it.
pub fn buoyancy_impulse(y: f32, water_level: f32, coefficient: f32) -> f32 {
    ((water_level - y) * coefficient).max(0.0)
}

/// Classify from a position and a ground probe result. Water wins over everything.
pub fn classify(y: f32, water: &WaterConfig, ground_hit: impl FnOnce() -> bool) -> MotionState {
    if y < water.level + water.submerge_margin {
        MotionState::Submerged
    } else if ground_hit() {
        MotionState::Grounded
    } else {
        MotionState::Airborne
    }
}

/// What a tick did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// State the impulses were computed for.
    pub classified: MotionState,
    /// Total impulse handed to the physics world.
    pub impulse: Vec3,
    pub jumped: bool,
}

/// The player character: a dynamic capsule plus cosmetic state for its mesh.
pub struct CharacterController {
    pub body: PhysicsBody,
    pub facing_angle: f32,
    pub motion_state: MotionState,
    pub swim_phase: f32,
    settings: ControllerConfig,
    water: WaterConfig,
    /// Body positions before and after the latest tick, for render interpolation.
    previous_position: Vec3,
    current_position: Vec3,
}

impl CharacterController {
    /// Create the character body and collider at the configured spawn point.
    pub fn spawn(world: &mut PhysicsWorld, settings: &ControllerConfig, water: &WaterConfig) -> Self {
        let spawn = settings.spawn();
        let body_desc = BodyDesc::dynamic(spawn)
            .damping(settings.linear_damping, settings.angular_damping)
            .lock_rotations(settings.lock_rotations);
        let collider_desc = ColliderDesc::new(ShapeDesc::Capsule {
            half_height: settings.capsule_half_height,
            radius: settings.capsule_radius,
        })
        .friction(settings.friction)
        .restitution(settings.restitution)
        .groups(CollisionGroup::character());
        let body = world.spawn(&body_desc, &collider_desc);
        log::debug!("Character body spawned at {:?}", spawn);

        Self {
            body,
            facing_angle: 0.0,
            motion_state: MotionState::Airborne,
            swim_phase: 0.0,
            settings: settings.clone(),
            water: water.clone(),
            previous_position: spawn,
            current_position: spawn,
        }
    }

    /// Run one locomotion tick. `view_yaw` is the camera heading movement is relative to.
    /// Returns `None` without touching anything if the body no longer exists.
    pub fn tick(&mut self, world: &mut PhysicsWorld, flags: MovementFlags, view_yaw: f32) -> Option<TickOutcome> {
        let handle = self.body.rigid_body;
        let position = world.body_translation(handle)?;
        self.previous_position = self.current_position;
        self.current_position = position;

        let ray_length = self.settings.ground_ray_length;
        let state = classify(position.y, &self.water, || {
            world
                .cast_ray(position, Vec3::NEG_Y, ray_length, true, &RayFilter::ground_probe(handle))
                .is_some()
        });
        if state != self.motion_state {
            log::debug!("Character {:?} -> {:?} at y = {:.2}", self.motion_state, state, position.y);
        }
        self.motion_state = state;

        let dir = movement_direction(flags, view_yaw);
        let mut jumped = false;
        let impulse = match state {
            MotionState::Submerged => {
                self.swim_phase += self.settings.swim_phase_step;
                let ascend = if flags.ascend { self.settings.ascend_rate } else { 0.0 };
                let buoyancy =
                    buoyancy_impulse(position.y, self.water.level, self.settings.buoyancy_coefficient);
                dir * self.settings.swim_speed + Vec3::Y * (ascend + buoyancy)
            }
            MotionState::Grounded | MotionState::Airborne => {
                let mut impulse = Vec3::new(dir.x, 0.0, dir.z) * self.settings.move_speed;
                if state == MotionState::Grounded && flags.ascend {
                    impulse.y += self.settings.jump_force;
                    self.motion_state = MotionState::Airborne;
                    jumped = true;
                    log::debug!("Jump from y = {:.2}", position.y);
                }
                impulse
            }
        };

        if impulse != Vec3::ZERO {
            world.apply_impulse(handle, impulse, true);
        }
        if dir != Vec3::ZERO {
            self.facing_angle = dir.x.atan2(dir.z);
        }
        log::trace!("Tick {:?}: impulse {:?}", state, impulse);

        Some(TickOutcome {
            classified: state,
            impulse,
            jumped,
        })
    }

    /// Body position at the latest tick.
    pub fn position(&self) -> Vec3 {
        self.current_position
    }

    /// Position blended between the last two ticks.
    pub fn interpolated_position(&self, alpha: f32) -> Vec3 {
        self.previous_position.lerp(self.current_position, alpha.clamp(0.0, 1.0))
    }

    /// Vertical offset of the swim bob; zero unless submerged.
    pub fn swim_bob(&self) -> f32 {
        if self.motion_state == MotionState::Submerged {
            self.swim_phase.sin() * 0.1
        } else {
            0.0
        }
    }

    /// Transform for the visual mesh: body position, facing yaw and swim bob.
    /// `base` carries the model's own rotation and scale.
    pub fn mesh_transform(&self, alpha: f32, base: &Transform) -> Transform {
        let mut position = self.interpolated_position(alpha);
        position.y += self.swim_bob();
        Transform {
            position,
            rotation: Quat::from_rotation_y(self.facing_angle) * base.rotation,
            scale: base.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn flags(f: impl FnOnce(&mut MovementFlags)) -> MovementFlags {
        let mut flags = MovementFlags::default();
        f(&mut flags);
        flags
    }

    /// World with a ground slab whose top face is at y = -0.4.
    fn world_with_ground() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        let ground = ColliderDesc::new(ShapeDesc::Cuboid {
            half_extents: Vec3::new(50.0, 0.1, 50.0),
        });
        world.add_static_collider(Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, &ground);
        world
    }

    fn spawn_at(world: &mut PhysicsWorld, y: f32) -> CharacterController {
        let settings = ControllerConfig {
            spawn_position: [0.0, y, 0.0],
            ..ControllerConfig::default()
        };
        let character = CharacterController::spawn(world, &settings, &WaterConfig::default());
        world.update_query_pipeline();
        character
    }

    #[test]
    fn direction_is_unit_or_zero() {
        let all = [
            flags(|f| f.forward = true),
            flags(|f| {
                f.forward = true;
                f.right = true;
            }),
            flags(|f| {
                f.backward = true;
                f.left = true;
                f.right = true;
            }),
        ];
        for yaw in [0.0, 0.7, -2.5, 3.1] {
            for set in all {
                assert!((movement_direction(set, yaw).length() - 1.0).abs() < EPS);
            }
            assert_eq!(movement_direction(MovementFlags::default(), yaw), Vec3::ZERO);
        }
    }

    #[test]
    fn opposing_keys_cancel() {
        let set = flags(|f| {
            f.forward = true;
            f.backward = true;
        });
        assert_eq!(movement_direction(set, 1.0), Vec3::ZERO);
    }

    #[test]
    fn forward_at_zero_yaw_is_negative_z() {
        let dir = movement_direction(flags(|f| f.forward = true), 0.0);
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).length() < EPS);
    }

    #[test]
    fn yaw_rotates_forward_counter_clockwise() {
        let dir = movement_direction(flags(|f| f.forward = true), FRAC_PI_2);
        assert!((dir - Vec3::new(-1.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn buoyancy_is_zero_above_water_and_proportional_below() {
        assert_eq!(buoyancy_impulse(0.0, 0.0, 2.0), 0.0);
        assert_eq!(buoyancy_impulse(1.0, 0.0, 2.0), 0.0);
        assert!((buoyancy_impulse(-0.25, 0.0, 2.0) - 0.5).abs() < EPS);
        assert!((buoyancy_impulse(-0.5, 0.0, 2.0) - 2.0 * buoyancy_impulse(-0.25, 0.0, 2.0)).abs() < EPS);
    }

    #[test]
    fn shallow_body_is_submerged_before_ground_check() {
        let water = WaterConfig::default();
        let state = classify(-0.2, &water, || panic!("ground probe must not run"));
        assert_eq!(state, MotionState::Submerged);
        assert_eq!(classify(0.49, &water, || true), MotionState::Submerged);
        assert_eq!(classify(0.5, &water, || true), MotionState::Grounded);
        assert_eq!(classify(0.5, &water, || false), MotionState::Airborne);
    }

    #[test]
    fn starts_airborne() {
        let mut world = world_with_ground();
        let character = spawn_at(&mut world, 2.0);
        assert_eq!(character.motion_state, MotionState::Airborne);
    }

    #[test]
    fn forward_on_ground_applies_move_impulse() {
        let mut world = world_with_ground();
        // Capsule bottom rests on the ground top (y = -0.4) when its center is at 0.6.
        let mut character = spawn_at(&mut world, 0.6);
        let outcome = character
            .tick(&mut world, flags(|f| f.forward = true), 0.0)
            .unwrap();
        assert_eq!(outcome.classified, MotionState::Grounded);
        assert!((outcome.impulse - Vec3::new(0.0, 0.0, -5.0)).length() < EPS);
        assert!(!outcome.jumped);
        assert!((character.facing_angle - std::f32::consts::PI).abs() < EPS);
    }

    #[test]
    fn jump_from_ground_goes_airborne_within_the_tick() {
        let mut world = world_with_ground();
        let mut character = spawn_at(&mut world, 0.6);
        // One step so rapier has computed the capsule's mass.
        world.step();
        let outcome = character
            .tick(&mut world, flags(|f| f.ascend = true), 0.0)
            .unwrap();
        assert!(outcome.jumped);
        assert_eq!(outcome.classified, MotionState::Grounded);
        assert!((outcome.impulse.y - 10.0).abs() < EPS);
        assert_eq!(character.motion_state, MotionState::Airborne);

        world.step();
        let vy = world.body_linvel(character.body.rigid_body).unwrap().y;
        assert!(vy > 0.0);
    }

    #[test]
    fn no_jump_while_airborne() {
        let mut world = world_with_ground();
        let mut character = spawn_at(&mut world, 5.0);
        let outcome = character
            .tick(&mut world, flags(|f| f.ascend = true), 0.0)
            .unwrap();
        assert_eq!(outcome.classified, MotionState::Airborne);
        assert!(!outcome.jumped);
        assert_eq!(outcome.impulse, Vec3::ZERO);
    }

    #[test]
    fn ground_probe_ignores_own_capsule() {
        // Without any ground the probe starts inside the character's own collider
        // and must still miss.
        let mut world = PhysicsWorld::new();
        let mut character = spawn_at(&mut world, 0.6);
        let outcome = character.tick(&mut world, MovementFlags::default(), 0.0).unwrap();
        assert_eq!(outcome.classified, MotionState::Airborne);
    }

    #[test]
    fn submerged_swims_with_buoyancy_and_never_jumps() {
        let mut world = PhysicsWorld::new();
        let mut character = spawn_at(&mut world, -1.0);
        let outcome = character
            .tick(
                &mut world,
                flags(|f| {
                    f.forward = true;
                    f.ascend = true;
                }),
                0.0,
            )
            .unwrap();
        assert_eq!(outcome.classified, MotionState::Submerged);
        assert!(!outcome.jumped);
        // swim 2 forward, ascend 3 + buoyancy (0 - -1) * 2
        assert!((outcome.impulse - Vec3::new(0.0, 5.0, -2.0)).length() < EPS);
        assert_eq!(character.motion_state, MotionState::Submerged);
        assert!(character.swim_phase > 0.0);
    }

    #[test]
    fn facing_kept_without_horizontal_input() {
        let mut world = world_with_ground();
        let mut character = spawn_at(&mut world, 0.6);
        character.tick(&mut world, flags(|f| f.right = true), 0.0).unwrap();
        let facing = character.facing_angle;
        assert!((facing - FRAC_PI_2).abs() < EPS);
        character.tick(&mut world, MovementFlags::default(), 0.0).unwrap();
        assert_eq!(character.facing_angle, facing);
    }

    #[test]
    fn removed_body_makes_tick_a_no_op() {
        let mut world = world_with_ground();
        let mut character = spawn_at(&mut world, 0.6);
        world.remove_body(character.body.rigid_body);
        assert!(character.tick(&mut world, flags(|f| f.forward = true), 0.0).is_none());
        assert_eq!(character.motion_state, MotionState::Airborne);
    }

    #[test]
    fn mesh_follows_interpolated_body() {
        let mut world = world_with_ground();
        let mut character = spawn_at(&mut world, 2.0);
        for _ in 0..5 {
            world.step();
            character.tick(&mut world, MovementFlags::default(), 0.0);
        }
        let before = character.interpolated_position(0.0);
        let after = character.interpolated_position(1.0);
        assert_eq!(after, character.position());
        assert!(after.y < before.y);
        let halfway = character.mesh_transform(0.5, &Transform::default());
        assert!((halfway.position.y - (before.y + after.y) * 0.5).abs() < EPS);
    }
}

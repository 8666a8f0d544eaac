//! Raycasting for ground probes and queries.

use crate::collision::CollisionGroup;
use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

/// Which colliders a ray may report.
#[derive(Debug, Clone, Copy)]
pub struct RayFilter {
    pub groups: InteractionGroups,
    /// Body whose colliders are skipped (usually the caster itself).
    pub exclude_body: Option<RigidBodyHandle>,
}

impl Default for RayFilter {
    fn default() -> Self {
        Self {
            groups: InteractionGroups::all(),
            exclude_body: None,
        }
    }
}

impl RayFilter {
    /// Filter for a character probing the ground below itself.
    pub fn ground_probe(body: RigidBodyHandle) -> Self {
        Self {
            groups: CollisionGroup::interaction(CollisionGroup::ground_probe()),
            exclude_body: Some(body),
        }
    }

    fn query_filter(&self) -> QueryFilter<'static> {
        let filter = QueryFilter::default().groups(self.groups);
        match self.exclude_body {
            Some(body) => filter.exclude_rigid_body(body),
            None => filter,
        }
    }
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit accepted by `filter`.
    /// `solid` controls whether a ray starting inside a shape hits it at distance zero.
    pub fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        solid: bool,
        filter: &RayFilter,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                solid,
                filter.query_filter(),
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    /// Cast a solid ray against every collider and return the first hit.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        self.cast_ray(origin, direction, max_distance, true, &RayFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BodyDesc, ColliderDesc, ShapeDesc};
    use engine_core::Quat;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        let floor = ColliderDesc::new(ShapeDesc::Cuboid {
            half_extents: Vec3::new(10.0, 0.1, 10.0),
        });
        world.add_static_collider(Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, &floor);
        world.update_query_pipeline();
        world
    }

    #[test]
    fn downward_ray_hits_floor_within_range() {
        let world = world_with_floor();
        let hit = world.raycast(Vec3::new(0.0, 0.5, 0.0), -Vec3::Y, 2.0).unwrap();
        assert!((hit.distance - 0.9).abs() < 1e-3);
        assert!((hit.normal - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn ray_shorter_than_gap_misses() {
        let world = world_with_floor();
        assert!(world.raycast(Vec3::new(0.0, 0.5, 0.0), -Vec3::Y, 0.5).is_none());
    }

    #[test]
    fn ground_probe_skips_own_body() {
        let mut world = world_with_floor();
        let body = world.spawn(
            &BodyDesc::dynamic(Vec3::new(0.0, 1.0, 0.0)),
            &ColliderDesc::new(ShapeDesc::Capsule { half_height: 0.5, radius: 0.5 })
                .groups(CollisionGroup::character()),
        );
        world.update_query_pipeline();

        // An unfiltered solid ray starts inside the capsule and hits it immediately.
        let unfiltered = world.raycast(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.1).unwrap();
        assert_eq!(unfiltered.distance, 0.0);

        let filter = RayFilter::ground_probe(body.rigid_body);
        let hit = world.cast_ray(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 2.0, true, &filter);
        assert!((hit.unwrap().distance - 1.4).abs() < 1e-3);
    }
}

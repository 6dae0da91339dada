use glam::Vec3;
use hecs::{Entity, World};

use crate::components::{BodyMode, Collider, Held, Pickupable, Transform};

pub struct RaycastHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec3,
}

/// Cast a ray against every pickupable dynamic body, returning the nearest
/// hit within `max_distance`. Bodies already held are skipped.
pub fn raycast_pickupable(
    world: &World,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<RaycastHit> {
    let dir = direction.normalize();
    let mut best: Option<RaycastHit> = None;

    for (entity, (_pickup, transform, collider, mode, held)) in world
        .query::<(&Pickupable, &Transform, &Collider, &BodyMode, Option<&Held>)>()
        .iter()
    {
        if *mode != BodyMode::Dynamic || held.is_some() {
            continue;
        }

        let t = match collider {
            Collider::Sphere { radius } => {
                ray_sphere_intersection(origin, dir, transform.position, *radius)
            }
            // Oriented boxes are tested against their axis-aligned bounds;
            // close enough for a grab reticle.
            Collider::Box { half_extents } => {
                ray_aabb_intersection(origin, dir, transform.position, *half_extents)
            }
            Collider::Plane { .. } => None,
        };

        if let Some(t) = t {
            if t > 0.0 && t <= max_distance {
                let is_closer = best.as_ref().map_or(true, |b| t < b.distance);
                if is_closer {
                    best = Some(RaycastHit {
                        entity,
                        distance: t,
                        point: origin + dir * t,
                    });
                }
            }
        }
    }

    best
}

fn ray_sphere_intersection(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = dir.dot(dir);
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}

fn ray_aabb_intersection(origin: Vec3, dir: Vec3, center: Vec3, half: Vec3) -> Option<f32> {
    let min = center - half;
    let max = center + half;
    let inv_dir = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);

    let t1 = (min.x - origin.x) * inv_dir.x;
    let t2 = (max.x - origin.x) * inv_dir.x;
    let t3 = (min.y - origin.y) * inv_dir.y;
    let t4 = (max.y - origin.y) * inv_dir.y;
    let t5 = (min.z - origin.z) * inv_dir.z;
    let t6 = (max.z - origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }
    // tmin < 0 means the ray starts inside the box.
    Some(if tmin < 0.0 { tmax } else { tmin })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Velocity;
    use crate::physics::materials::Surface;

    #[test]
    fn nearest_pickupable_wins() {
        let mut world = World::new();
        let near = world.spawn((
            Pickupable,
            Transform::new(Vec3::new(0.0, 0.0, -2.0)),
            Velocity::default(),
            Collider::cuboid(Vec3::splat(0.4)),
            BodyMode::Dynamic,
            Surface::Crate,
        ));
        world.spawn((
            Pickupable,
            Transform::new(Vec3::new(0.0, 0.0, -3.5)),
            Velocity::default(),
            Collider::cuboid(Vec3::splat(0.4)),
            BodyMode::Dynamic,
            Surface::Crate,
        ));

        let hit = raycast_pickupable(&world, Vec3::ZERO, Vec3::NEG_Z, 4.0).unwrap();
        assert_eq!(hit.entity, near);
        assert!((hit.distance - 1.6).abs() < 1e-4);
    }

    #[test]
    fn held_and_out_of_range_bodies_are_skipped() {
        let mut world = World::new();
        world.spawn((
            Pickupable,
            Transform::new(Vec3::new(0.0, 0.0, -2.0)),
            Velocity::default(),
            Collider::sphere(0.3),
            BodyMode::Dynamic,
            Surface::Crate,
            Held,
        ));
        world.spawn((
            Pickupable,
            Transform::new(Vec3::new(0.0, 0.0, -9.0)),
            Velocity::default(),
            Collider::sphere(0.3),
            BodyMode::Dynamic,
            Surface::Crate,
        ));
        assert!(raycast_pickupable(&world, Vec3::ZERO, Vec3::NEG_Z, 4.0).is_none());
    }
}

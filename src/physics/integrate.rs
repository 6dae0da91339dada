use glam::{Quat, Vec3};
use hecs::World;

use crate::components::{AngularVelocity, BodyMode, Damping, Held, Transform, Velocity};

/// Semi-implicit Euler step over every free dynamic body: accelerate, damp,
/// then advance position and orientation with the new velocities. Static and
/// kinematic bodies are never touched here; held bodies are driven by the
/// carry system instead.
pub(super) fn integrate(world: &mut World, gravity: Vec3, dt: f32) {
    for (_entity, (transform, vel, ang_vel, mode, damping, held)) in world.query_mut::<(
        &mut Transform,
        &mut Velocity,
        Option<&mut AngularVelocity>,
        &BodyMode,
        Option<&Damping>,
        Option<&Held>,
    )>() {
        if *mode != BodyMode::Dynamic || held.is_some() {
            continue;
        }

        vel.0 += gravity * dt;
        if let Some(d) = damping {
            vel.0 *= (1.0 - d.linear * dt).max(0.0);
        }
        transform.position += vel.0 * dt;

        if let Some(ang) = ang_vel {
            if let Some(d) = damping {
                ang.0 *= (1.0 - d.angular * dt).max(0.0);
            }
            if ang.0.length_squared() > 1e-12 {
                transform.rotation = (Quat::from_scaled_axis(ang.0 * dt) * transform.rotation)
                    .normalize();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Collider, Mass};
    use crate::physics::materials::Surface;

    const DT: f32 = 1.0 / 60.0;
    const GRAVITY: Vec3 = Vec3::new(0.0, -20.0, 0.0);

    #[test]
    fn dynamic_body_falls() {
        let mut world = World::new();
        let body = world.spawn((
            Transform::new(Vec3::new(0.0, 5.0, 0.0)),
            Velocity::default(),
            Mass(1.0),
            Collider::sphere(0.5),
            BodyMode::Dynamic,
            Surface::Ball,
        ));
        integrate(&mut world, GRAVITY, DT);
        let transform = *world.get::<&Transform>(body).unwrap();
        assert!(transform.position.y < 5.0);
    }

    #[test]
    fn static_and_kinematic_bodies_never_move() {
        let mut world = World::new();
        let floor = world.spawn((
            Transform::new(Vec3::new(0.0, -0.5, 0.0)),
            Velocity::default(),
            Collider::cuboid(Vec3::new(10.0, 0.5, 10.0)),
            BodyMode::Static,
            Surface::Ground,
        ));
        let hand = world.spawn((
            Transform::new(Vec3::new(0.0, 2.0, -2.5)),
            Velocity::default(),
            BodyMode::Kinematic,
        ));
        for _ in 0..120 {
            integrate(&mut world, GRAVITY, DT);
        }
        assert_eq!(world.get::<&Transform>(floor).unwrap().position.y, -0.5);
        assert_eq!(world.get::<&Transform>(hand).unwrap().position.y, 2.0);
    }

    #[test]
    fn held_body_is_skipped() {
        let mut world = World::new();
        let carried = world.spawn((
            Transform::new(Vec3::new(0.0, 2.0, 0.0)),
            Velocity(Vec3::new(0.0, -3.0, 0.0)),
            BodyMode::Dynamic,
            Held,
        ));
        integrate(&mut world, GRAVITY, DT);
        assert_eq!(world.get::<&Transform>(carried).unwrap().position.y, 2.0);
    }

    #[test]
    fn angular_velocity_rotates_body() {
        let mut world = World::new();
        let body = world.spawn((
            Transform::new(Vec3::ZERO),
            Velocity::default(),
            AngularVelocity(Vec3::new(0.0, std::f32::consts::PI, 0.0)),
            BodyMode::Dynamic,
        ));
        integrate(&mut world, Vec3::ZERO, DT);
        let rotation = world.get::<&Transform>(body).unwrap().rotation;
        assert!(rotation.angle_between(Quat::IDENTITY) > 1e-3);
    }
}

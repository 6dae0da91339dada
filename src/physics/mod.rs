//! Rigid-body simulation: a `hecs` world of bodies stepped at a fixed
//! timestep, with impulse-based contact response driven by a symmetric
//! material table.

pub mod materials;
pub mod raycast;

mod collision;
mod integrate;

use glam::Vec3;
use hecs::{Entity, World};
use log::{debug, trace};

use materials::ContactTable;

pub struct PhysicsWorld {
    pub bodies: World,
    gravity: Vec3,
    materials: ContactTable,
    accumulator: f32,
}

impl PhysicsWorld {
    /// Gravity and the contact-material table are fixed for the lifetime of
    /// the world.
    pub fn new(gravity: Vec3, materials: ContactTable) -> Self {
        Self {
            bodies: World::new(),
            gravity,
            materials,
            accumulator: 0.0,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Despawn a body. Removing an already-removed (or never-spawned) body
    /// is a benign no-op; room teardown and minigame teardown may race over
    /// the same handles.
    pub fn remove_body(&mut self, entity: Entity) {
        if self.bodies.despawn(entity).is_err() {
            debug!("remove_body: {entity:?} already gone");
        }
    }

    /// Advance the simulation by `wall_dt` seconds of wall time, running at
    /// most `max_substeps` fixed `fixed_dt` substeps. Leftover time stays in
    /// the accumulator; when the frame ran long the surplus is clamped away
    /// instead of spiraling.
    pub fn step(&mut self, fixed_dt: f32, wall_dt: f32, max_substeps: u32) {
        self.accumulator += wall_dt;
        let mut substeps = 0;
        while self.accumulator >= fixed_dt && substeps < max_substeps {
            integrate::integrate(&mut self.bodies, self.gravity, fixed_dt);
            let contacts = collision::collide(&mut self.bodies, &self.materials, fixed_dt);
            trace!("substep: {contacts} contacts");
            self.accumulator -= fixed_dt;
            substeps += 1;
        }
        if self.accumulator >= fixed_dt {
            self.accumulator = fixed_dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BodyMode, Collider, Mass, Transform, Velocity};
    use materials::Surface;

    const FIXED_DT: f32 = 1.0 / 60.0;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(Vec3::new(0.0, -20.0, 0.0), ContactTable::standard())
    }

    #[test]
    fn remove_body_twice_is_a_noop() {
        let mut physics = world();
        let body = physics.bodies.spawn((
            Transform::new(Vec3::new(0.0, 1.0, 0.0)),
            Velocity::default(),
            Mass(1.0),
            Collider::sphere(0.2),
            BodyMode::Dynamic,
            Surface::Ball,
        ));
        assert_eq!(physics.bodies.len(), 1);
        physics.remove_body(body);
        physics.remove_body(body);
        assert_eq!(physics.bodies.len(), 0);
    }

    #[test]
    fn removed_body_stops_simulating() {
        let mut physics = world();
        let body = physics.bodies.spawn((
            Transform::new(Vec3::new(0.0, 5.0, 0.0)),
            Velocity::default(),
            Mass(1.0),
            Collider::sphere(0.2),
            BodyMode::Dynamic,
            Surface::Ball,
        ));
        physics.remove_body(body);
        physics.step(FIXED_DT, FIXED_DT, 3);
        assert!(physics.bodies.get::<&Transform>(body).is_err());
    }

    #[test]
    fn substeps_are_capped() {
        let mut physics = world();
        let body = physics.bodies.spawn((
            Transform::new(Vec3::new(0.0, 100.0, 0.0)),
            Velocity::default(),
            Mass(1.0),
            Collider::sphere(0.2),
            BodyMode::Dynamic,
            Surface::Ball,
        ));
        // A one-second frame spike must not run sixty substeps.
        physics.step(FIXED_DT, 1.0, 3);
        let y = physics.bodies.get::<&Transform>(body).unwrap().position.y;
        let three_substeps = 100.0 - 20.0 * (FIXED_DT * FIXED_DT) * (1.0 + 2.0 + 3.0);
        assert!((y - three_substeps).abs() < 1e-3, "y after spike {y}");
    }
}

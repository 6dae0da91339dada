use glam::Vec3;
use hecs::Entity;
use log::info;

use crate::components::{
    AngularVelocity, BodyMode, Collider, Mass, Pickupable, Transform, Velocity,
};
use crate::config::{ConfigError, RoomConfig, RoomId};
use crate::physics::materials::Surface;
use crate::physics::PhysicsWorld;

const WALL_THICKNESS: f32 = 0.5;
const ZONE_WALL_THICKNESS: f32 = 0.1;

/// Owns every body spawned for the active room and guarantees they all die
/// together on the next activation. Handles in the list are dead after
/// teardown and must not be reused.
pub struct RoomPhysics {
    spawned: Vec<Entity>,
}

impl RoomPhysics {
    pub fn new() -> Self {
        Self {
            spawned: Vec::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.spawned.len()
    }

    /// Despawn everything this manager built.
    pub fn teardown(&mut self, physics: &mut PhysicsWorld) {
        for entity in self.spawned.drain(..) {
            physics.remove_body(entity);
        }
    }

    /// Tear down the previous room and build `config`: floor, ceiling, four
    /// walls, zone containment walls where configured, and the hub's
    /// carryable crate. Validation runs before teardown, so a bad config
    /// leaves the current room standing.
    pub fn activate(
        &mut self,
        physics: &mut PhysicsWorld,
        config: &RoomConfig,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        self.teardown(physics);

        let half_w = config.size.width / 2.0;
        let half_h = config.size.height / 2.0;
        let half_d = config.size.depth / 2.0;

        let floor_half = Vec3::new(half_w, 0.5, half_d);
        self.spawn_static(
            physics,
            Vec3::new(0.0, -0.5, 0.0),
            floor_half,
            Surface::Ground,
        );
        self.spawn_static(
            physics,
            Vec3::new(0.0, config.size.height + 0.5, 0.0),
            floor_half,
            Surface::Wall,
        );

        let ns_half = Vec3::new(half_w, half_h, WALL_THICKNESS / 2.0);
        let ew_half = Vec3::new(WALL_THICKNESS / 2.0, half_h, half_d);
        for (position, half) in [
            (Vec3::new(0.0, half_h, -half_d - WALL_THICKNESS / 2.0), ns_half),
            (Vec3::new(0.0, half_h, half_d + WALL_THICKNESS / 2.0), ns_half),
            (Vec3::new(half_w + WALL_THICKNESS / 2.0, half_h, 0.0), ew_half),
            (Vec3::new(-half_w - WALL_THICKNESS / 2.0, half_h, 0.0), ew_half),
        ] {
            self.spawn_static(physics, position, half, Surface::Wall);
        }

        if let Some(zone) = &config.zone {
            if zone.wall_height > 0.0 {
                let half_height = zone.wall_height / 2.0;
                let ns = Vec3::new(zone.size.x / 2.0, half_height, ZONE_WALL_THICKNESS / 2.0);
                let ew = Vec3::new(ZONE_WALL_THICKNESS / 2.0, half_height, zone.size.z / 2.0);
                for (position, half) in [
                    (
                        Vec3::new(zone.center.x, half_height, zone.center.z - zone.size.z / 2.0),
                        ns,
                    ),
                    (
                        Vec3::new(zone.center.x, half_height, zone.center.z + zone.size.z / 2.0),
                        ns,
                    ),
                    (
                        Vec3::new(zone.center.x + zone.size.x / 2.0, half_height, zone.center.z),
                        ew,
                    ),
                    (
                        Vec3::new(zone.center.x - zone.size.x / 2.0, half_height, zone.center.z),
                        ew,
                    ),
                ] {
                    self.spawn_static(physics, position, half, Surface::Wall);
                }
            }
        }

        if config.id == RoomId::Hub {
            let crate_body = physics.bodies.spawn((
                Transform::new(Vec3::new(3.0, 2.0, -3.0)),
                Velocity::default(),
                AngularVelocity::default(),
                Mass(5.0),
                Collider::cuboid(Vec3::splat(0.4)),
                BodyMode::Dynamic,
                Surface::Crate,
                Pickupable,
            ));
            self.spawned.push(crate_body);
        }

        info!(
            "room {:?} active, {} bodies",
            config.id,
            self.spawned.len()
        );
        Ok(())
    }

    fn spawn_static(
        &mut self,
        physics: &mut PhysicsWorld,
        position: Vec3,
        half_extents: Vec3,
        surface: Surface,
    ) {
        let entity = physics.bodies.spawn((
            Transform::new(position),
            Collider::cuboid(half_extents),
            BodyMode::Static,
            surface,
        ));
        self.spawned.push(entity);
    }
}

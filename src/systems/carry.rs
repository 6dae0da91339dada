use glam::Vec3;
use hecs::Entity;
use log::debug;

use crate::camera::Camera;
use crate::components::{AngularVelocity, BodyMode, Held, Transform, Velocity};
use crate::physics::raycast::raycast_pickupable;
use crate::physics::PhysicsWorld;

/// Max reach of the grab raycast from the eye.
const GRAB_DISTANCE: f32 = 4.0;
/// Carried bodies hang this far in front of the camera, eye-relative.
const HAND_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -2.5);

/// Grab, hold, and release logic for the single carryable slot.
///
/// A grabbed body goes kinematic with a `Held` marker and is pinned to the
/// hand anchor every frame; the simulation ignores it entirely until
/// release, when it goes dynamic again seeded with the player's current
/// velocity so walking drops feel like tosses.
pub fn carry_system(
    physics: &mut PhysicsWorld,
    camera: &Camera,
    player: Entity,
    hand: Entity,
    carried: &mut Option<Entity>,
    grab_held: bool,
    grab_pressed: bool,
) {
    let hand_position = camera.position + camera.rotation() * HAND_OFFSET;
    if let Ok(mut transform) = physics.bodies.get::<&mut Transform>(hand) {
        transform.position = hand_position;
        transform.rotation = camera.rotation();
    }

    match *carried {
        None => {
            if !grab_pressed {
                return;
            }
            let Some(hit) =
                raycast_pickupable(&physics.bodies, camera.position, camera.front(), GRAB_DISTANCE)
            else {
                return;
            };
            if let Ok(mut mode) = physics.bodies.get::<&mut BodyMode>(hit.entity) {
                *mode = BodyMode::Kinematic;
            }
            if let Ok(mut vel) = physics.bodies.get::<&mut Velocity>(hit.entity) {
                vel.0 = Vec3::ZERO;
            }
            if let Ok(mut ang) = physics.bodies.get::<&mut AngularVelocity>(hit.entity) {
                ang.0 = Vec3::ZERO;
            }
            let _ = physics.bodies.insert_one(hit.entity, Held);
            *carried = Some(hit.entity);
            debug!("grabbed {:?} at {:.2}m", hit.entity, hit.distance);
        }
        Some(held) => {
            if !physics.bodies.contains(held) {
                // Room teardown can despawn a carried body out from under us.
                *carried = None;
                return;
            }

            if !grab_held {
                let player_velocity = physics
                    .bodies
                    .get::<&Velocity>(player)
                    .map(|v| v.0)
                    .unwrap_or(Vec3::ZERO);
                if let Ok(mut mode) = physics.bodies.get::<&mut BodyMode>(held) {
                    *mode = BodyMode::Dynamic;
                }
                let _ = physics.bodies.remove_one::<Held>(held);
                if let Ok(mut vel) = physics.bodies.get::<&mut Velocity>(held) {
                    vel.0 = player_velocity;
                }
                if let Ok(mut ang) = physics.bodies.get::<&mut AngularVelocity>(held) {
                    ang.0 = Vec3::ZERO;
                }
                *carried = None;
                debug!("released {held:?}");
                return;
            }

            if let Ok(mut transform) = physics.bodies.get::<&mut Transform>(held) {
                transform.position = hand_position;
                transform.rotation = camera.rotation();
            }
            if let Ok(mut vel) = physics.bodies.get::<&mut Velocity>(held) {
                vel.0 = Vec3::ZERO;
            }
        }
    }
}

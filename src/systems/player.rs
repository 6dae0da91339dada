use hecs::Entity;
use log::debug;

use crate::camera::Camera;
use crate::components::{Transform, Velocity};
use crate::config::player::{JUMP_FORCE, MOVE_SPEED, SPAWN_HEIGHT, SPRINT_MULTIPLIER};
use crate::input::InputSnapshot;
use crate::physics::PhysicsWorld;

/// Grounded means moving vertically slower than this...
const GROUNDED_MAX_VY: f32 = 0.5;
/// ...while no higher than this above spawn height.
const GROUNDED_HEIGHT_SLACK: f32 = 0.2;

/// Overwrite the player's horizontal velocity from the latched input and the
/// camera yaw basis; vertical velocity stays with the integrator except for
/// jumps.
///
/// `can_jump` is the one-shot latch: it re-arms only when the jump key is
/// released, so holding space produces exactly one jump per press.
/// `suppress_jump` reroutes the key while the basketball throw is charging.
pub fn player_movement_system(
    physics: &mut PhysicsWorld,
    camera: &Camera,
    player: Entity,
    input: &InputSnapshot,
    can_jump: &mut bool,
    suppress_jump: bool,
) {
    let Ok(mut query) = physics
        .bodies
        .query_one::<(&Transform, &mut Velocity)>(player)
    else {
        return;
    };
    let Some((transform, vel)) = query.get() else {
        return;
    };

    let forward = camera.forward();
    let right = camera.right();
    let mut direction = glam::Vec3::ZERO;
    if input.forward {
        direction += forward;
    }
    if input.backward {
        direction -= forward;
    }
    if input.right {
        direction += right;
    }
    if input.left {
        direction -= right;
    }

    let speed = if input.sprint {
        MOVE_SPEED * SPRINT_MULTIPLIER
    } else {
        MOVE_SPEED
    };
    let horizontal = if direction.length_squared() > 0.0 {
        direction.normalize() * speed
    } else {
        glam::Vec3::ZERO
    };
    vel.0.x = horizontal.x;
    vel.0.z = horizontal.z;

    let grounded = vel.0.y.abs() < GROUNDED_MAX_VY
        && transform.position.y <= SPAWN_HEIGHT + GROUNDED_HEIGHT_SLACK;

    if input.jump && grounded && *can_jump && !suppress_jump {
        vel.0.y = JUMP_FORCE;
        *can_jump = false;
        debug!("jump from y={:.2}", transform.position.y);
    }
    if !input.jump {
        *can_jump = true;
    }
}

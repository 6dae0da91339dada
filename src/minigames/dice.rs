use glam::{EulerRot, Quat, Vec3};
use hecs::Entity;
use log::info;
use rand::Rng;

use crate::components::{
    AngularVelocity, BodyMode, Collider, Damping, Mass, Transform, Velocity,
};
use crate::config::ZoneConfig;
use crate::fsm::StateMachine;
use crate::physics::materials::Surface;
use crate::physics::PhysicsWorld;

const DIE_HALF_EXTENT: f32 = 0.25;
const DIE_MASS: f32 = 1.0;
/// A die has settled below this linear speed...
const SETTLE_LINEAR_SPEED: f32 = 0.1;
/// ...and this angular speed.
const SETTLE_ANGULAR_SPEED: f32 = 0.1;
/// A roll always resolves by this deadline, settled or not.
const MAX_ROLL_TIME: f32 = 5.0;
const DROP_HEIGHT: f32 = 2.5;

/// Local face normals and their pip values; opposite faces sum to 7.
const DICE_FACES: [(Vec3, u8); 6] = [
    (Vec3::Y, 1),
    (Vec3::NEG_Y, 6),
    (Vec3::X, 3),
    (Vec3::NEG_X, 4),
    (Vec3::Z, 2),
    (Vec3::NEG_Z, 5),
];

/// Which face of a die points up for a given orientation: the face whose
/// rotated normal has the largest dot with world up. Strict comparison, so
/// an exact tie keeps the earlier face in the table.
pub fn face_up(rotation: Quat) -> u8 {
    let mut best_dot = f32::NEG_INFINITY;
    let mut value = 1;
    for (normal, face_value) in DICE_FACES {
        let dot = (rotation * normal).dot(Vec3::Y);
        if dot > best_dot {
            best_dot = dot;
            value = face_value;
        }
    }
    value
}

#[derive(Clone, Copy, Debug)]
pub enum RollPhase {
    Idle,
    Rolling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiceOutcome {
    pub values: [u8; 2],
    pub total: u8,
}

/// Two physical dice confined to the zone tray. The game is passive until a
/// roll is requested; resolution is emitted from [`DiceGame::update`] as a
/// polled event, exactly once per roll.
pub struct DiceGame {
    machine: StateMachine<RollPhase>,
    dice: [Entity; 2],
    zone_center: Vec3,
    last_outcome: Option<DiceOutcome>,
}

impl DiceGame {
    /// Spawn the two dice resting in the tray.
    pub fn new(physics: &mut PhysicsWorld, zone: &ZoneConfig) -> Self {
        let offsets = [-0.6_f32, 0.6];
        let dice = offsets.map(|dx| {
            physics.bodies.spawn((
                Transform::new(zone.center + Vec3::new(dx, 0.5, 0.0)),
                Velocity::default(),
                AngularVelocity::default(),
                Mass(DIE_MASS),
                Damping {
                    linear: 0.01,
                    angular: 0.3,
                },
                Collider::cuboid(Vec3::splat(DIE_HALF_EXTENT)),
                BodyMode::Dynamic,
                Surface::Dice,
            ))
        });
        Self {
            machine: StateMachine::new(RollPhase::Idle),
            dice,
            zone_center: zone.center,
            last_outcome: None,
        }
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.machine.state, RollPhase::Rolling)
    }

    pub fn last_outcome(&self) -> Option<DiceOutcome> {
        self.last_outcome
    }

    /// Relaunch both dice above the tray with random spin. Ignored while a
    /// roll is already in progress.
    pub fn request_roll<R: Rng>(&mut self, physics: &mut PhysicsWorld, rng: &mut R) {
        if self.is_rolling() {
            return;
        }

        for (i, &die) in self.dice.iter().enumerate() {
            let dx = if i == 0 { -0.8 } else { 0.8 };
            if let Ok(mut transform) = physics.bodies.get::<&mut Transform>(die) {
                transform.position = self.zone_center + Vec3::new(dx, DROP_HEIGHT, 0.0);
                transform.rotation = Quat::from_euler(
                    EulerRot::XYZ,
                    rng.gen::<f32>() * std::f32::consts::TAU,
                    rng.gen::<f32>() * std::f32::consts::TAU,
                    rng.gen::<f32>() * std::f32::consts::TAU,
                );
            }
            if let Ok(mut vel) = physics.bodies.get::<&mut Velocity>(die) {
                vel.0 = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 5.0,
                    -5.0,
                    (rng.gen::<f32>() - 0.5) * 5.0,
                );
            }
            if let Ok(mut ang) = physics.bodies.get::<&mut AngularVelocity>(die) {
                ang.0 = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 20.0,
                    (rng.gen::<f32>() - 0.5) * 20.0,
                    (rng.gen::<f32>() - 0.5) * 20.0,
                );
            }
        }

        self.last_outcome = None;
        self.machine.force_go(RollPhase::Rolling);
        info!("dice roll started");
    }

    /// Poll the roll. Returns the outcome on the frame the roll resolves,
    /// either because both dice settled or because the roll timed out.
    pub fn update(&mut self, physics: &PhysicsWorld, dt: f32) -> Option<DiceOutcome> {
        if !self.is_rolling() {
            return None;
        }
        self.machine.tick(dt);

        let mut all_settled = true;
        let mut values = [1u8; 2];
        for (i, &die) in self.dice.iter().enumerate() {
            let speed = physics
                .bodies
                .get::<&Velocity>(die)
                .map(|v| v.0.length())
                .unwrap_or(0.0);
            let angular_speed = physics
                .bodies
                .get::<&AngularVelocity>(die)
                .map(|a| a.0.length())
                .unwrap_or(0.0);
            if speed > SETTLE_LINEAR_SPEED || angular_speed > SETTLE_ANGULAR_SPEED {
                all_settled = false;
            }
            if let Ok(transform) = physics.bodies.get::<&Transform>(die) {
                values[i] = face_up(transform.rotation);
            }
        }

        if !all_settled && self.machine.elapsed <= MAX_ROLL_TIME {
            return None;
        }

        let outcome = DiceOutcome {
            values,
            total: values[0] + values[1],
        };
        self.last_outcome = Some(outcome);
        self.machine.go(RollPhase::Idle);
        info!(
            "dice resolved: {} + {} = {}{}",
            values[0],
            values[1],
            outcome.total,
            if all_settled { "" } else { " (timeout)" }
        );
        Some(outcome)
    }

    /// Despawn the dice bodies. Called on room teardown.
    pub fn despawn(&mut self, physics: &mut PhysicsWorld) {
        for die in self.dice {
            physics.remove_body(die);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RoomConfig, RoomId, FIXED_DT, GRAVITY};
    use crate::physics::materials::ContactTable;
    use crate::room::RoomPhysics;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn face_table_opposites_sum_to_seven() {
        for (normal, value) in DICE_FACES {
            let opposite = DICE_FACES
                .iter()
                .find(|(n, _)| *n == -normal)
                .map(|(_, v)| *v)
                .unwrap();
            assert_eq!(value + opposite, 7);
        }
    }

    #[test]
    fn identity_orientation_reads_one() {
        assert_eq!(face_up(Quat::IDENTITY), 1);
    }

    #[test]
    fn quarter_turn_about_x_reads_five() {
        // Rotating +x by 90 degrees brings the -z face (5) up.
        let rotation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        assert_eq!(face_up(rotation), 5);
    }

    #[test]
    fn roll_resolves_within_the_deadline() {
        let mut physics = PhysicsWorld::new(GRAVITY, ContactTable::standard());
        let mut room = RoomPhysics::new();
        let config = RoomConfig::get(RoomId::Dice);
        room.activate(&mut physics, &config).unwrap();
        let zone = config.zone.unwrap();
        let mut game = DiceGame::new(&mut physics, &zone);
        let mut rng = StdRng::seed_from_u64(7);

        game.request_roll(&mut physics, &mut rng);
        assert!(game.is_rolling());

        let mut outcome = None;
        let mut elapsed = 0.0;
        while outcome.is_none() && elapsed < MAX_ROLL_TIME + 1.0 {
            physics.step(FIXED_DT, FIXED_DT, 3);
            outcome = game.update(&physics, FIXED_DT);
            elapsed += FIXED_DT;
        }

        let outcome = outcome.expect("roll must resolve by the deadline");
        assert!((1..=6).contains(&outcome.values[0]));
        assert!((1..=6).contains(&outcome.values[1]));
        assert_eq!(
            outcome.total,
            outcome.values[0] + outcome.values[1]
        );
        assert!(!game.is_rolling());
        assert_eq!(game.last_outcome(), Some(outcome));
    }

    #[test]
    fn roll_request_ignored_while_rolling() {
        let mut physics = PhysicsWorld::new(GRAVITY, ContactTable::standard());
        let zone = RoomConfig::get(RoomId::Dice).zone.unwrap();
        let mut game = DiceGame::new(&mut physics, &zone);
        let mut rng = StdRng::seed_from_u64(1);

        game.request_roll(&mut physics, &mut rng);
        game.update(&physics, FIXED_DT);
        let mid_roll_elapsed = game.machine.elapsed;
        game.request_roll(&mut physics, &mut rng);
        // A second request must not restart the clock.
        assert_eq!(game.machine.elapsed, mid_roll_elapsed);
    }

    #[test]
    fn stuck_dice_resolve_by_timeout() {
        let mut physics = PhysicsWorld::new(GRAVITY, ContactTable::standard());
        let zone = RoomConfig::get(RoomId::Dice).zone.unwrap();
        let mut game = DiceGame::new(&mut physics, &zone);
        let mut rng = StdRng::seed_from_u64(3);
        game.request_roll(&mut physics, &mut rng);

        // Never stepping the world keeps the launch velocities forever.
        let mut outcome = None;
        let mut frames = 0;
        while outcome.is_none() && frames < 60 * 8 {
            outcome = game.update(&physics, FIXED_DT);
            frames += 1;
        }
        assert!(outcome.is_some());
        assert!(frames as f32 * FIXED_DT <= MAX_ROLL_TIME + 0.1);
    }
}

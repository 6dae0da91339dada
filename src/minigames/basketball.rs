use glam::Vec3;
use hecs::Entity;
use log::info;
use rand::Rng;

use crate::camera::Camera;
use crate::components::{
    AngularVelocity, BodyMode, Collider, Damping, Mass, Transform, Velocity,
};
use crate::config::ZoneConfig;
use crate::fsm::StateMachine;
use crate::physics::materials::Surface;
use crate::physics::PhysicsWorld;

const BALL_RADIUS: f32 = 0.12;
const BALL_MASS: f32 = 0.6;
/// Max distance from the eye at which the racked ball can be picked up.
const PICKUP_DISTANCE: f32 = 3.0;
const RIM_HEIGHT: f32 = 3.05;
const RIM_RADIUS: f32 = 0.45;
const RIM_SEGMENTS: usize = 12;
const RIM_SEGMENT_RADIUS: f32 = 0.03;
/// Horizontal tolerance for a made basket around the rim center.
const SCORE_RADIUS: f32 = 0.35;
/// Throw power charge rate per second, capped at 100.
const CHARGE_RATE: f32 = 80.0;
const MAX_POWER: f32 = 100.0;
/// Launch speed spans [4, 10] m/s linearly with power.
const MIN_LAUNCH_SPEED: f32 = 4.0;
const MAX_LAUNCH_SPEED: f32 = 10.0;
/// Upward bias mixed into the camera direction before normalizing.
const THROW_UP_BIAS: f32 = 0.4;
const THROW_SPIN: f32 = 2.5;
/// The hand offset the held ball is pinned to, eye-relative.
const HOLD_OFFSET: Vec3 = Vec3::new(0.0, -0.3, -0.8);
/// Ball counts as down when within this height of the zone floor...
const GROUND_BAND: f32 = 0.3;
/// ...moving vertically slower than this...
const GROUND_MAX_VY: f32 = 0.5;
/// ...for this long without interruption.
const RESET_HOLD_TIME: f32 = 1.0;
/// Trajectory samples closer together than this are dropped.
const TRAJECTORY_MIN_STEP: f32 = 0.05;

#[derive(Clone, Copy, Debug)]
pub enum BallPhase {
    /// On the rack, waiting for a pickup.
    Racked,
    Held,
    Charging,
    InFlight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrowEvent {
    Scored,
    Missed,
}

/// Basketball court state: one ball, a backboard, and a rim built from a
/// ring of small static spheres so the ball can rattle in and out. A made
/// basket is a one-way crossing of the rim plane within the score radius,
/// checked at most once per throw.
pub struct BasketballGame {
    machine: StateMachine<BallPhase>,
    ball: Entity,
    hoop_bodies: Vec<Entity>,
    rack_position: Vec3,
    rim_center: Vec3,
    floor_y: f32,
    power: f32,
    last_ball_y: f32,
    scored_this_throw: bool,
    grounded_time: f32,
    trajectory: Vec<Vec3>,
    pub makes: u32,
    pub attempts: u32,
}

impl BasketballGame {
    pub fn new(physics: &mut PhysicsWorld, zone: &ZoneConfig) -> Self {
        let rack_position =
            zone.center + Vec3::new(0.0, 0.5, zone.size.z / 2.0 - 1.5);
        let hoop_base = zone.center + Vec3::new(0.0, 0.0, -zone.size.z / 2.0 + 0.5);
        let rim_center = hoop_base + Vec3::new(0.0, RIM_HEIGHT, 0.3);

        let mut hoop_bodies = Vec::with_capacity(RIM_SEGMENTS + 1);
        hoop_bodies.push(physics.bodies.spawn((
            Transform::new(hoop_base + Vec3::new(0.0, RIM_HEIGHT + 0.3, -0.1)),
            Collider::cuboid(Vec3::new(0.9, 0.6, 0.05)),
            BodyMode::Static,
            Surface::Wall,
        )));
        for i in 0..RIM_SEGMENTS {
            let angle = i as f32 / RIM_SEGMENTS as f32 * std::f32::consts::TAU;
            let offset = Vec3::new(angle.cos() * RIM_RADIUS, 0.0, angle.sin() * RIM_RADIUS);
            hoop_bodies.push(physics.bodies.spawn((
                Transform::new(rim_center + offset),
                Collider::sphere(RIM_SEGMENT_RADIUS),
                BodyMode::Static,
                Surface::Wall,
            )));
        }

        let ball = physics.bodies.spawn((
            Transform::new(rack_position),
            Velocity::default(),
            AngularVelocity::default(),
            Mass(BALL_MASS),
            Damping {
                linear: 0.1,
                angular: 0.3,
            },
            Collider::sphere(BALL_RADIUS),
            BodyMode::Dynamic,
            Surface::Ball,
        ));

        Self {
            machine: StateMachine::new(BallPhase::Racked),
            ball,
            hoop_bodies,
            rack_position,
            rim_center,
            floor_y: zone.center.y,
            power: 0.0,
            last_ball_y: rack_position.y,
            scored_this_throw: false,
            grounded_time: 0.0,
            trajectory: Vec::new(),
            makes: 0,
            attempts: 0,
        }
    }

    pub fn phase(&self) -> BallPhase {
        self.machine.state
    }

    pub fn holding_ball(&self) -> bool {
        matches!(self.machine.state, BallPhase::Held | BallPhase::Charging)
    }

    /// Charge fraction for the HUD power bar, 0..=1.
    pub fn power_fraction(&self) -> f32 {
        self.power / MAX_POWER
    }

    pub fn trajectory(&self) -> &[Vec3] {
        &self.trajectory
    }

    /// Pick the racked ball up if the eye is close enough. Returns whether
    /// the pickup happened.
    pub fn try_pickup(&mut self, physics: &PhysicsWorld, eye: Vec3) -> bool {
        if !matches!(self.machine.state, BallPhase::Racked) {
            return false;
        }
        let ball_position = match physics.bodies.get::<&Transform>(self.ball) {
            Ok(transform) => transform.position,
            Err(_) => return false,
        };
        if eye.distance(ball_position) > PICKUP_DISTANCE {
            return false;
        }
        self.machine.go(BallPhase::Held);
        info!("ball picked up");
        true
    }

    fn throw<R: Rng>(&mut self, physics: &mut PhysicsWorld, camera: &Camera, rng: &mut R) {
        let power = self.power.min(MAX_POWER);
        let speed =
            MIN_LAUNCH_SPEED + (MAX_LAUNCH_SPEED - MIN_LAUNCH_SPEED) * power / MAX_POWER;
        let direction = (camera.front() + Vec3::Y * THROW_UP_BIAS).normalize();

        let throw_position = camera.position + camera.rotation() * HOLD_OFFSET;
        if let Ok(mut transform) = physics.bodies.get::<&mut Transform>(self.ball) {
            transform.position = throw_position;
        }
        if let Ok(mut vel) = physics.bodies.get::<&mut Velocity>(self.ball) {
            vel.0 = direction * speed;
        }
        if let Ok(mut ang) = physics.bodies.get::<&mut AngularVelocity>(self.ball) {
            ang.0 = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 2.0 * THROW_SPIN,
                (rng.gen::<f32>() - 0.5) * 2.0 * THROW_SPIN,
                (rng.gen::<f32>() - 0.5) * 2.0 * THROW_SPIN,
            );
        }

        self.attempts += 1;
        self.scored_this_throw = false;
        self.grounded_time = 0.0;
        self.last_ball_y = throw_position.y;
        self.trajectory.clear();
        self.power = 0.0;
        self.machine.go(BallPhase::InFlight);
        info!("throw #{} at {speed:.1} m/s", self.attempts);
    }

    /// Per-frame update. `charge_held` is the state of the charge key (the
    /// jump key, rerouted while holding the ball). Returns the outcome event
    /// on the frame a throw concludes.
    pub fn update<R: Rng>(
        &mut self,
        physics: &mut PhysicsWorld,
        camera: &Camera,
        charge_held: bool,
        rng: &mut R,
        dt: f32,
    ) -> Option<ThrowEvent> {
        self.machine.tick(dt);
        match self.machine.state {
            BallPhase::Racked => None,
            BallPhase::Held => {
                self.pin_to_hand(physics, camera);
                if charge_held {
                    self.power = 0.0;
                    self.machine.go(BallPhase::Charging);
                }
                None
            }
            BallPhase::Charging => {
                self.pin_to_hand(physics, camera);
                self.power += CHARGE_RATE * dt;
                if !charge_held || self.power >= MAX_POWER {
                    self.throw(physics, camera, rng);
                }
                None
            }
            BallPhase::InFlight => self.update_flight(physics, dt),
        }
    }

    fn pin_to_hand(&mut self, physics: &mut PhysicsWorld, camera: &Camera) {
        let hold = camera.position + camera.rotation() * HOLD_OFFSET;
        if let Ok(mut transform) = physics.bodies.get::<&mut Transform>(self.ball) {
            transform.position = hold;
        }
        if let Ok(mut vel) = physics.bodies.get::<&mut Velocity>(self.ball) {
            vel.0 = Vec3::ZERO;
        }
    }

    fn update_flight(&mut self, physics: &mut PhysicsWorld, dt: f32) -> Option<ThrowEvent> {
        let (position, vy) = {
            let Ok(transform) = physics.bodies.get::<&Transform>(self.ball) else {
                return None;
            };
            let vy = physics
                .bodies
                .get::<&Velocity>(self.ball)
                .map(|v| v.0.y)
                .unwrap_or(0.0);
            (transform.position, vy)
        };

        if self
            .trajectory
            .last()
            .map_or(true, |last| last.distance(position) > TRAJECTORY_MIN_STEP)
        {
            self.trajectory.push(position);
        }

        let mut event = None;

        // One-way crossing of the rim plane, at most once per throw.
        if !self.scored_this_throw {
            let dx = position.x - self.rim_center.x;
            let dz = position.z - self.rim_center.z;
            let horizontal = (dx * dx + dz * dz).sqrt();
            if horizontal < SCORE_RADIUS
                && self.last_ball_y > self.rim_center.y
                && position.y < self.rim_center.y
            {
                self.scored_this_throw = true;
                self.makes += 1;
                event = Some(ThrowEvent::Scored);
                info!("basket! {}/{}", self.makes, self.attempts);
            }
        }
        self.last_ball_y = position.y;

        // Sustained ground contact puts the ball back on the rack; a throw
        // that never scored resolves as a miss at that moment.
        let on_ground = position.y < self.floor_y + GROUND_BAND && vy.abs() < GROUND_MAX_VY;
        if on_ground {
            self.grounded_time += dt;
            if self.grounded_time > RESET_HOLD_TIME {
                self.reset_ball(physics);
                if !self.scored_this_throw {
                    event = Some(ThrowEvent::Missed);
                }
                self.machine.go(BallPhase::Racked);
            }
        } else {
            self.grounded_time = 0.0;
        }

        event
    }

    fn reset_ball(&mut self, physics: &mut PhysicsWorld) {
        if let Ok(mut transform) = physics.bodies.get::<&mut Transform>(self.ball) {
            transform.position = self.rack_position;
            transform.rotation = glam::Quat::IDENTITY;
        }
        if let Ok(mut vel) = physics.bodies.get::<&mut Velocity>(self.ball) {
            vel.0 = Vec3::ZERO;
        }
        if let Ok(mut ang) = physics.bodies.get::<&mut AngularVelocity>(self.ball) {
            ang.0 = Vec3::ZERO;
        }
        self.grounded_time = 0.0;
        info!("ball racked");
    }

    /// Put a held or charging ball straight back on the rack without
    /// counting an attempt. Called when the player gives the game up while
    /// still holding the ball; a ball already in flight is left to finish.
    pub fn abort_hold(&mut self, physics: &mut PhysicsWorld) {
        if !self.holding_ball() {
            return;
        }
        self.power = 0.0;
        self.reset_ball(physics);
        self.machine.go(BallPhase::Racked);
    }

    /// Despawn the ball and hoop. Called on room teardown.
    pub fn despawn(&mut self, physics: &mut PhysicsWorld) {
        physics.remove_body(self.ball);
        for body in self.hoop_bodies.drain(..) {
            physics.remove_body(body);
        }
    }
}

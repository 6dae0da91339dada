use std::collections::HashSet;

use glam::{Quat, Vec3};
use hecs::Entity;
use log::{debug, info};
use thiserror::Error;

use crate::camera::Camera;
use crate::components::{BodyMode, Collider, Mass, Transform, Velocity};
use crate::config::{
    self, ConfigError, RoomConfig, RoomId, FIXED_DT, GRAVITY, MAX_SUBSTEPS,
    PORTAL_INTERACTION_DISTANCE,
};
use crate::economy::{EconomyError, EconomyGate, WagerOutcome, WagerTarget};
use crate::input::InputSnapshot;
use crate::minigames::basketball::BallPhase;
use crate::minigames::{
    BasketballGame, DiceGame, DiceOutcome, RewardColor, SequenceEvent, SequenceGame, ThrowEvent,
};
use crate::physics::materials::{ContactTable, Surface};
use crate::physics::PhysicsWorld;
use crate::room::RoomPhysics;
use crate::systems::{carry_system, player_movement_system};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// How close the eye must be to a zone center to engage its minigame.
fn zone_engage_distance(room: RoomId) -> f32 {
    match room {
        RoomId::Basketball => 8.0,
        _ => 6.0,
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not engaged at the {0:?} table")]
    NotAtTable(RoomId),
    #[error("no wager is open")]
    NoWager,
    #[error("a round is still in progress")]
    RoundInProgress,
    #[error(transparent)]
    Economy(#[from] EconomyError),
}

/// Where to persist the player position between runs. The core only ever
/// moves a plain position record across this boundary.
pub trait PositionStore {
    fn save(&mut self, position: Vec3);
    fn load(&self) -> Option<Vec3>;
}

impl PositionStore for Option<Vec3> {
    fn save(&mut self, position: Vec3) {
        *self = Some(position);
    }

    fn load(&self) -> Option<Vec3> {
        *self
    }
}

enum ActiveMinigame {
    Dice(DiceGame),
    Basketball(BasketballGame),
    Sequence(SequenceGame),
}

/// Read-only per-frame status for whatever front end is attached.
#[derive(Clone, Copy, Debug)]
pub struct Hud {
    pub balance: u32,
    pub room: RoomId,
    pub wager_open: bool,
    pub carrying: bool,
    pub minigame_focused: bool,
    pub dice_rolling: bool,
    pub last_roll: Option<DiceOutcome>,
    pub throw_power: Option<f32>,
    pub makes: u32,
    pub attempts: u32,
    pub sequence_progress: Option<(usize, usize)>,
    pub rewards: usize,
}

/// The whole game core behind one context object: physics, rooms, player,
/// minigames, and the wallet. One `frame` call advances everything in a
/// fixed order; all outward effects surface through the HUD, transform
/// lookups, and logged events.
pub struct Session {
    physics: PhysicsWorld,
    camera: Camera,
    room_physics: RoomPhysics,
    current_room: RoomId,
    player: Entity,
    hand: Entity,
    carried: Option<Entity>,
    can_jump: bool,
    prev_interact: bool,
    prev_grab: bool,
    teleport_target: Option<Vec3>,
    minigame: Option<ActiveMinigame>,
    focused: bool,
    economy: EconomyGate,
    rewards: HashSet<RewardColor>,
    rng: StdRng,
}

impl Session {
    pub fn new(seed: u64, starting_balance: u32) -> Result<Self, ConfigError> {
        let mut physics = PhysicsWorld::new(GRAVITY, ContactTable::standard());

        let spawn = RoomConfig::get(RoomId::Hub).spawn;
        // Fixed rotation: the player body carries no angular state.
        let player = physics.bodies.spawn((
            Transform::new(spawn),
            Velocity::default(),
            Mass(config::player::MASS),
            Collider::sphere(config::player::RADIUS),
            BodyMode::Dynamic,
            Surface::Player,
        ));
        // Collider-less kinematic anchor the carry system drives.
        let hand = physics
            .bodies
            .spawn((Transform::new(spawn), BodyMode::Kinematic));

        let mut camera = Camera::new(config::player::MOUSE_SENSITIVITY);
        camera.position = spawn + Vec3::Y * (config::player::EYE_HEIGHT - config::player::SPAWN_HEIGHT);

        let mut session = Self {
            physics,
            camera,
            room_physics: RoomPhysics::new(),
            current_room: RoomId::Hub,
            player,
            hand,
            carried: None,
            can_jump: true,
            prev_interact: false,
            prev_grab: false,
            teleport_target: None,
            minigame: None,
            focused: false,
            economy: EconomyGate::new(starting_balance),
            rewards: HashSet::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        session.enter_room(RoomId::Hub)?;
        Ok(session)
    }

    pub fn current_room(&self) -> RoomId {
        self.current_room
    }

    pub fn balance(&self) -> u32 {
        self.economy.balance()
    }

    pub fn rewards(&self) -> &HashSet<RewardColor> {
        &self.rewards
    }

    /// Presentation boundary: world transform of any live body.
    pub fn body_transform(&self, entity: Entity) -> Option<(Vec3, Quat)> {
        self.physics
            .bodies
            .get::<&Transform>(entity)
            .map(|t| (t.position, t.rotation))
            .ok()
    }

    pub fn player_position(&self) -> Vec3 {
        self.body_transform(self.player)
            .map(|(p, _)| p)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn hud(&self) -> Hud {
        let (dice_rolling, last_roll) = match &self.minigame {
            Some(ActiveMinigame::Dice(game)) => (game.is_rolling(), game.last_outcome()),
            _ => (false, None),
        };
        let (throw_power, makes, attempts) = match &self.minigame {
            Some(ActiveMinigame::Basketball(game)) => (
                game.holding_ball().then(|| game.power_fraction()),
                game.makes,
                game.attempts,
            ),
            _ => (None, 0, 0),
        };
        let sequence_progress = match &self.minigame {
            Some(ActiveMinigame::Sequence(game)) => Some(game.progress()),
            _ => None,
        };
        Hud {
            balance: self.economy.balance(),
            room: self.current_room,
            wager_open: self.economy.wager_open(),
            carrying: self.carried.is_some(),
            minigame_focused: self.focused,
            dice_rolling,
            last_roll,
            throw_power,
            makes,
            attempts,
            sequence_progress,
            rewards: self.rewards.len(),
        }
    }

    /// One-shot teleport within the current room, consumed on the next
    /// frame. No room change, no camera reset.
    pub fn set_teleport_target(&mut self, target: Vec3) {
        self.teleport_target = Some(target);
    }

    pub fn save_position(&self, store: &mut dyn PositionStore) {
        store.save(self.player_position());
        info!("position saved");
    }

    /// Loading behaves like a teleport: the move applies next frame with
    /// velocity zeroed.
    pub fn load_position(&mut self, store: &dyn PositionStore) {
        if let Some(position) = store.load() {
            self.set_teleport_target(position);
            info!("position loaded");
        }
    }

    /// Jump straight to a room, exactly as if the player had used a portal.
    pub fn teleport_to_room(&mut self, room: RoomId) -> Result<(), ConfigError> {
        self.enter_room(room)
    }

    /// Place the exact-total dice wager. Requires being engaged at the dice
    /// table with no roll underway: a stake placed after the dice are
    /// launched would ride on an outcome already in motion.
    pub fn place_dice_wager(&mut self, amount: u32, total: u8) -> Result<(), SessionError> {
        if self.current_room != RoomId::Dice || !self.focused {
            return Err(SessionError::NotAtTable(RoomId::Dice));
        }
        if let Some(ActiveMinigame::Dice(game)) = &self.minigame {
            if game.is_rolling() {
                return Err(SessionError::RoundInProgress);
            }
        }
        self.economy
            .place_wager(amount, WagerTarget::DiceTotal(total))?;
        Ok(())
    }

    /// Roll the dice. Requires an open wager and an idle table.
    pub fn request_roll(&mut self) -> Result<(), SessionError> {
        let Some(ActiveMinigame::Dice(game)) = &mut self.minigame else {
            return Err(SessionError::NotAtTable(RoomId::Dice));
        };
        if !self.focused {
            return Err(SessionError::NotAtTable(RoomId::Dice));
        }
        if !self.economy.wager_open() {
            return Err(SessionError::NoWager);
        }
        game.request_roll(&mut self.physics, &mut self.rng);
        Ok(())
    }

    /// Back the next basketball throw. Rejected while a ball is still in
    /// flight, for the same reason a mid-roll dice stake is.
    pub fn place_basketball_wager(&mut self, amount: u32) -> Result<(), SessionError> {
        if self.current_room != RoomId::Basketball || !self.focused {
            return Err(SessionError::NotAtTable(RoomId::Basketball));
        }
        if let Some(ActiveMinigame::Basketball(game)) = &self.minigame {
            if matches!(game.phase(), BallPhase::InFlight) {
                return Err(SessionError::RoundInProgress);
            }
        }
        self.economy
            .place_wager(amount, WagerTarget::BasketballMake)?;
        Ok(())
    }

    /// Press a sequence color button. Completion is applied immediately:
    /// the reward lands in the inventory and the game closes.
    pub fn sequence_press(&mut self, color: u8) -> Option<SequenceEvent> {
        let Some(ActiveMinigame::Sequence(game)) = &mut self.minigame else {
            return None;
        };
        let event = game.press(color)?;
        if let SequenceEvent::Completed(reward) = event {
            self.rewards.insert(reward);
            self.minigame = None;
            self.focused = false;
        }
        Some(event)
    }

    /// Give up on the engaged minigame: open wager refunded, a held ball
    /// racked, sequence game cancelled, focus released. Dice and basketball
    /// bodies stay; they belong to the room.
    pub fn quit_minigame(&mut self) {
        if !self.focused {
            return;
        }
        self.economy.refund();
        if let Some(ActiveMinigame::Basketball(game)) = &mut self.minigame {
            game.abort_hold(&mut self.physics);
        }
        if matches!(self.minigame, Some(ActiveMinigame::Sequence(_))) {
            if let Some(ActiveMinigame::Sequence(game)) = self.minigame.take() {
                let _ = game.close();
            }
        }
        self.focused = false;
        debug!("minigame disengaged");
    }

    /// Advance the whole session by one frame.
    pub fn frame(&mut self, input: &InputSnapshot, dt: f32) -> Result<(), ConfigError> {
        let interact_pressed = input.interact && !self.prev_interact;
        let grab_pressed = input.grab && !self.prev_grab;
        self.prev_interact = input.interact;
        self.prev_grab = input.grab;

        if let Some(target) = self.teleport_target.take() {
            self.apply_teleport(target);
        }

        // Dice and sequence engagement swallow look and movement the way a
        // betting overlay swallows the pointer; basketball stays in-world.
        let ui_frozen = self.focused
            && matches!(
                self.minigame,
                Some(ActiveMinigame::Dice(_)) | Some(ActiveMinigame::Sequence(_))
            );

        if input.pointer_locked && !ui_frozen {
            self.camera.look(input.mouse_dx, input.mouse_dy);
        }

        if input.pointer_locked {
            self.handle_interactions(interact_pressed, grab_pressed)?;
        }

        let holding_ball = matches!(
            &self.minigame,
            Some(ActiveMinigame::Basketball(game)) if game.holding_ball()
        );

        if input.pointer_locked && !ui_frozen {
            player_movement_system(
                &mut self.physics,
                &self.camera,
                self.player,
                input,
                &mut self.can_jump,
                holding_ball,
            );
        }

        if !self.focused {
            carry_system(
                &mut self.physics,
                &self.camera,
                self.player,
                self.hand,
                &mut self.carried,
                input.grab,
                grab_pressed && input.pointer_locked,
            );
        }

        self.physics.step(FIXED_DT, dt, MAX_SUBSTEPS);
        self.sync_camera();

        match &mut self.minigame {
            Some(ActiveMinigame::Dice(game)) => {
                if let Some(outcome) = game.update(&self.physics, dt) {
                    self.economy.resolve(WagerOutcome::DiceTotal(outcome.total));
                }
            }
            Some(ActiveMinigame::Basketball(game)) => {
                let charge_held = self.focused && input.jump;
                if let Some(event) =
                    game.update(&mut self.physics, &self.camera, charge_held, &mut self.rng, dt)
                {
                    let outcome = match event {
                        ThrowEvent::Scored => WagerOutcome::BasketballScored,
                        ThrowEvent::Missed => WagerOutcome::BasketballMissed,
                    };
                    self.economy.resolve(outcome);
                }
            }
            Some(ActiveMinigame::Sequence(game)) => {
                game.update(&mut self.rng, dt);
            }
            None => {}
        }

        Ok(())
    }

    fn handle_interactions(
        &mut self,
        interact_pressed: bool,
        grab_pressed: bool,
    ) -> Result<(), ConfigError> {
        let config = RoomConfig::get(self.current_room);

        if interact_pressed && !self.focused {
            for portal in &config.portals {
                if self.camera.position.distance(portal.position) < PORTAL_INTERACTION_DISTANCE {
                    self.enter_room(portal.target)?;
                    return Ok(());
                }
            }
        }

        if let Some(zone) = &config.zone {
            let near = self.camera.position.distance(zone.center)
                < zone_engage_distance(self.current_room);
            if self.focused && !near {
                // Walking away abandons the table.
                self.quit_minigame();
            } else if !self.focused && near && interact_pressed {
                self.engage_minigame();
            }
        }

        // Picking the ball up is a grab at the rack, gated on a backed
        // throw.
        if self.focused && grab_pressed && self.economy.wager_open() {
            let eye = self.camera.position;
            if let Some(ActiveMinigame::Basketball(game)) = &mut self.minigame {
                game.try_pickup(&self.physics, eye);
            }
        }

        Ok(())
    }

    fn engage_minigame(&mut self) {
        if self.current_room == RoomId::Sequence && self.minigame.is_none() {
            let reward = [RewardColor::Red, RewardColor::Blue, RewardColor::Green]
                .into_iter()
                .find(|color| !self.rewards.contains(color))
                .unwrap_or(RewardColor::Red);
            self.minigame = Some(ActiveMinigame::Sequence(SequenceGame::start(
                &mut self.rng,
                reward,
            )));
        }
        if self.minigame.is_some() {
            self.focused = true;
            info!("minigame engaged in {:?}", self.current_room);
        }
    }

    fn apply_teleport(&mut self, target: Vec3) {
        if let Ok(mut transform) = self.physics.bodies.get::<&mut Transform>(self.player) {
            transform.position = target;
        }
        if let Ok(mut vel) = self.physics.bodies.get::<&mut Velocity>(self.player) {
            vel.0 = Vec3::ZERO;
        }
        self.sync_camera();
        debug!("teleported to {target}");
    }

    fn sync_camera(&mut self) {
        let eye_offset = Vec3::Y * (config::player::EYE_HEIGHT - config::player::SPAWN_HEIGHT);
        self.camera.position = self.player_position() + eye_offset;
    }

    /// Switch rooms: refund any open wager, drop the engaged minigame and
    /// its bodies, rebuild the room, respawn the player, reset the camera.
    fn enter_room(&mut self, room: RoomId) -> Result<(), ConfigError> {
        let config = RoomConfig::get(room);
        config.validate()?;

        self.economy.refund();
        self.focused = false;
        if let Some(game) = self.minigame.take() {
            match game {
                ActiveMinigame::Dice(mut game) => game.despawn(&mut self.physics),
                ActiveMinigame::Basketball(mut game) => game.despawn(&mut self.physics),
                ActiveMinigame::Sequence(game) => {
                    let _ = game.close();
                }
            }
        }
        // A carried body that belonged to the old room is about to die.
        self.carried = None;

        self.room_physics.activate(&mut self.physics, &config)?;
        self.current_room = room;

        self.minigame = match (room, &config.zone) {
            (RoomId::Dice, Some(zone)) => Some(ActiveMinigame::Dice(DiceGame::new(
                &mut self.physics,
                zone,
            ))),
            (RoomId::Basketball, Some(zone)) => Some(ActiveMinigame::Basketball(
                BasketballGame::new(&mut self.physics, zone),
            )),
            _ => None,
        };

        if let Ok(mut transform) = self.physics.bodies.get::<&mut Transform>(self.player) {
            transform.position = config.spawn;
            transform.rotation = Quat::IDENTITY;
        }
        if let Ok(mut vel) = self.physics.bodies.get::<&mut Velocity>(self.player) {
            vel.0 = Vec3::ZERO;
        }
        self.camera.reset_orientation();
        self.sync_camera();
        info!("entered {room:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = FIXED_DT;

    fn run_frames(session: &mut Session, input: &InputSnapshot, frames: usize) {
        for _ in 0..frames {
            session.frame(input, DT).unwrap();
        }
    }

    #[test]
    fn player_settles_at_spawn_height() {
        let mut session = Session::new(1, 100).unwrap();
        run_frames(&mut session, &InputSnapshot::locked(), 120);
        let y = session.player_position().y;
        assert!((y - config::player::RADIUS).abs() < 0.1, "player y {y}");
    }

    #[test]
    fn portal_interact_switches_rooms() {
        let mut session = Session::new(1, 100).unwrap();
        // Walk north toward the dice portal at z = -14.
        let walk = InputSnapshot {
            forward: true,
            ..InputSnapshot::locked()
        };
        let mut frames = 0;
        while session.camera.position.distance(Vec3::new(0.0, 1.8, -14.0))
            >= PORTAL_INTERACTION_DISTANCE
            && frames < 600
        {
            session.frame(&walk, DT).unwrap();
            frames += 1;
        }
        let interact = InputSnapshot {
            interact: true,
            ..InputSnapshot::locked()
        };
        session.frame(&interact, DT).unwrap();
        assert_eq!(session.current_room(), RoomId::Dice);
        let position = session.player_position();
        let spawn = RoomConfig::get(RoomId::Dice).spawn;
        assert!((position.x - spawn.x).abs() < 0.1);
        assert!((position.z - spawn.z).abs() < 0.1);
    }

    #[test]
    fn room_switch_mid_roll_leaves_no_dice_and_refunds() {
        let mut session = Session::new(7, 100).unwrap();
        session.teleport_to_room(RoomId::Dice).unwrap();
        walk_to_zone(&mut session);
        engage(&mut session);

        session.place_dice_wager(30, 7).unwrap();
        assert_eq!(session.balance(), 70);
        session.request_roll().unwrap();
        run_frames(&mut session, &InputSnapshot::locked(), 10);
        assert!(session.hud().dice_rolling);

        session.teleport_to_room(RoomId::Hub).unwrap();
        assert_eq!(session.balance(), 100);

        let dice_left = session
            .physics
            .bodies
            .query::<&Surface>()
            .iter()
            .filter(|(_, s)| **s == Surface::Dice)
            .count();
        assert_eq!(dice_left, 0);
    }

    #[test]
    fn dice_round_settles_the_wager() {
        let mut session = Session::new(3, 100).unwrap();
        session.teleport_to_room(RoomId::Dice).unwrap();
        walk_to_zone(&mut session);
        engage(&mut session);

        session.place_dice_wager(10, 7).unwrap();
        session.request_roll().unwrap();

        let mut frames = 0;
        while session.hud().dice_rolling && frames < 60 * 7 {
            session.frame(&InputSnapshot::locked(), DT).unwrap();
            frames += 1;
        }
        let hud = session.hud();
        assert!(!hud.wager_open, "wager must be settled");
        let roll = hud.last_roll.expect("roll resolved");
        if roll.total == 7 {
            assert_eq!(hud.balance, 110);
        } else {
            assert_eq!(hud.balance, 90);
        }
    }

    #[test]
    fn wager_requires_being_at_the_table() {
        let mut session = Session::new(1, 100).unwrap();
        assert!(matches!(
            session.place_dice_wager(10, 7),
            Err(SessionError::NotAtTable(RoomId::Dice))
        ));
        session.teleport_to_room(RoomId::Dice).unwrap();
        // In the room but not engaged at the zone.
        assert!(matches!(
            session.place_dice_wager(10, 7),
            Err(SessionError::NotAtTable(RoomId::Dice))
        ));
    }

    #[test]
    fn roll_requires_an_open_wager() {
        let mut session = Session::new(1, 100).unwrap();
        session.teleport_to_room(RoomId::Dice).unwrap();
        walk_to_zone(&mut session);
        engage(&mut session);
        assert!(matches!(session.request_roll(), Err(SessionError::NoWager)));
    }

    #[test]
    fn quitting_the_table_refunds_the_stake() {
        let mut session = Session::new(1, 100).unwrap();
        session.teleport_to_room(RoomId::Dice).unwrap();
        walk_to_zone(&mut session);
        engage(&mut session);
        session.place_dice_wager(25, 9).unwrap();
        assert_eq!(session.balance(), 75);
        session.quit_minigame();
        assert_eq!(session.balance(), 100);
        assert!(!session.hud().minigame_focused);
    }

    #[test]
    fn sequence_completion_awards_once() {
        let mut session = Session::new(9, 100).unwrap();
        session.teleport_to_room(RoomId::Sequence).unwrap();
        walk_to_zone(&mut session);
        engage(&mut session);
        assert!(session.hud().sequence_progress.is_some());

        // Let playback finish.
        run_frames(&mut session, &InputSnapshot::locked(), 150);
        let Some(ActiveMinigame::Sequence(game)) = &session.minigame else {
            panic!("sequence game missing");
        };
        let sequence = game.entries().to_vec();

        let mut completions = 0;
        for color in sequence {
            if let Some(SequenceEvent::Completed(_)) = session.sequence_press(color) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(session.rewards().len(), 1);
        assert!(!session.hud().minigame_focused);
        // The game is gone; further presses are inert.
        assert!(session.sequence_press(0).is_none());
    }

    #[test]
    fn late_wager_rejected_while_dice_still_rolling() {
        let mut session = Session::new(11, 100).unwrap();
        session.teleport_to_room(RoomId::Dice).unwrap();
        walk_to_zone(&mut session);
        engage(&mut session);
        session.place_dice_wager(10, 7).unwrap();
        session.request_roll().unwrap();
        run_frames(&mut session, &InputSnapshot::locked(), 10);

        // Give up mid-roll (stake refunded, dice keep tumbling), come back,
        // and try to bet on the roll already in motion.
        session.quit_minigame();
        assert_eq!(session.balance(), 100);
        engage(&mut session);
        assert!(session.hud().dice_rolling);
        assert!(matches!(
            session.place_dice_wager(10, 7),
            Err(SessionError::RoundInProgress)
        ));
        assert_eq!(session.balance(), 100);
    }

    #[test]
    fn late_wager_rejected_while_ball_in_flight() {
        let mut session = Session::new(5, 100).unwrap();
        pickup_ball(&mut session);

        // Hold the charge key until the cap forces the throw.
        let charge = InputSnapshot {
            jump: true,
            ..InputSnapshot::locked()
        };
        let mut frames = 0;
        while session.hud().throw_power.is_some() && frames < 200 {
            session.frame(&charge, DT).unwrap();
            frames += 1;
        }
        assert_eq!(session.hud().attempts, 1);

        session.quit_minigame();
        assert_eq!(session.balance(), 100);
        engage(&mut session);
        assert!(matches!(
            session.place_basketball_wager(10),
            Err(SessionError::RoundInProgress)
        ));
    }

    #[test]
    fn walking_away_mid_hold_returns_the_ball_to_the_rack() {
        let mut session = Session::new(2, 100).unwrap();
        let rack = pickup_ball(&mut session);

        // Back out of the engage radius; the table is abandoned
        // automatically.
        let retreat = InputSnapshot {
            backward: true,
            ..InputSnapshot::locked()
        };
        run_frames(&mut session, &retreat, 60);

        let hud = session.hud();
        assert!(!hud.minigame_focused);
        assert!(!hud.wager_open);
        assert_eq!(hud.balance, 100);
        assert!(hud.throw_power.is_none());

        // The ball must be back at the rack, not glued to the camera.
        let ball = session
            .physics
            .bodies
            .query::<(&Surface, &Transform)>()
            .iter()
            .find_map(|(_, (surface, transform))| {
                (*surface == Surface::Ball).then(|| transform.position)
            })
            .expect("ball body exists");
        assert!((ball.x - rack.x).abs() < 0.1);
        assert!((ball.z - rack.z).abs() < 0.1);
        assert!(ball.y > 0.05 && ball.y < 0.6, "ball y {}", ball.y);
    }

    #[test]
    fn teleport_channel_consumed_once() {
        let mut session = Session::new(1, 100).unwrap();
        let target = Vec3::new(5.0, 0.5, 5.0);
        session.set_teleport_target(target);
        session.frame(&InputSnapshot::locked(), DT).unwrap();
        let after_first = session.player_position();
        assert!(after_first.distance(target) < 0.5);

        // Walk away; the old target must not re-apply.
        let walk = InputSnapshot {
            forward: true,
            ..InputSnapshot::locked()
        };
        run_frames(&mut session, &walk, 30);
        assert!(session.player_position().distance(target) > 1.0);
    }

    #[test]
    fn save_and_load_round_trip_through_a_store() {
        let mut session = Session::new(1, 100).unwrap();
        let mut store: Option<Vec3> = None;
        session.set_teleport_target(Vec3::new(4.0, 0.5, -6.0));
        session.frame(&InputSnapshot::locked(), DT).unwrap();
        session.save_position(&mut store);
        let saved = store.unwrap();

        session.teleport_to_room(RoomId::Hub).unwrap();
        session.load_position(&store);
        session.frame(&InputSnapshot::locked(), DT).unwrap();
        assert!(session.player_position().distance(saved) < 0.5);
    }

    /// Walk up to the basketball rack, engage, back a throw, and grab the
    /// ball. Returns the rack position.
    fn pickup_ball(session: &mut Session) -> Vec3 {
        session.teleport_to_room(RoomId::Basketball).unwrap();
        let zone = RoomConfig::get(RoomId::Basketball).zone.unwrap();
        let rack = zone.center + Vec3::new(0.0, 0.5, zone.size.z / 2.0 - 1.5);

        // The zone wall stops the body, but the eye still ends up within
        // pickup range of the rack just inside it.
        let walk = InputSnapshot {
            forward: true,
            ..InputSnapshot::locked()
        };
        let mut frames = 0;
        while session.camera.position.distance(rack) >= 2.9 && frames < 600 {
            session.frame(&walk, DT).unwrap();
            frames += 1;
        }
        assert!(frames < 600, "never reached the rack");

        engage(session);
        session.place_basketball_wager(10).unwrap();
        let grab = InputSnapshot {
            grab: true,
            ..InputSnapshot::locked()
        };
        session.frame(&grab, DT).unwrap();
        assert!(session.hud().throw_power.is_some(), "pickup failed");
        session.frame(&InputSnapshot::locked(), DT).unwrap();
        rack
    }

    fn walk_to_zone(session: &mut Session) {
        let zone = RoomConfig::get(session.current_room())
            .zone
            .expect("room has a zone");
        let walk = InputSnapshot {
            forward: true,
            ..InputSnapshot::locked()
        };
        let engage_distance = zone_engage_distance(session.current_room());
        let mut frames = 0;
        while session.camera.position.distance(zone.center) >= engage_distance - 0.5
            && frames < 600
        {
            session.frame(&walk, DT).unwrap();
            frames += 1;
        }
        assert!(frames < 600, "never reached the zone");
    }

    fn engage(session: &mut Session) {
        let interact = InputSnapshot {
            interact: true,
            ..InputSnapshot::locked()
        };
        session.frame(&interact, DT).unwrap();
        assert!(session.hud().minigame_focused, "failed to engage minigame");
        // Release the key.
        session.frame(&InputSnapshot::locked(), DT).unwrap();
    }
}

//! Simulation core for a first-person minigame parlor: rigid-body physics
//! over a `hecs` world, a first-person controller with carry, room physics
//! with tracked teardown, three minigames (dice, basketball, memory
//! sequence), and a wager-gated economy. No rendering or device input here;
//! the host feeds [`input::InputSnapshot`]s into a [`session::Session`] and
//! reads transforms and HUD state back out.

pub mod camera;
pub mod components;
pub mod config;
pub mod economy;
pub mod fsm;
pub mod input;
pub mod minigames;
pub mod physics;
pub mod room;
pub mod session;
pub mod systems;

pub use session::{Hud, PositionStore, Session, SessionError};

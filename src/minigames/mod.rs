//! The three minigame state machines. Dice and basketball own physics
//! bodies inside the shared world; the sequence game is pure state.

pub mod basketball;
pub mod dice;
pub mod sequence;

pub use basketball::{BasketballGame, ThrowEvent};
pub use dice::{DiceGame, DiceOutcome};
pub use sequence::{RewardColor, SequenceEvent, SequenceGame};

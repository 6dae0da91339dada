use log::info;
use rand::Rng;

use crate::fsm::StateMachine;

const SEQUENCE_LENGTH: usize = 3;
pub const COLOR_COUNT: u8 = 3;
/// One playback entry every 0.6 s...
const PLAYBACK_STEP: f32 = 0.6;
/// ...lit for the first 0.3 s of its slot.
const PLAYBACK_LIT: f32 = 0.3;
/// Pause after a wrong press before the round restarts.
const MISMATCH_DELAY: f32 = 0.5;

/// The collectible a completed round awards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardColor {
    Red,
    Blue,
    Green,
}

#[derive(Clone, Copy, Debug)]
enum SequencePhase {
    /// Playing back entry `index`; input is locked.
    Showing { index: usize },
    AwaitingInput,
    /// Wrong press; restarting shortly.
    Mismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceEvent {
    Completed(RewardColor),
    Cancelled,
}

/// Watch-then-repeat memory game. A wrong press never ends the game; it
/// restarts the round with a fresh sequence after a short delay. The only
/// exits are a completed round or an explicit close.
pub struct SequenceGame {
    machine: StateMachine<SequencePhase>,
    sequence: Vec<u8>,
    progress: usize,
    reward: RewardColor,
}

impl SequenceGame {
    pub fn start<R: Rng>(rng: &mut R, reward: RewardColor) -> Self {
        let mut game = Self {
            machine: StateMachine::new(SequencePhase::Showing { index: 0 }),
            sequence: Vec::new(),
            progress: 0,
            reward,
        };
        game.new_round(rng);
        game
    }

    fn new_round<R: Rng>(&mut self, rng: &mut R) {
        self.sequence = (0..SEQUENCE_LENGTH)
            .map(|_| rng.gen_range(0..COLOR_COUNT))
            .collect();
        self.progress = 0;
        self.machine.force_go(SequencePhase::Showing { index: 0 });
        info!("sequence round started");
    }

    pub fn input_locked(&self) -> bool {
        !matches!(self.machine.state, SequencePhase::AwaitingInput)
    }

    /// Entries repeated so far this round, out of the full length.
    pub fn progress(&self) -> (usize, usize) {
        (self.progress, self.sequence.len())
    }

    /// Which color is lit right now during playback, for the HUD.
    pub fn lit_color(&self) -> Option<u8> {
        match self.machine.state {
            SequencePhase::Showing { index } if self.machine.elapsed < PLAYBACK_LIT => {
                self.sequence.get(index).copied()
            }
            _ => None,
        }
    }

    /// Advance playback and mismatch-restart timers.
    pub fn update<R: Rng>(&mut self, rng: &mut R, dt: f32) {
        self.machine.tick(dt);
        match self.machine.state {
            SequencePhase::Showing { index } => {
                if self.machine.elapsed >= PLAYBACK_STEP {
                    let next = index + 1;
                    if next >= self.sequence.len() {
                        self.machine.go(SequencePhase::AwaitingInput);
                    } else {
                        self.machine.force_go(SequencePhase::Showing { index: next });
                    }
                }
            }
            SequencePhase::Mismatch => {
                if self.machine.elapsed >= MISMATCH_DELAY {
                    self.new_round(rng);
                }
            }
            SequencePhase::AwaitingInput => {}
        }
    }

    /// A color button press. Ignored while input is locked. Returns
    /// `Completed` on the press that finishes the round.
    pub fn press(&mut self, color: u8) -> Option<SequenceEvent> {
        if self.input_locked() {
            return None;
        }
        if self.sequence.get(self.progress) != Some(&color) {
            info!("sequence mismatch at step {}", self.progress);
            self.machine.go(SequencePhase::Mismatch);
            return None;
        }
        self.progress += 1;
        if self.progress >= self.sequence.len() {
            info!("sequence completed, reward {:?}", self.reward);
            return Some(SequenceEvent::Completed(self.reward));
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[u8] {
        &self.sequence
    }

    /// Give up. The caller discards the game afterwards.
    pub fn close(self) -> SequenceEvent {
        info!("sequence closed without completion");
        SequenceEvent::Cancelled
    }
}

use log::{info, warn};
use thiserror::Error;

/// Winning wagers pay stake times this.
const PAYOUT_MULTIPLIER: u32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EconomyError {
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u32, need: u32 },
    #[error("a wager is already open")]
    WagerOpen,
    #[error("wager amount must be positive")]
    ZeroWager,
}

/// What a wager is riding on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WagerTarget {
    /// Exact two-dice total.
    DiceTotal(u8),
    /// The next basketball throw goes in.
    BasketballMake,
}

/// A concluded minigame round, fed to [`EconomyGate::resolve`].
#[derive(Clone, Copy, Debug)]
pub enum WagerOutcome {
    DiceTotal(u8),
    BasketballScored,
    BasketballMissed,
}

pub struct Wallet {
    balance: u32,
}

impl Wallet {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    /// Check and debit against the same balance; on failure nothing changes.
    pub fn debit(&mut self, amount: u32) -> Result<(), EconomyError> {
        if amount > self.balance {
            return Err(EconomyError::InsufficientFunds {
                have: self.balance,
                need: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: u32) {
        self.balance += amount;
    }
}

struct Wager {
    target: WagerTarget,
    amount: u32,
}

/// Single-slot wager escrow in front of the wallet. The stake leaves the
/// balance at placement; every placed wager ends in exactly one of paid,
/// lost, or refunded. Holding the open wager in an `Option` that `resolve`
/// and `refund` both `take` is what makes settlement idempotent.
pub struct EconomyGate {
    wallet: Wallet,
    wager: Option<Wager>,
}

impl EconomyGate {
    pub fn new(starting_balance: u32) -> Self {
        Self {
            wallet: Wallet::new(starting_balance),
            wager: None,
        }
    }

    pub fn balance(&self) -> u32 {
        self.wallet.balance()
    }

    pub fn wager_open(&self) -> bool {
        self.wager.is_some()
    }

    pub fn place_wager(&mut self, amount: u32, target: WagerTarget) -> Result<(), EconomyError> {
        if amount == 0 {
            return Err(EconomyError::ZeroWager);
        }
        if self.wager.is_some() {
            return Err(EconomyError::WagerOpen);
        }
        self.wallet.debit(amount)?;
        self.wager = Some(Wager { target, amount });
        info!("wager placed: {amount} on {target:?}");
        Ok(())
    }

    /// Settle the open wager against `outcome`. Returns the payout, zero for
    /// a loss. With no open wager this is a logged no-op, which is what a
    /// duplicate outcome event degrades to.
    pub fn resolve(&mut self, outcome: WagerOutcome) -> u32 {
        let Some(wager) = self.wager.take() else {
            warn!("resolve with no open wager ({outcome:?})");
            return 0;
        };

        let won = match (wager.target, outcome) {
            (WagerTarget::DiceTotal(target), WagerOutcome::DiceTotal(total)) => target == total,
            (WagerTarget::BasketballMake, WagerOutcome::BasketballScored) => true,
            (WagerTarget::BasketballMake, WagerOutcome::BasketballMissed) => false,
            // A mismatched outcome kind loses the stake; the round it was
            // riding on is over either way.
            _ => false,
        };

        if won {
            let payout = wager.amount * PAYOUT_MULTIPLIER;
            self.wallet.credit(payout);
            info!("wager won: +{payout}");
            payout
        } else {
            info!("wager lost: -{}", wager.amount);
            0
        }
    }

    /// Return the stake of the open wager, if any. Used on room exit and
    /// minigame give-up.
    pub fn refund(&mut self) {
        if let Some(wager) = self.wager.take() {
            self.wallet.credit(wager.amount);
            info!("wager refunded: {}", wager.amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_debit_leaves_balance_untouched() {
        let mut wallet = Wallet::new(30);
        assert_eq!(
            wallet.debit(31),
            Err(EconomyError::InsufficientFunds { have: 30, need: 31 })
        );
        assert_eq!(wallet.balance(), 30);
        wallet.debit(30).unwrap();
        assert_eq!(wallet.balance(), 0);
    }

    #[test]
    fn winning_dice_wager_nets_the_stake() {
        // Bet 50 on a total of 7, dice land 3 and 4.
        let mut gate = EconomyGate::new(100);
        gate.place_wager(50, WagerTarget::DiceTotal(7)).unwrap();
        assert_eq!(gate.balance(), 50);
        let payout = gate.resolve(WagerOutcome::DiceTotal(3 + 4));
        assert_eq!(payout, 100);
        assert_eq!(gate.balance(), 150);
    }

    #[test]
    fn losing_dice_wager_forfeits_the_stake() {
        let mut gate = EconomyGate::new(100);
        gate.place_wager(50, WagerTarget::DiceTotal(7)).unwrap();
        assert_eq!(gate.resolve(WagerOutcome::DiceTotal(9)), 0);
        assert_eq!(gate.balance(), 50);
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut gate = EconomyGate::new(100);
        gate.place_wager(20, WagerTarget::BasketballMake).unwrap();
        assert_eq!(gate.resolve(WagerOutcome::BasketballScored), 40);
        // The score event fires again a frame later.
        assert_eq!(gate.resolve(WagerOutcome::BasketballScored), 0);
        assert_eq!(gate.balance(), 120);
    }

    #[test]
    fn second_wager_rejected_while_one_is_open() {
        let mut gate = EconomyGate::new(100);
        gate.place_wager(10, WagerTarget::DiceTotal(5)).unwrap();
        assert_eq!(
            gate.place_wager(10, WagerTarget::DiceTotal(8)),
            Err(EconomyError::WagerOpen)
        );
        assert_eq!(gate.balance(), 90);
    }

    #[test]
    fn insufficient_funds_rejects_placement_atomically() {
        let mut gate = EconomyGate::new(5);
        assert!(matches!(
            gate.place_wager(10, WagerTarget::BasketballMake),
            Err(EconomyError::InsufficientFunds { have: 5, need: 10 })
        ));
        assert_eq!(gate.balance(), 5);
        assert!(!gate.wager_open());
    }

    #[test]
    fn refund_restores_the_stake_once() {
        let mut gate = EconomyGate::new(100);
        gate.place_wager(40, WagerTarget::DiceTotal(12)).unwrap();
        gate.refund();
        gate.refund();
        assert_eq!(gate.balance(), 100);
    }

    #[test]
    fn zero_wager_rejected() {
        let mut gate = EconomyGate::new(100);
        assert_eq!(
            gate.place_wager(0, WagerTarget::BasketballMake),
            Err(EconomyError::ZeroWager)
        );
    }
}

//! Round state machine.
//!
//! Storage-free core of the escrow. A `Round` validates every operation
//! against its own state and returns what the host must do next: the updated
//! ledger entry and, when funds leave custody, a `Payout` instruction.
//! Nothing in this module touches storage or the token contract.
//!
//! ## States
//! - **Active**: `winner` is `None`. Deposits and admin withdrawals allowed.
//! - **Concluded**: `winner` is `Some`. Terminal; pot is zero.
//!
//! The only transition is Active -> Concluded, on a correct guess.

use soroban_sdk::{contracttype, Address};

use crate::Error;

/// Singleton game state, stored as one instance-storage entry.
///
/// There is no separate `active` flag: a round is active exactly while no
/// winner has been declared.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Round {
    pub admin: Address,
    pub target: u32,
    pub max_guess: u32,
    pub winner: Option<Address>,
    /// Custodied balance: deposits minus withdrawals, zero once concluded.
    pub pot: i128,
}

/// Instruction to move `amount` out of custody to `to`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub to: Address,
    pub amount: i128,
}

/// Result of an accepted `deposit_and_guess`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuessReceipt {
    /// Guesser's ledger entry after this deposit.
    pub contribution: i128,
    /// Set only on the winning guess; carries the whole pot.
    pub payout: Option<Payout>,
}

impl GuessReceipt {
    pub fn won(&self) -> bool {
        self.payout.is_some()
    }
}

impl Round {
    pub fn new(admin: Address, target: u32, max_guess: u32) -> Result<Self, Error> {
        if target > max_guess {
            return Err(Error::InvalidTarget);
        }
        Ok(Round {
            admin,
            target,
            max_guess,
            winner: None,
            pot: 0,
        })
    }

    pub fn is_active(&self) -> bool {
        self.winner.is_none()
    }

    pub fn winner(&self) -> Option<Address> {
        self.winner.clone()
    }

    pub fn pot(&self) -> i128 {
        self.pot
    }

    pub fn max_guess(&self) -> u32 {
        self.max_guess
    }

    /// Accept `amount` from `guesser` and evaluate `guess`.
    ///
    /// `contributed` is the guesser's current ledger entry (zero if absent).
    /// Guards are checked in order: round active, guess in range, amount
    /// non-negative. All arithmetic is done before any field is written, so
    /// a rejected call leaves the round untouched.
    ///
    /// On a correct guess the winner is recorded before the payout is cut,
    /// and the payout includes this call's own deposit.
    pub fn deposit_and_guess(
        &mut self,
        guesser: &Address,
        guess: u32,
        amount: i128,
        contributed: i128,
    ) -> Result<GuessReceipt, Error> {
        if !self.is_active() {
            return Err(Error::RoundEnded);
        }
        if guess > self.max_guess {
            return Err(Error::GuessOutOfRange);
        }
        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        let contribution = contributed.checked_add(amount).ok_or(Error::Overflow)?;
        let new_pot = self.pot.checked_add(amount).ok_or(Error::Overflow)?;

        self.pot = new_pot;

        let payout = if guess == self.target {
            self.winner = Some(guesser.clone());
            let amount = self.pot;
            self.pot = 0;
            Some(Payout {
                to: guesser.clone(),
                amount,
            })
        } else {
            None
        };

        Ok(GuessReceipt {
            contribution,
            payout,
        })
    }

    /// Sweep the whole pot to the admin. Only valid while no winner exists.
    ///
    /// May be called repeatedly; a call with nothing accumulated returns a
    /// zero-amount payout.
    pub fn withdraw(&mut self, caller: &Address) -> Result<Payout, Error> {
        if caller != &self.admin {
            return Err(Error::Unauthorized);
        }
        if self.winner.is_some() {
            return Err(Error::WinnerAlreadyDeclared);
        }

        let amount = self.pot;
        self.pot = 0;
        Ok(Payout {
            to: self.admin.clone(),
            amount,
        })
    }
}

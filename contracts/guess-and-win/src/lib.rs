//! Stellarcade Guess-and-Win Contract
//!
//! A single-round wager escrow. Players attach a deposit to a numeric guess
//! (0–256) against a hidden target fixed at `init`. The first correct guess
//! takes the entire pot and ends the round for good.
//!
//! ## Game Flow
//! 1. Admin calls `init` with the token and the secret target.
//! 2. Players call `deposit_and_guess`; each deposit is custodied and added
//!    to the player's contribution ledger.
//! 3. The first `guess == target` marks the player as winner, then the whole
//!    pot is transferred to them. Every later guess fails with `RoundEnded`.
//! 4. While no winner exists, the admin may sweep the pot with
//!    `withdraw_funds` any number of times.
//!
//! ## Storage Strategy
//! - `instance()`: `Round` (admin, target, bounds, winner, pot) and `Token`.
//!   Small and fixed-size; one ledger entry.
//! - `persistent()`: per-player `Contribution` entries, TTL bumped on write.
//!
//! ## Invariant
//! `round.pot == token.balance(contract_address)` as long as every inflow
//! goes through `deposit_and_guess`. Direct transfers to the contract address
//! are not counted in the pot and are never paid out.
//!
//! The target lives in contract storage and is readable by anyone inspecting
//! the ledger; no getter or event exposes it.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, log, token::TokenClient,
    Address, Env,
};

mod round;

pub use round::{GuessReceipt, Payout, Round};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Highest accepted guess. Guesses are `0..=MAX_GUESS`.
pub const MAX_GUESS: u32 = 256;

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized    = 1,
    NotInitialized        = 2,
    RoundEnded            = 3,
    GuessOutOfRange       = 4,
    Unauthorized          = 5,
    WinnerAlreadyDeclared = 6,
    InvalidAmount         = 7,
    InvalidTarget         = 8,
    Overflow              = 9,
}

impl Error {
    /// Human-readable reason for the rejection.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::AlreadyInitialized => "Round already initialized",
            Error::NotInitialized => "Round not initialized",
            Error::RoundEnded => "Game has ended!",
            Error::GuessOutOfRange => "Guess must be within range",
            Error::Unauthorized => "Not the owner",
            Error::WinnerAlreadyDeclared => "Game already has a winner, cannot withdraw",
            Error::InvalidAmount => "Deposit must be non-negative",
            Error::InvalidTarget => "Target must be within range",
            Error::Overflow => "Arithmetic overflow",
        }
    }
}

// ---------------------------------------------------------------------------
// Storage Types
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Round,
    Token,
    // --- persistent() ---
    /// Cumulative deposits per player.
    Contribution(Address),
}

/// Public view of the round. Leaves out the target.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundState {
    pub admin: Address,
    pub max_guess: u32,
    pub active: bool,
    pub winner: Option<Address>,
    pub pot: i128,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct RoundCreated {
    #[topic]
    pub admin: Address,
    pub max_guess: u32,
}

#[contractevent]
pub struct GuessMade {
    #[topic]
    pub guesser: Address,
    pub guess: u32,
}

#[contractevent]
pub struct WinnerDeclared {
    #[topic]
    pub winner: Address,
    pub amount: i128,
}

#[contractevent]
pub struct FundsWithdrawn {
    #[topic]
    pub admin: Address,
    pub amount: i128,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct GuessAndWin;

#[contractimpl]
impl GuessAndWin {
    /// Open the round. May only be called once.
    ///
    /// `token` must be a deployed SEP-41 contract; all deposits and payouts
    /// move through it. `target` must lie in `0..=MAX_GUESS`.
    pub fn init(env: Env, admin: Address, token: Address, target: u32) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Round) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        let round = Round::new(admin.clone(), target, MAX_GUESS)?;
        env.storage().instance().set(&DataKey::Round, &round);
        env.storage().instance().set(&DataKey::Token, &token);

        log!(&env, "round created", admin, MAX_GUESS);
        RoundCreated { admin, max_guess: MAX_GUESS }.publish(&env);
        Ok(())
    }

    /// Deposit `amount` and guess `guess`. Returns `true` if the guess won.
    ///
    /// Guards (in order): round still active, guess within `0..=MAX_GUESS`,
    /// non-negative amount. A zero deposit is accepted.
    ///
    /// On a win, the round and ledger are written BEFORE the pot leaves the
    /// contract, so any re-entrant guess already sees a concluded round.
    pub fn deposit_and_guess(
        env: Env,
        guesser: Address,
        guess: u32,
        amount: i128,
    ) -> Result<bool, Error> {
        let mut round = get_round(&env)?;
        guesser.require_auth();

        let contributed = get_contribution(&env, &guesser);
        let receipt = round.deposit_and_guess(&guesser, guess, amount, contributed)?;

        let token = get_token(&env)?;
        if amount > 0 {
            TokenClient::new(&env, &token).transfer(
                &guesser,
                env.current_contract_address(),
                &amount,
            );
        }

        set_round(&env, &round);
        set_contribution(&env, &guesser, receipt.contribution);

        GuessMade { guesser, guess }.publish(&env);

        let won = receipt.won();
        if let Some(payout) = receipt.payout {
            log!(&env, "winner declared", payout.to, payout.amount);
            WinnerDeclared { winner: payout.to.clone(), amount: payout.amount }.publish(&env);
            execute_payout(&env, &token, &payout);
        }
        Ok(won)
    }

    /// Sweep the whole pot to the admin. Returns the amount withdrawn.
    ///
    /// Allowed only while no winner exists. Repeatable; withdraws whatever
    /// accumulated since the last call, which may be zero.
    pub fn withdraw_funds(env: Env, caller: Address) -> Result<i128, Error> {
        let mut round = get_round(&env)?;
        caller.require_auth();

        let payout = round.withdraw(&caller)?;
        let token = get_token(&env)?;

        set_round(&env, &round);

        log!(&env, "funds withdrawn", payout.to, payout.amount);
        FundsWithdrawn { admin: payout.to.clone(), amount: payout.amount }.publish(&env);
        execute_payout(&env, &token, &payout);
        Ok(payout.amount)
    }

    /// Current custodied balance.
    pub fn get_pot(env: Env) -> Result<i128, Error> {
        Ok(get_round(&env)?.pot())
    }

    /// Cumulative deposits by `player`; zero if they never deposited.
    pub fn contributions(env: Env, player: Address) -> i128 {
        get_contribution(&env, &player)
    }

    pub fn winner(env: Env) -> Result<Option<Address>, Error> {
        Ok(get_round(&env)?.winner())
    }

    pub fn is_active(env: Env) -> Result<bool, Error> {
        Ok(get_round(&env)?.is_active())
    }

    pub fn max_guess(env: Env) -> Result<u32, Error> {
        Ok(get_round(&env)?.max_guess())
    }

    /// Snapshot of the round without the target.
    pub fn get_round_state(env: Env) -> Result<RoundState, Error> {
        let round = get_round(&env)?;
        Ok(RoundState {
            active: round.is_active(),
            winner: round.winner(),
            pot: round.pot(),
            max_guess: round.max_guess(),
            admin: round.admin,
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn get_round(env: &Env) -> Result<Round, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Round)
        .ok_or(Error::NotInitialized)
}

fn set_round(env: &Env, round: &Round) {
    env.storage().instance().set(&DataKey::Round, round);
}

fn get_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

fn get_contribution(env: &Env, player: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Contribution(player.clone()))
        .unwrap_or(0)
}

/// Write a ledger entry and extend its TTL in one step.
fn set_contribution(env: &Env, player: &Address, amount: i128) {
    let key = DataKey::Contribution(player.clone());
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

/// Move a payout out of custody. Zero-amount payouts skip the token call.
fn execute_payout(env: &Env, token: &Address, payout: &Payout) {
    if payout.amount > 0 {
        TokenClient::new(env, token).transfer(
            &env.current_contract_address(),
            &payout.to,
            &payout.amount,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

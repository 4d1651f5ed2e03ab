//! Stellarcade Unique Bid Contract
//!
//! A sealed-bid, highest-unique-number game. Each round the admin fixes a
//! number range `[1, max_number]`; players pay to commit to a hidden number,
//! reveal it once every seat is taken, and the player holding the greatest
//! number that nobody else picked wins `stake * number`.
//!
//! ## Game Flow
//! 1. Admin calls `start_round` with the range, reveal window, stake and deposit.
//! 2. Players call `commit` with `sha256(number_be || salt)` and pay exactly
//!    `stake + deposit`. The commit that fills the last seat closes the commit
//!    phase and opens a reveal window of `reveal_duration` seconds.
//! 3. Players call `reveal` with their number and salt. A matching reveal
//!    refunds the deposit.
//! 4. After the window closes anyone calls `settle`. The leader receives
//!    `stake * number`; the rest of the stake pool goes to the admin. With no
//!    unique number the whole pool goes to the admin.
//!
//! ## Phases
//! The phase is never stored. It is derived on every call from the round
//! record and the ledger timestamp:
//!
//! `NoRound -> Commit -> Reveal -> AwaitSettle -> Settled`
//!
//! ## Storage Strategy
//! - `instance()`: Admin, Token, and the reentrancy lock.
//! - `persistent()`: the singleton Round, the Roster, the Reveals map, per-round
//!   Commitment entries, and the LastSettlement summary. TTL bumped on every
//!   write.
//!
//! `settle` and `current_leader` read the Roster and Reveals as two entries, so
//! their ledger footprint does not grow with the seat count.
#![no_std]
#![allow(unexpected_cfgs)]

mod commitment;
mod guard;
mod leader;
mod settlement;
mod storage;

pub use commitment::compute_commitment;

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, BytesN, Env, Map, Vec,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Upper bound on `max_number`, which is also the seat count of a round.
/// Caps the size of the Roster and Reveals entries and the ranking pass in
/// `settle`.
pub const MAX_PARTICIPANTS: u32 = 500;

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized   = 1,
    NotInitialized       = 2,
    NotAuthorized        = 3,
    InvalidParameters    = 4,
    RoundNotSettled      = 5,
    NoActiveRound        = 6,
    AlreadyCommitted     = 7,
    /// The all-zero hash is reserved as the empty commitment.
    InvalidCommitment    = 8,
    /// Payment differs from `stake + deposit`, over or under.
    InsufficientPayment  = 9,
    RevealPhaseNotActive = 10,
    InvalidNumberRange   = 11,
    /// `(number, salt)` does not hash to the stored commitment. Retryable.
    InvalidReveal        = 12,
    NoDepositConfigured  = 13,
    TransferFailed       = 14,
    CannotSettleYet      = 15,
    AlreadySettled       = 16,
    NoRevealYet          = 17,
    Overflow             = 18,
    /// A mutating call was entered while another one was still running.
    ReentrantCall        = 19,
}

// ---------------------------------------------------------------------------
// Storage Types
// ---------------------------------------------------------------------------

/// Round lifecycle, derived from `RoundData` and the ledger clock.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    NoRound     = 0,
    Commit      = 1,
    Reveal      = 2,
    AwaitSettle = 3,
    Settled     = 4,
}

/// The single active round. Overwritten by the next `start_round`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub round_id: u32,
    /// Highest valid bid, and the number of seats in the round.
    pub max_number: u32,
    /// Length of the reveal window in seconds.
    pub reveal_duration: u64,
    /// Ledger timestamp closing the reveal window; 0 until the last seat fills.
    pub reveal_deadline: u64,
    pub stake_amount: i128,
    pub deposit_amount: i128,
    pub commit_phase_ended: bool,
    pub settled: bool,
}

/// A roster entry paired with its revealed number (0 when never revealed).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bid {
    pub participant: Address,
    pub number: u32,
}

/// Outcome of the most recent `settle`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub round_id: u32,
    pub winner: Option<Address>,
    /// 0 when there is no winner.
    pub winning_number: u32,
    pub prize: i128,
    /// Paid to the admin.
    pub remainder: i128,
}

#[contracttype]
pub enum DataKey {
    // --- instance() ---
    Admin,
    Token,
    /// Present while a mutating call is executing.
    Locked,
    // --- persistent() ---
    Round,
    /// Vec<Address> in commit order for the current round.
    Roster,
    /// Commitment hash keyed by (round_id, participant). Removed on reveal.
    Commitment(u32, Address),
    /// Map<Address, u32> of revealed numbers, reset by `start_round`.
    Reveals,
    LastSettlement,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Initialized {
    #[topic]
    pub admin: Address,
    pub token: Address,
}

#[contractevent]
pub struct RoundStarted {
    #[topic]
    pub round_id: u32,
    pub max_number: u32,
    pub reveal_duration: u64,
    pub stake_amount: i128,
    pub deposit_amount: i128,
}

#[contractevent]
pub struct Committed {
    #[topic]
    pub round_id: u32,
    #[topic]
    pub participant: Address,
    pub participant_count: u32,
}

#[contractevent]
pub struct CommitPhaseEnded {
    #[topic]
    pub round_id: u32,
    pub reveal_deadline: u64,
}

#[contractevent]
pub struct Revealed {
    #[topic]
    pub round_id: u32,
    #[topic]
    pub participant: Address,
    pub number: u32,
    pub refund: i128,
}

#[contractevent]
pub struct RoundSettled {
    #[topic]
    pub round_id: u32,
    pub winner: Option<Address>,
    pub winning_number: u32,
    pub prize: i128,
    pub remainder: i128,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct UniqueBid;

#[contractimpl]
impl UniqueBid {
    // -----------------------------------------------------------------------
    // init
    // -----------------------------------------------------------------------

    /// Initialize the contract. May only be called once.
    ///
    /// `admin` starts rounds and receives every stake not paid out as a prize.
    /// `token` is the SEP-41 asset used for stakes, deposits and payouts.
    pub fn init(env: Env, admin: Address, token: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Token, &token);

        Initialized { admin, token }.publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // start_round
    // -----------------------------------------------------------------------

    /// Open a new round. Admin only.
    ///
    /// The previous round, if any, must be settled. Commitments from earlier
    /// rounds are keyed by their round id and reveals are reset, so neither
    /// is visible to the new round.
    pub fn start_round(
        env: Env,
        max_number: u32,
        reveal_duration: u64,
        stake_amount: i128,
        deposit_amount: i128,
    ) -> Result<(), Error> {
        guard::guarded(&env, || {
            open_round(&env, max_number, reveal_duration, stake_amount, deposit_amount)
        })
    }

    // -----------------------------------------------------------------------
    // commit
    // -----------------------------------------------------------------------

    /// Take a seat with a sealed bid. `payment` must equal `stake + deposit`.
    ///
    /// The commit that fills the last seat ends the commit phase and fixes
    /// the reveal deadline at `now + reveal_duration`.
    pub fn commit(
        env: Env,
        participant: Address,
        commitment: BytesN<32>,
        payment: i128,
    ) -> Result<(), Error> {
        guard::guarded(&env, || seal_bid(&env, participant, commitment, payment))
    }

    // -----------------------------------------------------------------------
    // reveal
    // -----------------------------------------------------------------------

    /// Open a sealed bid and get the deposit back.
    ///
    /// A mismatching `(number, salt)` leaves the stored commitment in place,
    /// so the participant can retry until the deadline.
    pub fn reveal(
        env: Env,
        participant: Address,
        number: u32,
        salt: BytesN<32>,
    ) -> Result<(), Error> {
        guard::guarded(&env, || open_bid(&env, participant, number, salt))
    }

    // -----------------------------------------------------------------------
    // settle
    // -----------------------------------------------------------------------

    /// Pay out the round once the reveal window has closed. Anyone can call.
    pub fn settle(env: Env) -> Result<Settlement, Error> {
        guard::guarded(&env, || close_round(&env))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Highest valid bid of the current round; 0 when no round was started.
    pub fn current_max_number(env: Env) -> u32 {
        storage::get_round(&env).map_or(0, |round| round.max_number)
    }

    pub fn current_phase(env: Env) -> Phase {
        phase_of(&env, storage::get_round(&env).as_ref())
    }

    /// `(seats taken, seats available)`. Seats taken drops to 0 after settle.
    pub fn current_participant_count(env: Env) -> (u32, u32) {
        let max = storage::get_round(&env).map_or(0, |round| round.max_number);
        (storage::get_roster(&env).len(), max)
    }

    /// Sealed bid of `participant` in the current round, `None` once revealed.
    pub fn commitment_for(env: Env, participant: Address) -> Option<BytesN<32>> {
        let round = storage::get_round(&env)?;
        storage::get_commitment(&env, round.round_id, &participant)
    }

    pub fn reveal_for(env: Env, participant: Address) -> Result<u32, Error> {
        storage::get_reveals(&env)
            .get(participant)
            .ok_or(Error::NoRevealYet)
    }

    /// Participants who revealed `number`, in commit order.
    pub fn who_revealed(env: Env, number: u32) -> Vec<Address> {
        let reveals = storage::get_reveals(&env);
        let mut holders = Vec::new(&env);
        for participant in storage::get_roster(&env).iter() {
            if reveals.get(participant.clone()) == Some(number) {
                holders.push_back(participant);
            }
        }
        holders
    }

    /// Holder of the greatest number nobody else revealed, if any.
    pub fn current_leader(env: Env) -> Option<Address> {
        leader_of(&env, &storage::get_roster(&env)).map(|bid| bid.participant)
    }

    pub fn get_round(env: Env) -> Result<RoundData, Error> {
        storage::get_round(&env).ok_or(Error::NoActiveRound)
    }

    pub fn get_participants(env: Env) -> Vec<Address> {
        storage::get_roster(&env)
    }

    pub fn last_settlement(env: Env) -> Result<Settlement, Error> {
        storage::get_last_settlement(&env).ok_or(Error::NoActiveRound)
    }

    /// The commitment `commit` expects for `(number, salt)`.
    pub fn hash_commitment(env: Env, number: u32, salt: BytesN<32>) -> BytesN<32> {
        compute_commitment(&env, number, &salt)
    }
}

// ---------------------------------------------------------------------------
// Round lifecycle
// ---------------------------------------------------------------------------

fn open_round(
    env: &Env,
    max_number: u32,
    reveal_duration: u64,
    stake_amount: i128,
    deposit_amount: i128,
) -> Result<(), Error> {
    storage::require_initialized(env)?;
    storage::require_admin_auth(env)?;

    if max_number == 0 || max_number > MAX_PARTICIPANTS {
        return Err(Error::InvalidParameters);
    }
    if reveal_duration == 0 || stake_amount < 0 {
        return Err(Error::InvalidParameters);
    }
    if deposit_amount <= 0 {
        return Err(Error::NoDepositConfigured);
    }
    // Fail now rather than at commit or settle time.
    stake_amount
        .checked_add(deposit_amount)
        .ok_or(Error::Overflow)?;
    settlement::stake_pool(stake_amount, max_number)?;

    let previous = storage::get_round(env);
    if let Some(round) = &previous {
        if !round.settled {
            return Err(Error::RoundNotSettled);
        }
    }
    let round_id = match &previous {
        Some(round) => round.round_id.checked_add(1).ok_or(Error::Overflow)?,
        None => 1,
    };

    let round = RoundData {
        round_id,
        max_number,
        reveal_duration,
        reveal_deadline: 0,
        stake_amount,
        deposit_amount,
        commit_phase_ended: false,
        settled: false,
    };
    storage::set_round(env, &round);
    storage::set_roster(env, &Vec::new(env));
    storage::set_reveals(env, &Map::new(env));

    RoundStarted {
        round_id,
        max_number,
        reveal_duration,
        stake_amount,
        deposit_amount,
    }
    .publish(env);

    Ok(())
}

fn seal_bid(env: &Env, participant: Address, hash: BytesN<32>, payment: i128) -> Result<(), Error> {
    storage::require_initialized(env)?;
    participant.require_auth();

    let mut round = storage::get_round(env).ok_or(Error::NoActiveRound)?;
    if phase_of(env, Some(&round)) != Phase::Commit {
        return Err(Error::NoActiveRound);
    }
    if commitment::is_empty(&hash) {
        return Err(Error::InvalidCommitment);
    }
    if storage::get_commitment(env, round.round_id, &participant).is_some() {
        return Err(Error::AlreadyCommitted);
    }

    let due = round
        .stake_amount
        .checked_add(round.deposit_amount)
        .ok_or(Error::Overflow)?;
    if payment != due {
        return Err(Error::InsufficientPayment);
    }

    settlement::collect(env, &participant, payment)?;

    let mut roster = storage::get_roster(env);
    roster.push_back(participant.clone());
    storage::set_roster(env, &roster);
    storage::set_commitment(env, round.round_id, &participant, &hash);

    Committed {
        round_id: round.round_id,
        participant,
        participant_count: roster.len(),
    }
    .publish(env);

    if roster.len() == round.max_number {
        round.reveal_deadline = env
            .ledger()
            .timestamp()
            .checked_add(round.reveal_duration)
            .ok_or(Error::Overflow)?;
        round.commit_phase_ended = true;
        storage::set_round(env, &round);

        CommitPhaseEnded {
            round_id: round.round_id,
            reveal_deadline: round.reveal_deadline,
        }
        .publish(env);
    }

    Ok(())
}

fn open_bid(env: &Env, participant: Address, number: u32, salt: BytesN<32>) -> Result<(), Error> {
    storage::require_initialized(env)?;
    participant.require_auth();

    let round = storage::get_round(env).ok_or(Error::RevealPhaseNotActive)?;
    if phase_of(env, Some(&round)) != Phase::Reveal {
        return Err(Error::RevealPhaseNotActive);
    }
    if number == 0 || number > round.max_number {
        return Err(Error::InvalidNumberRange);
    }

    let stored = storage::get_commitment(env, round.round_id, &participant)
        .ok_or(Error::InvalidReveal)?;
    if !commitment::matches(env, &stored, number, &salt) {
        return Err(Error::InvalidReveal);
    }

    let mut reveals = storage::get_reveals(env);
    reveals.set(participant.clone(), number);
    storage::set_reveals(env, &reveals);
    storage::remove_commitment(env, round.round_id, &participant);

    settlement::refund(env, &participant, round.deposit_amount)?;

    Revealed {
        round_id: round.round_id,
        participant,
        number,
        refund: round.deposit_amount,
    }
    .publish(env);

    Ok(())
}

fn close_round(env: &Env) -> Result<Settlement, Error> {
    storage::require_initialized(env)?;

    let mut round = storage::get_round(env).ok_or(Error::CannotSettleYet)?;
    if !round.commit_phase_ended || env.ledger().timestamp() < round.reveal_deadline {
        return Err(Error::CannotSettleYet);
    }
    if round.settled {
        return Err(Error::AlreadySettled);
    }

    let roster = storage::get_roster(env);
    let leader = leader_of(env, &roster);
    let payout = settlement::compute(round.stake_amount, roster.len(), leader)?;

    let admin = storage::get_admin(env)?;
    settlement::execute(env, &admin, &payout)?;

    round.settled = true;
    storage::set_round(env, &round);
    storage::set_roster(env, &Vec::new(env));

    let summary = Settlement {
        round_id: round.round_id,
        winner: payout.winner,
        winning_number: payout.winning_number,
        prize: payout.prize,
        remainder: payout.remainder,
    };
    storage::set_last_settlement(env, &summary);

    RoundSettled {
        round_id: summary.round_id,
        winner: summary.winner.clone(),
        winning_number: summary.winning_number,
        prize: summary.prize,
        remainder: summary.remainder,
    }
    .publish(env);

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn phase_of(env: &Env, round: Option<&RoundData>) -> Phase {
    let Some(round) = round else {
        return Phase::NoRound;
    };
    if round.settled {
        Phase::Settled
    } else if !round.commit_phase_ended {
        Phase::Commit
    } else if env.ledger().timestamp() <= round.reveal_deadline {
        Phase::Reveal
    } else {
        Phase::AwaitSettle
    }
}

/// Line up each seat's reveal (0 if none) and pick the leader.
fn leader_of(env: &Env, roster: &Vec<Address>) -> Option<Bid> {
    let reveals = storage::get_reveals(env);
    let mut numbers = Vec::new(env);
    for participant in roster.iter() {
        numbers.push_back(reveals.get(participant).unwrap_or(0));
    }

    let seat = leader::unique_highest(&numbers, &leader::rank_seats(env, &numbers))?;
    Some(Bid {
        participant: roster.get_unchecked(seat),
        number: numbers.get_unchecked(seat),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

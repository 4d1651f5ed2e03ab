//! Token movements: pulling payments in, refunding deposits, paying out.
//!
//! Every outbound transfer goes through `try_transfer`. A failed leg returns
//! `TransferFailed`, and since the whole invocation then fails, the host
//! rolls back the other leg and every storage write of the call. A partial
//! payout is never observable.

use soroban_sdk::{token::TokenClient, Address, Env};

use crate::{storage, Bid, Error};

/// Amounts owed at settlement, computed before any token moves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub winner: Option<Address>,
    pub winning_number: u32,
    pub prize: i128,
    pub remainder: i128,
}

/// `stake * participants`: everything collected at commit minus deposits.
pub fn stake_pool(stake: i128, participants: u32) -> Result<i128, Error> {
    stake
        .checked_mul(participants as i128)
        .ok_or(Error::Overflow)
}

/// Split the stake pool between the leader and the admin.
///
/// The leader gets `stake * number`; the admin gets what is left, or the
/// whole pool when there is no leader. `prize + remainder` always equals the
/// pool.
pub fn compute(stake: i128, participants: u32, leader: Option<Bid>) -> Result<Payout, Error> {
    let pool = stake_pool(stake, participants)?;

    let Some(bid) = leader else {
        return Ok(Payout {
            winner: None,
            winning_number: 0,
            prize: 0,
            remainder: pool,
        });
    };

    let prize = stake
        .checked_mul(bid.number as i128)
        .ok_or(Error::Overflow)?;
    let remainder = pool.checked_sub(prize).ok_or(Error::Overflow)?;

    Ok(Payout {
        winner: Some(bid.participant),
        winning_number: bid.number,
        prize,
        remainder,
    })
}

/// Pay the prize to the leader and the remainder to `admin`.
pub fn execute(env: &Env, admin: &Address, payout: &Payout) -> Result<(), Error> {
    if let Some(winner) = &payout.winner {
        send(env, winner, payout.prize)?;
    }
    send(env, admin, payout.remainder)
}

/// Return a revealed participant's deposit.
pub fn refund(env: &Env, participant: &Address, amount: i128) -> Result<(), Error> {
    send(env, participant, amount)
}

/// Pull a commit payment from `participant` into the contract.
pub fn collect(env: &Env, participant: &Address, amount: i128) -> Result<(), Error> {
    let token = TokenClient::new(env, &storage::get_token(env));
    match token.try_transfer(participant, &env.current_contract_address(), &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

fn send(env: &Env, to: &Address, amount: i128) -> Result<(), Error> {
    // Zero legs happen when the prize is the whole pool.
    if amount == 0 {
        return Ok(());
    }
    let token = TokenClient::new(env, &storage::get_token(env));
    match token.try_transfer(&env.current_contract_address(), to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

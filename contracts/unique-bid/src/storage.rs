//! Typed accessors over `DataKey`.
//!
//! Config lives in `instance()`; everything tied to a round lives in
//! `persistent()` and has its TTL extended on every write.

use soroban_sdk::{Address, BytesN, Env, IntoVal, Map, Val, Vec};

use crate::{DataKey, Error, RoundData, Settlement, PERSISTENT_BUMP_LEDGERS};

// --- config ---

pub fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Admin) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

/// Require the stored admin's signature on this invocation.
pub fn require_admin_auth(env: &Env) -> Result<(), Error> {
    let admin = get_admin(env)?;
    admin.require_auth();
    Ok(())
}

pub fn get_token(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .expect("UniqueBid: token not set")
}

// --- round ---

pub fn get_round(env: &Env) -> Option<RoundData> {
    env.storage().persistent().get(&DataKey::Round)
}

pub fn set_round(env: &Env, round: &RoundData) {
    set_persistent(env, DataKey::Round, round);
}

pub fn get_roster(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Roster)
        .unwrap_or(Vec::new(env))
}

pub fn set_roster(env: &Env, roster: &Vec<Address>) {
    set_persistent(env, DataKey::Roster, roster);
}

// --- per participant ---

pub fn get_commitment(env: &Env, round_id: u32, participant: &Address) -> Option<BytesN<32>> {
    env.storage()
        .persistent()
        .get(&DataKey::Commitment(round_id, participant.clone()))
}

pub fn set_commitment(env: &Env, round_id: u32, participant: &Address, hash: &BytesN<32>) {
    set_persistent(env, DataKey::Commitment(round_id, participant.clone()), hash);
}

pub fn remove_commitment(env: &Env, round_id: u32, participant: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Commitment(round_id, participant.clone()));
}

// --- reveals ---

/// Revealed numbers of the current round, one entry for every seat.
pub fn get_reveals(env: &Env) -> Map<Address, u32> {
    env.storage()
        .persistent()
        .get(&DataKey::Reveals)
        .unwrap_or(Map::new(env))
}

pub fn set_reveals(env: &Env, reveals: &Map<Address, u32>) {
    set_persistent(env, DataKey::Reveals, reveals);
}

// --- settlement ---

pub fn get_last_settlement(env: &Env) -> Option<Settlement> {
    env.storage().persistent().get(&DataKey::LastSettlement)
}

pub fn set_last_settlement(env: &Env, settlement: &Settlement) {
    set_persistent(env, DataKey::LastSettlement, settlement);
}

fn set_persistent<T>(env: &Env, key: DataKey, value: &T)
where
    T: IntoVal<Env, Val>,
{
    env.storage().persistent().set(&key, value);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

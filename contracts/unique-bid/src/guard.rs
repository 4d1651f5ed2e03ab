//! Reentrancy lock shared by every mutating entry point.
//!
//! One flag for the whole contract, not per round: while `start_round`,
//! `commit`, `reveal` or `settle` is running, none of them can be entered
//! again, e.g. from a token hook invoked mid-transfer.

use soroban_sdk::Env;

use crate::{DataKey, Error};

pub fn enter(env: &Env) -> Result<(), Error> {
    if env.storage().instance().has(&DataKey::Locked) {
        return Err(Error::ReentrantCall);
    }
    env.storage().instance().set(&DataKey::Locked, &true);
    Ok(())
}

pub fn exit(env: &Env) {
    env.storage().instance().remove(&DataKey::Locked);
}

/// Run `body` holding the lock. The lock is released on success and on error.
pub fn guarded<T, F>(env: &Env, body: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error>,
{
    enter(env)?;
    let result = body();
    exit(env);
    result
}

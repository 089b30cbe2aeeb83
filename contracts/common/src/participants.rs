//! Epoch-versioned participant sets.
//!
//! Each ledger keeps, per chain id, a monotonically increasing epoch and one
//! immutable `(members, threshold)` set per epoch. Installing a set is the
//! only way the epoch moves, and it only ever moves by one.
//!
//! ## Storage key layout
//!
//! | Key tuple                             | Value              |
//! |---------------------------------------|--------------------|
//! | `("EPOCH", kind, chain_id)`           | `u64`              |
//! | `("PSET", kind, chain_id, epoch)`     | [`ParticipantSet`] |

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::CommonError;

const TTL_THRESHOLD: u32 = 17_280;
const TTL_EXTEND_TO: u32 = 518_400;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParticipantSet {
    pub members: Vec<Address>,
    pub threshold: u32,
}

impl ParticipantSet {
    pub fn contains(&self, who: &Address) -> bool {
        self.members.contains(who)
    }

    pub fn size(&self) -> u32 {
        self.members.len()
    }
}

/// Simple-majority quorum of `n` participants: 1 of 1, 2 of 2, 2 of 3, 3 of 4.
pub fn majority(n: u32) -> u32 {
    n / 2 + 1
}

fn epoch_key(kind: &Symbol, chain_id: u64) -> (Symbol, Symbol, u64) {
    (symbol_short!("EPOCH"), kind.clone(), chain_id)
}

fn set_key(kind: &Symbol, chain_id: u64, epoch: u64) -> (Symbol, Symbol, u64, u64) {
    (symbol_short!("PSET"), kind.clone(), chain_id, epoch)
}

pub fn current_epoch(env: &Env, kind: &Symbol, chain_id: u64) -> u64 {
    env.storage()
        .persistent()
        .get(&epoch_key(kind, chain_id))
        .unwrap_or(0)
}

pub fn get(env: &Env, kind: &Symbol, chain_id: u64, epoch: u64) -> Option<ParticipantSet> {
    env.storage()
        .persistent()
        .get(&set_key(kind, chain_id, epoch))
}

/// The set installed for the current epoch, if any.
pub fn active(env: &Env, kind: &Symbol, chain_id: u64) -> Option<ParticipantSet> {
    let epoch = current_epoch(env, kind, chain_id);
    if epoch == 0 {
        return None;
    }
    get(env, kind, chain_id, epoch)
}

pub fn is_active_member(env: &Env, kind: &Symbol, chain_id: u64, who: &Address) -> bool {
    active(env, kind, chain_id)
        .map(|set| set.contains(who))
        .unwrap_or(false)
}

/// Bumps the epoch of `chain_id` and stores `set` under the new epoch.
///
/// Threshold rules differ per ledger and are validated by the caller.
pub fn install(
    env: &Env,
    kind: &Symbol,
    chain_id: u64,
    set: &ParticipantSet,
) -> Result<u64, CommonError> {
    if set.members.is_empty() {
        return Err(CommonError::EmptyParticipantSet);
    }
    let epoch = current_epoch(env, kind, chain_id)
        .checked_add(1)
        .ok_or(CommonError::IntegerOutOfRange)?;

    let key = set_key(kind, chain_id, epoch);
    env.storage().persistent().set(&key, set);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    let epoch_key = epoch_key(kind, chain_id);
    env.storage().persistent().set(&epoch_key, &epoch);
    env.storage()
        .persistent()
        .extend_ttl(&epoch_key, TTL_THRESHOLD, TTL_EXTEND_TO);

    Ok(epoch)
}

use soroban_sdk::{symbol_short, Address, Env, Symbol};

const ALLOWED: Symbol = symbol_short!("ALLOWED");
const TTL_THRESHOLD: u32 = 5_184_000; // ~300 days (@ ~5s/ledger)
const TTL_EXTEND_TO: u32 = 10_368_000; // ~600 days (@ ~5s/ledger)

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Lets `address` enqueue outbound calls.
pub fn allow(env: &Env, address: &Address) {
    let key = (ALLOWED, address.clone());
    env.storage().persistent().set(&key, &true);
    extend_ttl(env, &key);
}

pub fn disallow(env: &Env, address: &Address) {
    env.storage()
        .persistent()
        .remove(&(ALLOWED, address.clone()));
}

/// Absent entries read as not allowed.
pub fn is_allowed(env: &Env, address: &Address) -> bool {
    let key = (ALLOWED, address.clone());
    let allowed = env.storage().persistent().get(&key).unwrap_or(false);
    if allowed {
        extend_ttl(env, &key);
    }
    allowed
}

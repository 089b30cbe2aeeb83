//! Deposit balances held in custody by a ledger contract.
//!
//! The asset itself sits in the contract's token balance; this module keeps
//! the per-address bookkeeping. `kind` separates independent ledgers living
//! in the same contract (e.g. signer deposits vs. relayer proxy deposits).

use soroban_sdk::{symbol_short, token, Address, Env, Symbol};

use crate::CommonError;

const TTL_THRESHOLD: u32 = 17_280;
const TTL_EXTEND_TO: u32 = 518_400;

fn balance_key(kind: &Symbol, who: &Address) -> (Symbol, Symbol, Address) {
    (symbol_short!("DEPO"), kind.clone(), who.clone())
}

pub fn balance(env: &Env, kind: &Symbol, who: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&balance_key(kind, who))
        .unwrap_or(0)
}

fn store(env: &Env, kind: &Symbol, who: &Address, amount: i128) {
    let key = balance_key(kind, who);
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Increase a balance without moving tokens. Returns the new balance.
pub fn credit(env: &Env, kind: &Symbol, who: &Address, amount: i128) -> Result<i128, CommonError> {
    if amount < 0 {
        return Err(CommonError::InvalidAmount);
    }
    let updated = balance(env, kind, who)
        .checked_add(amount)
        .ok_or(CommonError::IntegerOutOfRange)?;
    store(env, kind, who, updated);
    Ok(updated)
}

/// Decrease a balance without moving tokens. Returns the new balance.
pub fn debit(env: &Env, kind: &Symbol, who: &Address, amount: i128) -> Result<i128, CommonError> {
    if amount < 0 {
        return Err(CommonError::InvalidAmount);
    }
    let current = balance(env, kind, who);
    if current < amount {
        return Err(CommonError::InsufficientBalance);
    }
    let updated = current - amount;
    store(env, kind, who, updated);
    Ok(updated)
}

/// Pull `amount` of `asset` from `from` into custody and credit `recipient`.
pub fn deposit(
    env: &Env,
    kind: &Symbol,
    asset: &Address,
    from: &Address,
    recipient: &Address,
    amount: i128,
) -> Result<i128, CommonError> {
    if amount <= 0 {
        return Err(CommonError::InvalidAmount);
    }
    let updated = credit(env, kind, recipient, amount)?;
    token::Client::new(env, asset).transfer(from, &env.current_contract_address(), &amount);
    Ok(updated)
}

/// Debit `who` and release `amount` of `asset` from custody back to them.
pub fn withdraw(
    env: &Env,
    kind: &Symbol,
    asset: &Address,
    who: &Address,
    amount: i128,
) -> Result<i128, CommonError> {
    if amount <= 0 {
        return Err(CommonError::InvalidAmount);
    }
    let updated = debit(env, kind, who, amount)?;
    token::Client::new(env, asset).transfer(&env.current_contract_address(), who, &amount);
    Ok(updated)
}

/// Send `amount` of `asset` out of custody without touching any balance.
pub fn pay_out(env: &Env, asset: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        token::Client::new(env, asset).transfer(&env.current_contract_address(), to, &amount);
    }
}

#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::{access, CommonError};

const PAUSED: Symbol = symbol_short!("PAUSED");
const PAUSER: Symbol = symbol_short!("PAUSER");

/// Returns `true` when the contract is paused.
pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

/// Returns `CommonError::Paused` when the contract is paused.
///
/// Place this at the top of every state-mutating function that must honour
/// the pause.  View-only functions should **not** call this.
pub fn require_not_paused(env: &Env) -> Result<(), CommonError> {
    if is_paused(env) {
        return Err(CommonError::Paused);
    }
    Ok(())
}

pub fn pauser(env: &Env) -> Option<Address> {
    env.storage().instance().get(&PAUSER)
}

/// Replace the pauser. Owner only.
pub fn update_pauser(env: &Env, caller: &Address, new_pauser: &Address) -> Result<(), CommonError> {
    access::require_owner(env, caller)?;
    env.storage().instance().set(&PAUSER, new_pauser);
    env.events()
        .publish((symbol_short!("PAUSER"),), new_pauser.clone());
    Ok(())
}

fn require_pauser(env: &Env, caller: &Address) -> Result<(), CommonError> {
    caller.require_auth();
    match pauser(env) {
        Some(p) if p == *caller => Ok(()),
        _ => Err(CommonError::NotPauser),
    }
}

/// Pause the contract after verifying `caller` is the stored pauser.
///
/// Emits a `("PAUSED", caller)` event on success.
pub fn pause(env: &Env, caller: &Address) -> Result<(), CommonError> {
    require_pauser(env, caller)?;
    require_not_paused(env)?;
    env.storage().instance().set(&PAUSED, &true);
    env.events()
        .publish((symbol_short!("PAUSED"), caller.clone()), true);
    Ok(())
}

/// Unpause the contract after verifying `caller` is the stored pauser.
///
/// Emits an `("UNPAUSED", caller)` event on success.
pub fn unpause(env: &Env, caller: &Address) -> Result<(), CommonError> {
    require_pauser(env, caller)?;
    if !is_paused(env) {
        return Err(CommonError::NotPaused);
    }
    env.storage().instance().set(&PAUSED, &false);
    env.events()
        .publish((symbol_short!("UNPAUSED"), caller.clone()), true);
    Ok(())
}

#![allow(deprecated)] // events().publish migration tracked separately

//! Lifecycle flag and owner capability checks.
//!
//! Every ledger is created once through `init` and is governed afterwards by
//! a multisig address installed exactly once. Until the multisig exists the
//! contract's own address is the owner, so privileged calls are self-calls.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::CommonError;

const INITIALIZED: Symbol = symbol_short!("INIT");
const MULTISIG: Symbol = symbol_short!("MULTISIG");

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

/// Guard for every operation except `init` and the read-only views.
pub fn require_initialized(env: &Env) -> Result<(), CommonError> {
    if !is_initialized(env) {
        return Err(CommonError::NotInitialized);
    }
    Ok(())
}

pub fn require_not_initialized(env: &Env) -> Result<(), CommonError> {
    if is_initialized(env) {
        return Err(CommonError::AlreadyInitialized);
    }
    Ok(())
}

pub fn mark_initialized(env: &Env) {
    env.storage().instance().set(&INITIALIZED, &true);
}

pub fn multisig(env: &Env) -> Option<Address> {
    env.storage().instance().get(&MULTISIG)
}

/// The address allowed to perform privileged mutations.
pub fn owner(env: &Env) -> Address {
    multisig(env).unwrap_or_else(|| env.current_contract_address())
}

/// Authenticates `caller` and checks it is the current owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<(), CommonError> {
    caller.require_auth();
    if *caller != owner(env) {
        return Err(CommonError::AccessDenied);
    }
    Ok(())
}

/// Installs the multisig owner. Only the contract itself may do this, once.
pub fn set_multisig(env: &Env, caller: &Address, multisig: &Address) -> Result<(), CommonError> {
    require_owner(env, caller)?;
    if env.storage().instance().has(&MULTISIG) {
        return Err(CommonError::MultisigAlreadySet);
    }
    env.storage().instance().set(&MULTISIG, multisig);
    env.events()
        .publish((symbol_short!("MULTISIG"),), multisig.clone());
    Ok(())
}

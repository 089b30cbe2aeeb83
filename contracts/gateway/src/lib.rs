#![no_std]
#![allow(deprecated)]

//! # EVM-Caller Gateway
//!
//! Outbound call queue toward other chains. Allowed callers append
//! `(call_chain_id, execution_chain_id, caller, execution_contract,
//! calldata, nonce)` records that witnesses pick up and relay.
//!
//! Each record carries the nonce value the call consumed, i.e. the
//! counter before it was incremented.

mod allowance;

use common::{access, codec, pausable, CommonError};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, Env,
    String, Symbol,
};

// ── Storage key constants ─────────────────────────────────────────────────────

const CALL_CHAIN_ID: Symbol = symbol_short!("CHAIN_ID");
pub(crate) const EVENT_SIZE: Symbol = symbol_short!("EVT_SIZE");
pub(crate) const NONCE: Symbol = symbol_short!("NONCE");
const EVENT: Symbol = symbol_short!("EVENT");

const TTL_THRESHOLD: u32 = 17_280;
const TTL_EXTEND_TO: u32 = 518_400;

// ── Error codes ───────────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Paused = 3,
    NotPaused = 4,
    AccessDenied = 10,
    NotPauser = 11,
    MultisigAlreadySet = 12,
    NotAllowed = 13,
    InvalidCallChainId = 30,
    InvalidExecutionChainId = 31,
    InvalidExecutionContract = 32,
    InvalidCalldata = 33,
    CounterOverflow = 60,
}

impl From<CommonError> for ContractError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::NotInitialized => ContractError::NotInitialized,
            CommonError::AlreadyInitialized => ContractError::AlreadyInitialized,
            CommonError::Paused => ContractError::Paused,
            CommonError::NotPaused => ContractError::NotPaused,
            CommonError::NotPauser => ContractError::NotPauser,
            CommonError::MultisigAlreadySet => ContractError::MultisigAlreadySet,
            _ => ContractError::AccessDenied,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutboundCall {
    pub call_chain_id: u64,
    pub execution_chain_id: u64,
    pub caller: Address,
    pub execution_contract: String,
    pub calldata: String,
    pub nonce: u64,
}

impl OutboundCall {
    /// `call_chain_id__execution_chain_id__caller__contract__calldata__nonce`
    pub fn encode(&self, env: &Env) -> Bytes {
        codec::Joiner::new(env)
            .int(self.call_chain_id)
            .int(self.execution_chain_id)
            .address(&self.caller)
            .string(&self.execution_contract)
            .string(&self.calldata)
            .int(self.nonce)
            .finish()
    }
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct Gateway;

#[contractimpl]
impl Gateway {
    /// Bootstrap with the id of the chain this gateway lives on.
    pub fn init(env: Env, caller: Address, call_chain_id: u64) -> Result<(), ContractError> {
        access::require_not_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        codec::check_int(call_chain_id).map_err(|_| ContractError::InvalidCallChainId)?;
        env.storage().instance().set(&CALL_CHAIN_ID, &call_chain_id);
        env.storage().instance().set(&EVENT_SIZE, &0u64);
        env.storage().instance().set(&NONCE, &0u64);
        access::mark_initialized(&env);
        Ok(())
    }

    pub fn set_multisig(env: Env, caller: Address, multisig: Address) -> Result<(), ContractError> {
        access::set_multisig(&env, &caller, &multisig)?;
        Ok(())
    }

    pub fn update_pauser(env: Env, caller: Address, pauser: Address) -> Result<(), ContractError> {
        access::require_initialized(&env)?;
        pausable::update_pauser(&env, &caller, &pauser)?;
        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        access::require_initialized(&env)?;
        pausable::pause(&env, &caller)?;
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        access::require_initialized(&env)?;
        pausable::unpause(&env, &caller)?;
        Ok(())
    }

    pub fn allow(env: Env, caller: Address, who: Address) -> Result<(), ContractError> {
        access::require_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        allowance::allow(&env, &who);
        env.events().publish((symbol_short!("ALLOW"),), who);
        Ok(())
    }

    pub fn disallow(env: Env, caller: Address, who: Address) -> Result<(), ContractError> {
        access::require_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        allowance::disallow(&env, &who);
        env.events().publish((symbol_short!("DISALLOW"),), who);
        Ok(())
    }

    /// Enqueue a call to `execution_contract` on `execution_chain_id`.
    /// Returns the record's index.
    pub fn call(
        env: Env,
        caller: Address,
        execution_chain_id: u64,
        execution_contract: String,
        calldata: String,
    ) -> Result<u64, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        caller.require_auth();
        if !allowance::is_allowed(&env, &caller) {
            return Err(ContractError::NotAllowed);
        }
        codec::check_int(execution_chain_id)
            .map_err(|_| ContractError::InvalidExecutionChainId)?;
        codec::require_field(&execution_contract)
            .map_err(|_| ContractError::InvalidExecutionContract)?;
        codec::require_field(&calldata).map_err(|_| ContractError::InvalidCalldata)?;

        let idx = Self::get_event_size(env.clone());
        let nonce = Self::get_nonce(env.clone());
        let record = OutboundCall {
            call_chain_id: Self::call_chain_id(&env)?,
            execution_chain_id,
            caller,
            execution_contract,
            calldata,
            nonce,
        };

        let key = (EVENT, idx);
        env.storage().persistent().set(&key, &record);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        let next_idx = idx.checked_add(1).ok_or(ContractError::CounterOverflow)?;
        let next_nonce = nonce.checked_add(1).ok_or(ContractError::CounterOverflow)?;
        env.storage().instance().set(&EVENT_SIZE, &next_idx);
        env.storage().instance().set(&NONCE, &next_nonce);

        env.events().publish(
            (symbol_short!("CALL"), execution_chain_id, nonce),
            (record.caller, record.execution_contract),
        );
        Ok(idx)
    }

    // ── View functions ────────────────────────────────────────────────────────

    pub fn get_event(env: Env, idx: u64) -> Option<OutboundCall> {
        env.storage().persistent().get(&(EVENT, idx))
    }

    /// `__`-joined rendering of the record at `idx`.
    pub fn get_event_encoded(env: Env, idx: u64) -> Option<Bytes> {
        Self::get_event(env.clone(), idx).map(|record| record.encode(&env))
    }

    pub fn get_event_size(env: Env) -> u64 {
        env.storage().instance().get(&EVENT_SIZE).unwrap_or(0)
    }

    pub fn get_nonce(env: Env) -> u64 {
        env.storage().instance().get(&NONCE).unwrap_or(0)
    }

    pub fn get_call_chain_id(env: Env) -> Result<u64, ContractError> {
        Self::call_chain_id(&env)
    }

    pub fn is_allowed(env: Env, who: Address) -> bool {
        allowance::is_allowed(&env, &who)
    }

    pub fn get_multisig(env: Env) -> Option<Address> {
        access::multisig(&env)
    }

    pub fn get_pauser(env: Env) -> Option<Address> {
        pausable::pauser(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        pausable::is_paused(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        access::is_initialized(&env)
    }

    fn call_chain_id(env: &Env) -> Result<u64, ContractError> {
        env.storage()
            .instance()
            .get(&CALL_CHAIN_ID)
            .ok_or(ContractError::NotInitialized)
    }
}

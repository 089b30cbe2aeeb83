#![no_std]
#![allow(deprecated)]

//! # Executor Ledger
//!
//! Replays cross-chain calls on this chain once the signer group has signed
//! them. The group is identified by a single ed25519 public key; rotating it
//! requires signatures from both the outgoing and the incoming key.
//!
//! ## Call digest
//! ```text
//! keccak256( xdr( (caller_chain_id, execution_chain_id, nonce,
//!                  contract, function, args) ) )
//! ```
//! Each `(caller_chain_id, nonce)` executes at most once.

use common::{access, codec, pausable, CommonError};
use soroban_sdk::{
    contract, contracterror, contractimpl, symbol_short, xdr::ToXdr, Address, Bytes, BytesN, Env,
    Symbol, Val, Vec,
};

// ── Storage key constants ─────────────────────────────────────────────────────

const CHAIN_ID: Symbol = symbol_short!("CHAIN_ID");
const SIGNER_KEY: Symbol = symbol_short!("SIGNER");
const EXECUTED: Symbol = symbol_short!("EXECUTED");

const TTL_THRESHOLD: u32 = 17_280;
const TTL_EXTEND_TO: u32 = 518_400;

/// Domain tag of the outgoing key's handover signature.
pub const OLD_PREFIX: &[u8] = b"<<<OLD_SIGNER>>>";
/// Domain tag of the incoming key's handover signature.
pub const NEW_PREFIX: &[u8] = b"<<<NEW_SIGNER>>>";

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
    InvalidChainId = 30,
    InvalidCallerChainId = 31,
    InvalidNonce = 32,
    /// Handover to the key that is already installed.
    SameSignerKey = 33,
    /// The call targets another execution chain.
    ForeignChain = 60,
    AlreadyExecuted = 61,
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

/// `prefix ‖ current ‖ candidate`, the message each side of a handover signs.
pub fn handover_message(
    env: &Env,
    prefix: &[u8],
    current: &BytesN<32>,
    candidate: &BytesN<32>,
) -> Bytes {
    let mut msg = Bytes::from_slice(env, prefix);
    msg.append(&Bytes::from(current.clone()));
    msg.append(&Bytes::from(candidate.clone()));
    msg
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct Executor;

#[contractimpl]
impl Executor {
    /// Bootstrap with this chain's id, a pauser and the signer group key.
    pub fn init(
        env: Env,
        caller: Address,
        chain_id: u64,
        pauser: Address,
        signer_public_key: BytesN<32>,
    ) -> Result<(), ContractError> {
        access::require_not_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        codec::check_int(chain_id).map_err(|_| ContractError::InvalidChainId)?;

        env.storage().instance().set(&CHAIN_ID, &chain_id);
        env.storage().instance().set(&SIGNER_KEY, &signer_public_key);
        pausable::update_pauser(&env, &caller, &pauser)?;
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

    /// Rotate the signer group key.
    ///
    /// `old_sig` must be the current key's signature over
    /// `OLD_PREFIX ‖ current ‖ new_key`, `new_sig` the new key's signature
    /// over `NEW_PREFIX ‖ current ‖ new_key`. An invalid signature aborts
    /// the invocation.
    pub fn update_signer(
        env: Env,
        new_key: BytesN<32>,
        old_sig: BytesN<64>,
        new_sig: BytesN<64>,
    ) -> Result<(), ContractError> {
        access::require_initialized(&env)?;
        let current = Self::signer_key(&env)?;
        if current == new_key {
            return Err(ContractError::SameSignerKey);
        }

        let crypto = env.crypto();
        crypto.ed25519_verify(
            &current,
            &handover_message(&env, OLD_PREFIX, &current, &new_key),
            &old_sig,
        );
        crypto.ed25519_verify(
            &new_key,
            &handover_message(&env, NEW_PREFIX, &current, &new_key),
            &new_sig,
        );

        env.storage().instance().set(&SIGNER_KEY, &new_key);
        env.events()
            .publish((symbol_short!("SIGNER"),), (current, new_key));
        Ok(())
    }

    /// Verify the group signature over a relayed call and invoke it.
    ///
    /// Returns whatever the target function returns.
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        env: Env,
        caller_chain_id: u64,
        execution_chain_id: u64,
        nonce: u64,
        contract: Address,
        function: Symbol,
        args: Vec<Val>,
        signature: BytesN<64>,
    ) -> Result<Val, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        codec::check_int(caller_chain_id).map_err(|_| ContractError::InvalidCallerChainId)?;
        codec::check_int(execution_chain_id).map_err(|_| ContractError::InvalidChainId)?;
        codec::check_int(nonce).map_err(|_| ContractError::InvalidNonce)?;
        if execution_chain_id != Self::chain_id(&env)? {
            return Err(ContractError::ForeignChain);
        }

        let executed_key = (EXECUTED, caller_chain_id, nonce);
        if env.storage().persistent().has(&executed_key) {
            return Err(ContractError::AlreadyExecuted);
        }

        let digest = Self::hash_call(
            env.clone(),
            caller_chain_id,
            execution_chain_id,
            nonce,
            contract.clone(),
            function.clone(),
            args.clone(),
        );
        env.crypto()
            .ed25519_verify(&Self::signer_key(&env)?, &digest.into(), &signature);

        env.storage().persistent().set(&executed_key, &true);
        env.storage()
            .persistent()
            .extend_ttl(&executed_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        let result: Val = env.invoke_contract(&contract, &function, args);
        env.events().publish(
            (symbol_short!("EXECUTED"), caller_chain_id, nonce),
            (contract, function),
        );
        Ok(result)
    }

    // ── View functions ────────────────────────────────────────────────────────

    /// Digest the signer group signs for a relayed call.
    pub fn hash_call(
        env: Env,
        caller_chain_id: u64,
        execution_chain_id: u64,
        nonce: u64,
        contract: Address,
        function: Symbol,
        args: Vec<Val>,
    ) -> BytesN<32> {
        let payload = (
            caller_chain_id,
            execution_chain_id,
            nonce,
            contract,
            function,
            args,
        )
            .to_xdr(&env);
        env.crypto().keccak256(&payload).into()
    }

    pub fn is_executed(env: Env, caller_chain_id: u64, nonce: u64) -> bool {
        env.storage()
            .persistent()
            .has(&(EXECUTED, caller_chain_id, nonce))
    }

    pub fn get_chain_id(env: Env) -> Result<u64, ContractError> {
        Self::chain_id(&env)
    }

    pub fn get_signer_public_key(env: Env) -> Result<BytesN<32>, ContractError> {
        Self::signer_key(&env)
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

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn chain_id(env: &Env) -> Result<u64, ContractError> {
        env.storage()
            .instance()
            .get(&CHAIN_ID)
            .ok_or(ContractError::NotInitialized)
    }

    fn signer_key(env: &Env) -> Result<BytesN<32>, ContractError> {
        env.storage()
            .instance()
            .get(&SIGNER_KEY)
            .ok_or(ContractError::NotInitialized)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

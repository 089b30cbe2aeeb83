#![no_std]
#![allow(deprecated)]

//! # Signer Ledger
//!
//! Collects t-of-n threshold signature shares for confirmed cross-chain
//! events, one signing round per `(execution_chain_id, event_id)`.
//!
//! - Signer sets rotate per execution chain; every rotation bumps the epoch
//!   and installs `(signers, t, group_public_key)` for the new epoch.
//! - Signers must hold at least `min_sec_depo` of security deposit to take
//!   part. A deposit is locked while its owner has an R share in an open
//!   round and cannot be withdrawn.
//! - A round that stalls in S collection can be reset by any active signer
//!   once `reset_block_delta` ledgers have passed. Every S contributor other
//!   than the resetter forfeits a share of `punishment` to the resetter.
//! - Completed rounds land in the per-chain ready index and mint rewards to
//!   the event submitter and the first two S contributors.

mod events;
mod round;

pub use round::{Outcome, RoundStatus, SigningRound};

use common::{
    access, codec, deposit, participants, pausable, CommonError, EventOracleClient, EventType,
    ParticipantSet, RewardMinterClient,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, Env,
    String, Symbol, Vec,
};

// ── Storage key constants ─────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const GROUP_KEY: Symbol = symbol_short!("GRP_KEY");
const LOCKS: Symbol = symbol_short!("LOCKS");
const READY_SIZE: Symbol = symbol_short!("READY_SZ");
const READY: Symbol = symbol_short!("READY");

/// Participant-set kind for signers.
const SIGNER: Symbol = symbol_short!("SIGNER");
/// Deposit ledger kind for signer security deposits.
const SECURITY: Symbol = symbol_short!("SEC_DEPO");

const TTL_THRESHOLD: u32 = 17_280;
const TTL_EXTEND_TO: u32 = 518_400;

/// Smallest threshold a signer set may declare.
pub const MIN_THRESHOLD: u32 = 2;

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
    NotActiveSigner = 13,
    /// Security deposit is locked by an open signing round.
    Locked = 14,
    InvalidEventId = 30,
    InvalidExecutionChainId = 31,
    InvalidR = 32,
    InvalidS = 33,
    InvalidRSigma = 34,
    InvalidSSigma = 35,
    InvalidThreshold = 36,
    InvalidGroupPublicKey = 37,
    InvalidAmount = 38,
    InvalidConfig = 39,
    EmptySignerSet = 40,
    EventNotConfirmed = 60,
    IncorrectRoundStatus = 61,
    RAlreadySubmitted = 62,
    SAlreadySubmitted = 63,
    RNotSubmitted = 64,
    RSigmaMismatch = 65,
    InsufficientSecurityDeposit = 66,
    InsufficientBalance = 67,
    /// `reset` before `start_block + reset_block_delta` has passed.
    ResetTooEarly = 68,
    NoActiveSigners = 69,
    /// Release of a deposit lock that was never taken.
    LockImbalance = 70,
}

impl From<CommonError> for ContractError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::NotInitialized => ContractError::NotInitialized,
            CommonError::AlreadyInitialized => ContractError::AlreadyInitialized,
            CommonError::Paused => ContractError::Paused,
            CommonError::NotPaused => ContractError::NotPaused,
            CommonError::AccessDenied => ContractError::AccessDenied,
            CommonError::NotPauser => ContractError::NotPauser,
            CommonError::MultisigAlreadySet => ContractError::MultisigAlreadySet,
            CommonError::EmptyParticipantSet => ContractError::EmptySignerSet,
            CommonError::InsufficientBalance => ContractError::InsufficientBalance,
            CommonError::InvalidAmount
            | CommonError::EmptyField
            | CommonError::FieldTooLong
            | CommonError::ContainsSeparator
            | CommonError::IntegerOutOfRange => ContractError::InvalidAmount,
        }
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignerConfig {
    /// Event oracle answering whether an event is confirmed.
    pub witness_oracle: Address,
    pub reward_minter: Address,
    /// Native asset backing security deposits.
    pub deposit_asset: Address,
    /// Minimum security deposit to submit R, S or reset.
    pub min_sec_depo: i128,
    /// Total forfeited by the stalling S contributors on reset.
    pub punishment: i128,
    /// Ledgers a round may sit in S collection before it can be reset.
    pub reset_block_delta: u32,
    /// Reward per recipient for completed Waves-originated rounds.
    pub waves_reward: i128,
    /// Reward per recipient for completed EVM-originated rounds.
    pub evm_reward: i128,
}

impl SignerConfig {
    fn validate(&self) -> Result<(), ContractError> {
        if self.min_sec_depo < 0
            || self.punishment < 0
            || self.waves_reward < 0
            || self.evm_reward < 0
        {
            return Err(ContractError::InvalidConfig);
        }
        Ok(())
    }
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct SignerLedger;

#[contractimpl]
impl SignerLedger {
    // ── Lifecycle & administration ────────────────────────────────────────────

    /// Bootstrap the ledger. Self-call only, once.
    pub fn init(env: Env, caller: Address, config: SignerConfig) -> Result<(), ContractError> {
        access::require_not_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        config.validate()?;
        env.storage().instance().set(&CONFIG, &config);
        access::mark_initialized(&env);
        Ok(())
    }

    pub fn set_multisig(env: Env, caller: Address, multisig: Address) -> Result<(), ContractError> {
        access::set_multisig(&env, &caller, &multisig)?;
        Ok(())
    }

    pub fn update_config(env: Env, caller: Address, config: SignerConfig) -> Result<(), ContractError> {
        access::require_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        config.validate()?;
        env.storage().instance().set(&CONFIG, &config);
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

    /// Install a new signer set for `execution_chain_id`. Returns the new epoch.
    ///
    /// Requires `2 <= t <= len(signers)` and a separator-free group key.
    pub fn set_active_signers(
        env: Env,
        caller: Address,
        execution_chain_id: u64,
        signers: Vec<Address>,
        t: u32,
        group_public_key: String,
    ) -> Result<u64, ContractError> {
        access::require_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        codec::check_int(execution_chain_id)
            .map_err(|_| ContractError::InvalidExecutionChainId)?;
        if signers.is_empty() {
            return Err(ContractError::EmptySignerSet);
        }
        if t < MIN_THRESHOLD || t > signers.len() {
            return Err(ContractError::InvalidThreshold);
        }
        codec::require_field(&group_public_key)
            .map_err(|_| ContractError::InvalidGroupPublicKey)?;

        let set = ParticipantSet {
            members: signers,
            threshold: t,
        };
        let epoch = participants::install(&env, &SIGNER, execution_chain_id, &set)?;
        let key = (GROUP_KEY, execution_chain_id, epoch);
        env.storage().persistent().set(&key, &group_public_key);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

        events::publish_signers_set(&env, execution_chain_id, epoch, set.size(), t);
        Ok(epoch)
    }

    // ── Security deposits ─────────────────────────────────────────────────────

    /// Deposit native asset from `from` on behalf of `recipient`.
    pub fn add_security_deposit(
        env: Env,
        from: Address,
        recipient: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        from.require_auth();
        let config = Self::config(&env)?;
        let balance = deposit::deposit(
            &env,
            &SECURITY,
            &config.deposit_asset,
            &from,
            &recipient,
            amount,
        )?;
        events::publish_deposit(&env, &recipient, amount, balance);
        Ok(balance)
    }

    /// Withdraw unlocked security deposit back to `caller`.
    pub fn sub_security_deposit(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        access::require_initialized(&env)?;
        caller.require_auth();
        if Self::get_locks(env.clone(), caller.clone()) > 0 {
            return Err(ContractError::Locked);
        }
        let config = Self::config(&env)?;
        let balance = deposit::withdraw(&env, &SECURITY, &config.deposit_asset, &caller, amount)?;
        events::publish_withdrawal(&env, &caller, amount, balance);
        Ok(balance)
    }

    // ── Signing rounds ────────────────────────────────────────────────────────

    /// Contribute `signer`'s R share to the round of a confirmed event.
    pub fn submit_r(
        env: Env,
        signer: Address,
        event_id: u64,
        execution_chain_id: u64,
        r: String,
    ) -> Result<RoundStatus, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        signer.require_auth();
        Self::check_ids(event_id, execution_chain_id)?;
        codec::require_field(&r).map_err(|_| ContractError::InvalidR)?;

        let config = Self::config(&env)?;
        if !EventOracleClient::new(&env, &config.witness_oracle)
            .is_confirmed(&execution_chain_id, &event_id)
        {
            return Err(ContractError::EventNotConfirmed);
        }
        let set = Self::require_eligible(&env, &config, execution_chain_id, &signer)?;

        let mut round = round::load(&env, execution_chain_id, event_id)
            .unwrap_or_else(|| SigningRound::new(&env));
        let outcome = round.submit_r(&signer, &r, set.threshold, env.ledger().sequence())?;
        if outcome == Outcome::Unchanged {
            return Ok(round.status);
        }

        Self::lock(&env, &signer)?;
        round::store(&env, execution_chain_id, event_id, &round);
        events::publish_r_submitted(&env, execution_chain_id, event_id, &signer, round.status);
        Ok(round.status)
    }

    /// Contribute `signer`'s S share against the aggregated `r_sigma`.
    ///
    /// The `t`-th S completes the round with `s_sigma` as its combined
    /// signature, releases every R contributor's lock and mints rewards.
    pub fn submit_s(
        env: Env,
        signer: Address,
        event_id: u64,
        execution_chain_id: u64,
        r_sigma: String,
        s: String,
        s_sigma: String,
    ) -> Result<RoundStatus, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        signer.require_auth();
        Self::check_ids(event_id, execution_chain_id)?;
        codec::require_field(&r_sigma).map_err(|_| ContractError::InvalidRSigma)?;
        codec::require_field(&s).map_err(|_| ContractError::InvalidS)?;
        codec::require_field(&s_sigma).map_err(|_| ContractError::InvalidSSigma)?;

        let config = Self::config(&env)?;
        let set = Self::require_eligible(&env, &config, execution_chain_id, &signer)?;

        let mut round = round::load(&env, execution_chain_id, event_id)
            .ok_or(ContractError::IncorrectRoundStatus)?;
        let outcome = round.submit_s(&signer, &r_sigma, &s, &s_sigma, set.threshold)?;
        match outcome {
            Outcome::Unchanged => return Ok(round.status),
            Outcome::Recorded => {}
            Outcome::Advanced => {
                for contributor in round.r_signers.iter() {
                    Self::unlock(&env, &contributor)?;
                }
                Self::push_ready(&env, execution_chain_id, event_id)?;
                Self::reward(&env, &config, execution_chain_id, event_id, &round.s_signers);
                events::publish_round_done(&env, execution_chain_id, event_id, &r_sigma, &s_sigma);
            }
        }

        round::store(&env, execution_chain_id, event_id, &round);
        events::publish_s_submitted(&env, execution_chain_id, event_id, &signer, round.status);
        Ok(round.status)
    }

    /// Restart a round stuck in S collection, reseeding R with `caller`'s
    /// share. Allowed once `sequence > start_block + reset_block_delta`.
    ///
    /// Each of the `k` S contributors other than `caller` forfeits
    /// `punishment / k` (capped at their balance) to `caller`.
    pub fn reset(
        env: Env,
        caller: Address,
        event_id: u64,
        execution_chain_id: u64,
        r: String,
    ) -> Result<i128, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        caller.require_auth();
        Self::check_ids(event_id, execution_chain_id)?;
        codec::require_field(&r).map_err(|_| ContractError::InvalidR)?;

        let config = Self::config(&env)?;
        let mut round = round::load(&env, execution_chain_id, event_id)
            .ok_or(ContractError::IncorrectRoundStatus)?;
        let effects = round.reset(
            &env,
            &caller,
            &r,
            env.ledger().sequence(),
            config.reset_block_delta,
        )?;
        Self::require_eligible(&env, &config, execution_chain_id, &caller)?;

        let mut collected: i128 = 0;
        let punished = effects.punished.len();
        if punished > 0 && config.punishment > 0 {
            let share = config.punishment / i128::from(punished);
            for signer in effects.punished.iter() {
                let taken = share.min(deposit::balance(&env, &SECURITY, &signer));
                if taken > 0 {
                    deposit::debit(&env, &SECURITY, &signer, taken)?;
                    collected += taken;
                    events::publish_punishment(&env, &signer, taken, &caller);
                }
            }
            deposit::credit(&env, &SECURITY, &caller, collected)?;
        }

        for signer in effects.released.iter() {
            Self::unlock(&env, &signer)?;
        }
        if effects.caller_newly_locked {
            Self::lock(&env, &caller)?;
        }

        round::store(&env, execution_chain_id, event_id, &round);
        events::publish_round_reset(
            &env,
            execution_chain_id,
            event_id,
            &caller,
            &effects.punished,
        );
        Ok(collected)
    }

    // ── View functions ────────────────────────────────────────────────────────

    pub fn get_epoch(env: Env, execution_chain_id: u64) -> u64 {
        participants::current_epoch(&env, &SIGNER, execution_chain_id)
    }

    pub fn get_signers(env: Env, execution_chain_id: u64, epoch: u64) -> Option<Vec<Address>> {
        participants::get(&env, &SIGNER, execution_chain_id, epoch).map(|set| set.members)
    }

    /// `a__b__c` rendering of a signer set, by address string.
    pub fn get_signers_encoded(env: Env, execution_chain_id: u64, epoch: u64) -> Option<Bytes> {
        let set = participants::get(&env, &SIGNER, execution_chain_id, epoch)?;
        let mut joiner = codec::Joiner::new(&env);
        for member in set.members.iter() {
            joiner = joiner.address(&member);
        }
        Some(joiner.finish())
    }

    pub fn get_t(env: Env, execution_chain_id: u64, epoch: u64) -> Option<u32> {
        participants::get(&env, &SIGNER, execution_chain_id, epoch).map(|set| set.threshold)
    }

    pub fn get_group_public_key(env: Env, execution_chain_id: u64, epoch: u64) -> Option<String> {
        env.storage()
            .persistent()
            .get(&(GROUP_KEY, execution_chain_id, epoch))
    }

    pub fn get_round(env: Env, execution_chain_id: u64, event_id: u64) -> Option<SigningRound> {
        round::load(&env, execution_chain_id, event_id)
    }

    pub fn get_round_status(env: Env, execution_chain_id: u64, event_id: u64) -> RoundStatus {
        round::load(&env, execution_chain_id, event_id)
            .map(|r| r.status)
            .unwrap_or(RoundStatus::Idle)
    }

    /// R shares of a round, `__`-joined in submission order.
    pub fn get_r(env: Env, execution_chain_id: u64, event_id: u64) -> Bytes {
        round::load(&env, execution_chain_id, event_id)
            .map(|r| codec::join_strings(&env, &r.r_values))
            .unwrap_or(Bytes::new(&env))
    }

    /// S shares of a round, `__`-joined in submission order.
    pub fn get_s(env: Env, execution_chain_id: u64, event_id: u64) -> Bytes {
        round::load(&env, execution_chain_id, event_id)
            .map(|r| codec::join_strings(&env, &r.s_values))
            .unwrap_or(Bytes::new(&env))
    }

    pub fn get_ready_count(env: Env, execution_chain_id: u64) -> u64 {
        env.storage()
            .persistent()
            .get(&(READY_SIZE, execution_chain_id))
            .unwrap_or(0)
    }

    /// Up to `limit` ready event ids starting at position `start`.
    pub fn get_ready_events(env: Env, execution_chain_id: u64, start: u64, limit: u32) -> Vec<u64> {
        let count = Self::get_ready_count(env.clone(), execution_chain_id);
        let end = count.min(start.saturating_add(u64::from(limit)));
        let mut out = Vec::new(&env);
        let mut idx = start;
        while idx < end {
            if let Some(event_id) = env
                .storage()
                .persistent()
                .get::<_, u64>(&(READY, execution_chain_id, idx))
            {
                out.push_back(event_id);
            }
            idx += 1;
        }
        out
    }

    pub fn get_security_deposit(env: Env, who: Address) -> i128 {
        deposit::balance(&env, &SECURITY, &who)
    }

    /// Number of open rounds holding an R share from `who`.
    pub fn get_locks(env: Env, who: Address) -> u32 {
        env.storage().persistent().get(&(LOCKS, who)).unwrap_or(0)
    }

    pub fn get_config(env: Env) -> Result<SignerConfig, ContractError> {
        Self::config(&env)
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

    fn config(env: &Env) -> Result<SignerConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    fn check_ids(event_id: u64, execution_chain_id: u64) -> Result<(), ContractError> {
        codec::check_int(event_id).map_err(|_| ContractError::InvalidEventId)?;
        codec::check_int(execution_chain_id).map_err(|_| ContractError::InvalidExecutionChainId)?;
        Ok(())
    }

    /// Active set of the chain, provided `who` is a member with enough deposit.
    fn require_eligible(
        env: &Env,
        config: &SignerConfig,
        execution_chain_id: u64,
        who: &Address,
    ) -> Result<ParticipantSet, ContractError> {
        let set = participants::active(env, &SIGNER, execution_chain_id)
            .ok_or(ContractError::NoActiveSigners)?;
        if !set.contains(who) {
            return Err(ContractError::NotActiveSigner);
        }
        if deposit::balance(env, &SECURITY, who) < config.min_sec_depo {
            return Err(ContractError::InsufficientSecurityDeposit);
        }
        Ok(set)
    }

    fn lock(env: &Env, who: &Address) -> Result<(), ContractError> {
        let key = (LOCKS, who.clone());
        let locks: u32 = env.storage().persistent().get(&key).unwrap_or(0);
        let updated = locks.checked_add(1).ok_or(ContractError::InvalidAmount)?;
        env.storage().persistent().set(&key, &updated);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        Ok(())
    }

    fn unlock(env: &Env, who: &Address) -> Result<(), ContractError> {
        let key = (LOCKS, who.clone());
        let locks: u32 = env.storage().persistent().get(&key).unwrap_or(0);
        let updated = locks.checked_sub(1).ok_or(ContractError::LockImbalance)?;
        env.storage().persistent().set(&key, &updated);
        Ok(())
    }

    fn push_ready(env: &Env, execution_chain_id: u64, event_id: u64) -> Result<(), ContractError> {
        let size_key = (READY_SIZE, execution_chain_id);
        let idx: u64 = env.storage().persistent().get(&size_key).unwrap_or(0);
        let entry_key = (READY, execution_chain_id, idx);
        env.storage().persistent().set(&entry_key, &event_id);
        env.storage()
            .persistent()
            .extend_ttl(&entry_key, TTL_THRESHOLD, TTL_EXTEND_TO);
        let next = idx.checked_add(1).ok_or(ContractError::InvalidAmount)?;
        env.storage().persistent().set(&size_key, &next);
        env.storage()
            .persistent()
            .extend_ttl(&size_key, TTL_THRESHOLD, TTL_EXTEND_TO);
        Ok(())
    }

    /// Mints the per-type reward to `[submitter, s_signers[0], s_signers[1]]`.
    fn reward(
        env: &Env,
        config: &SignerConfig,
        execution_chain_id: u64,
        event_id: u64,
        s_signers: &Vec<Address>,
    ) {
        let oracle = EventOracleClient::new(env, &config.witness_oracle);
        let amount = match oracle.event_type(&execution_chain_id, &event_id) {
            Some(EventType::Evm) => config.evm_reward,
            _ => config.waves_reward,
        };
        if amount <= 0 {
            return;
        }

        let mut recipients = Vec::new(env);
        if let Some(submitter) = oracle.event_submitter(&execution_chain_id, &event_id) {
            recipients.push_back(submitter);
        }
        for signer in s_signers.iter().take(2) {
            recipients.push_back(signer);
        }
        RewardMinterClient::new(env, &config.reward_minter).mint_many(&recipients, &amount);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#![no_std]
#![allow(deprecated)]

//! # Witness Ledger
//!
//! Records cross-chain call events submitted by relayers and lets the active
//! witness set of the source chain vote each one to a terminal decision.
//!
//! - **Submission** escrows `proxy_deposit_per_event` from the submitter's
//!   proxy deposit and records the event as `Processing`, deduplicated by
//!   its keccak content hash.
//! - **Voting** is a simple majority of the witness set pinned at
//!   submission: 1 of 1, 2 of 2, 2 of 3, 3 of 4.
//! - **Confirmed** events refund the escrow and mint `witness_reward` to
//!   every witness that voted. **Rejected** events forfeit the escrow to the
//!   multisig.
//!
//! The ledger also serves the event-oracle views the signer ledger queries.

mod event;
mod events;

pub use event::{
    CallBody, CallEvent, CallPayload, EventStatus, EvmCallEvent, WavesCall, WavesCallEvent,
};

use common::{
    access, codec, deposit, participants, pausable, CommonError, EventType, ParticipantSet,
    RewardMinterClient,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, BytesN,
    Env, Symbol, Vec,
};

// ── Storage key constants ─────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const EVENT_SIZE: Symbol = symbol_short!("EVT_SIZE");
const EVENT: Symbol = symbol_short!("EVENT");
const EVENT_HASH: Symbol = symbol_short!("EVT_HASH");
const VOTE: Symbol = symbol_short!("VOTE");
const SUBMITTER_EVENTS: Symbol = symbol_short!("SUB_EVTS");

/// Participant-set kind for witnesses.
const WITNESS: Symbol = symbol_short!("WITNESS");
/// Deposit ledger kind for relayer proxy deposits.
const PROXY: Symbol = symbol_short!("PROXY");

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
    NotActiveWitness = 13,
    EventNotFound = 20,
    InvalidCallerChainId = 30,
    InvalidExecutionChainId = 31,
    InvalidNonce = 32,
    InvalidBlockNumber = 33,
    InvalidCaller = 34,
    InvalidExecutionContract = 35,
    InvalidFunctionName = 36,
    InvalidArgs = 37,
    InvalidCalldata = 38,
    InvalidTxHash = 39,
    InvalidEventIdx = 40,
    InvalidChainId = 41,
    InvalidAmount = 42,
    InvalidConfig = 43,
    IncorrectStatus = 44,
    EmptyWitnessSet = 45,
    DuplicateWitness = 46,
    AlreadyExists = 60,
    AlreadyPublished = 61,
    AlreadyDecided = 62,
    InsufficientProxyDeposit = 63,
    InsufficientBalance = 64,
    NoActiveWitnesses = 65,
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
            CommonError::EmptyParticipantSet => ContractError::EmptyWitnessSet,
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
pub struct WitnessConfig {
    /// Native asset backing proxy deposits.
    pub deposit_asset: Address,
    /// Reward token minter paid out on confirmation.
    pub reward_minter: Address,
    /// Escrow taken from the submitter for every event.
    pub proxy_deposit_per_event: i128,
    /// Minted to each voting witness once an event is confirmed.
    pub witness_reward: i128,
}

impl WitnessConfig {
    fn validate(&self) -> Result<(), ContractError> {
        if self.proxy_deposit_per_event < 0 || self.witness_reward < 0 {
            return Err(ContractError::InvalidConfig);
        }
        Ok(())
    }
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct WitnessLedger;

#[contractimpl]
impl WitnessLedger {
    // ── Lifecycle & administration ────────────────────────────────────────────

    /// Bootstrap the ledger. Self-call only, once.
    pub fn init(env: Env, caller: Address, config: WitnessConfig) -> Result<(), ContractError> {
        access::require_not_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        config.validate()?;
        env.storage().instance().set(&CONFIG, &config);
        env.storage().instance().set(&EVENT_SIZE, &0u64);
        access::mark_initialized(&env);
        Ok(())
    }

    pub fn set_multisig(env: Env, caller: Address, multisig: Address) -> Result<(), ContractError> {
        access::set_multisig(&env, &caller, &multisig)?;

        // Escrow forfeited before the multisig existed is handed over now.
        let ledger = env.current_contract_address();
        let held = deposit::balance(&env, &PROXY, &ledger);
        if held > 0 {
            let config = Self::config(&env)?;
            deposit::debit(&env, &PROXY, &ledger, held)?;
            deposit::pay_out(&env, &config.deposit_asset, &multisig, held);
            events::publish_forfeits_released(&env, &multisig, held);
        }
        Ok(())
    }

    pub fn update_config(env: Env, caller: Address, config: WitnessConfig) -> Result<(), ContractError> {
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

    /// Install a new witness set for `chain_id`, bumping its epoch.
    ///
    /// The decision quorum is the simple majority of the set.
    pub fn set_active_witnesses(
        env: Env,
        caller: Address,
        chain_id: u64,
        witnesses: Vec<Address>,
    ) -> Result<u64, ContractError> {
        access::require_initialized(&env)?;
        access::require_owner(&env, &caller)?;
        codec::check_int(chain_id).map_err(|_| ContractError::InvalidChainId)?;
        if witnesses.is_empty() {
            return Err(ContractError::EmptyWitnessSet);
        }
        for (i, w) in witnesses.iter().enumerate() {
            if witnesses.first_index_of(&w) != Some(i as u32) {
                return Err(ContractError::DuplicateWitness);
            }
        }

        let set = ParticipantSet {
            threshold: participants::majority(witnesses.len()),
            members: witnesses,
        };
        let epoch = participants::install(&env, &WITNESS, chain_id, &set)?;
        events::publish_witnesses_set(&env, chain_id, epoch, set.size());
        Ok(epoch)
    }

    // ── Proxy security deposits ───────────────────────────────────────────────

    /// Deposit native asset from `from` on behalf of `recipient`.
    pub fn add_proxy_security_deposit(
        env: Env,
        from: Address,
        recipient: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        from.require_auth();
        let config = Self::config(&env)?;
        let balance =
            deposit::deposit(&env, &PROXY, &config.deposit_asset, &from, &recipient, amount)?;
        events::publish_proxy_deposit(&env, &recipient, amount, balance);
        Ok(balance)
    }

    /// Withdraw free proxy deposit back to `caller`.
    pub fn sub_proxy_security_deposit(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        access::require_initialized(&env)?;
        caller.require_auth();
        let config = Self::config(&env)?;
        let balance = deposit::withdraw(&env, &PROXY, &config.deposit_asset, &caller, amount)?;
        events::publish_proxy_withdrawal(&env, &caller, amount, balance);
        Ok(balance)
    }

    // ── Event submission ──────────────────────────────────────────────────────

    /// Record a call observed on a Waves-style chain. Returns its index.
    pub fn submit_waves_call_event(
        env: Env,
        submitter: Address,
        event: WavesCallEvent,
    ) -> Result<u64, ContractError> {
        Self::submit(&env, &submitter, CallBody::from(event))
    }

    /// Record a call observed on an EVM chain. Returns its index.
    pub fn submit_evm_call_event(
        env: Env,
        submitter: Address,
        event: EvmCallEvent,
    ) -> Result<u64, ContractError> {
        Self::submit(&env, &submitter, CallBody::from(event))
    }

    // ── Voting ────────────────────────────────────────────────────────────────

    /// Cast `witness`'s vote (`Confirmed` or `Rejected`) on event `event_idx`.
    ///
    /// Returns the event status after the vote; the first side to reach the
    /// majority quorum decides the event and closes voting.
    pub fn publish_event_status(
        env: Env,
        witness: Address,
        event_idx: u64,
        status: EventStatus,
    ) -> Result<EventStatus, ContractError> {
        access::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;
        witness.require_auth();

        codec::check_int(event_idx).map_err(|_| ContractError::InvalidEventIdx)?;
        if event_idx >= Self::get_event_count(env.clone()) {
            return Err(ContractError::EventNotFound);
        }
        if !matches!(status, EventStatus::Confirmed | EventStatus::Rejected) {
            return Err(ContractError::IncorrectStatus);
        }

        let mut event = Self::load_event(&env, event_idx).ok_or(ContractError::EventNotFound)?;
        if event.status != EventStatus::Processing {
            return Err(ContractError::AlreadyDecided);
        }

        let set = participants::get(
            &env,
            &WITNESS,
            event.body.caller_chain_id,
            event.witness_epoch,
        )
        .ok_or(ContractError::NoActiveWitnesses)?;
        if !set.contains(&witness) {
            return Err(ContractError::NotActiveWitness);
        }
        if event.voters.contains(&witness) {
            return Err(ContractError::AlreadyPublished);
        }

        event.voters.push_back(witness.clone());
        match status {
            EventStatus::Confirmed => event.confirmations += 1,
            _ => event.rejections += 1,
        }
        let vote_key = (VOTE, event_idx, witness.clone());
        env.storage().persistent().set(&vote_key, &status);
        env.storage()
            .persistent()
            .extend_ttl(&vote_key, TTL_THRESHOLD, TTL_EXTEND_TO);
        events::publish_vote(&env, event_idx, &witness, status);

        if event.confirmations >= set.threshold {
            event.status = EventStatus::Confirmed;
            Self::settle_confirmed(&env, &event)?;
        } else if event.rejections >= set.threshold {
            event.status = EventStatus::Rejected;
            Self::settle_rejected(&env, event_idx, &event)?;
        }
        if event.status != EventStatus::Processing {
            events::publish_decision(&env, event_idx, event.status, &event.voters);
        }

        Self::store_event(&env, event_idx, &event);
        Ok(event.status)
    }

    // ── Event oracle ──────────────────────────────────────────────────────────

    pub fn is_confirmed(env: Env, execution_chain_id: u64, event_id: u64) -> bool {
        Self::oracle_event(&env, execution_chain_id, event_id)
            .map(|e| e.status == EventStatus::Confirmed)
            .unwrap_or(false)
    }

    pub fn event_type(env: Env, execution_chain_id: u64, event_id: u64) -> Option<EventType> {
        Self::oracle_event(&env, execution_chain_id, event_id).map(|e| e.body.event_type())
    }

    /// Canonical serialization of the event, as covered by its content hash.
    pub fn event_data(env: Env, execution_chain_id: u64, event_id: u64) -> Option<Bytes> {
        Self::oracle_event(&env, execution_chain_id, event_id).map(|e| e.body.preimage(&env))
    }

    pub fn event_submitter(env: Env, execution_chain_id: u64, event_id: u64) -> Option<Address> {
        Self::oracle_event(&env, execution_chain_id, event_id).map(|e| e.submitter)
    }

    // ── View functions ────────────────────────────────────────────────────────

    pub fn get_event(env: Env, event_idx: u64) -> Option<CallEvent> {
        Self::load_event(&env, event_idx)
    }

    pub fn get_event_status(env: Env, event_idx: u64) -> EventStatus {
        Self::load_event(&env, event_idx)
            .map(|e| e.status)
            .unwrap_or(EventStatus::Unknown)
    }

    pub fn get_event_count(env: Env) -> u64 {
        env.storage().instance().get(&EVENT_SIZE).unwrap_or(0)
    }

    pub fn get_event_by_hash(env: Env, content_hash: BytesN<32>) -> Option<u64> {
        env.storage().persistent().get(&(EVENT_HASH, content_hash))
    }

    pub fn get_submitter_events(env: Env, submitter: Address, chain_id: u64) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&(SUBMITTER_EVENTS, submitter, chain_id))
            .unwrap_or(Vec::new(&env))
    }

    pub fn get_vote(env: Env, event_idx: u64, witness: Address) -> Option<EventStatus> {
        env.storage().persistent().get(&(VOTE, event_idx, witness))
    }

    pub fn get_epoch(env: Env, chain_id: u64) -> u64 {
        participants::current_epoch(&env, &WITNESS, chain_id)
    }

    pub fn get_witnesses(env: Env, chain_id: u64, epoch: u64) -> Option<ParticipantSet> {
        participants::get(&env, &WITNESS, chain_id, epoch)
    }

    pub fn get_proxy_security_deposit(env: Env, who: Address) -> i128 {
        deposit::balance(&env, &PROXY, &who)
    }

    pub fn get_config(env: Env) -> Result<WitnessConfig, ContractError> {
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

    fn config(env: &Env) -> Result<WitnessConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_event(env: &Env, event_idx: u64) -> Option<CallEvent> {
        env.storage().persistent().get(&(EVENT, event_idx))
    }

    fn store_event(env: &Env, event_idx: u64, event: &CallEvent) {
        let key = (EVENT, event_idx);
        env.storage().persistent().set(&key, event);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    /// The event at `event_id` if it targets `execution_chain_id`.
    fn oracle_event(env: &Env, execution_chain_id: u64, event_id: u64) -> Option<CallEvent> {
        Self::load_event(env, event_id).filter(|e| e.body.execution_chain_id == execution_chain_id)
    }

    fn submit(env: &Env, submitter: &Address, body: CallBody) -> Result<u64, ContractError> {
        access::require_initialized(env)?;
        pausable::require_not_paused(env)?;
        submitter.require_auth();
        body.validate()?;

        let config = Self::config(env)?;
        let content_hash = body.content_hash(env);
        let hash_key = (EVENT_HASH, content_hash.clone());
        if env.storage().persistent().has(&hash_key) {
            return Err(ContractError::AlreadyExists);
        }

        let witness_epoch = participants::current_epoch(env, &WITNESS, body.caller_chain_id);
        if witness_epoch == 0 {
            return Err(ContractError::NoActiveWitnesses);
        }

        deposit::debit(env, &PROXY, submitter, config.proxy_deposit_per_event)
            .map_err(|_| ContractError::InsufficientProxyDeposit)?;

        let event_idx = Self::get_event_count(env.clone());
        let chain_id = body.caller_chain_id;
        let event = CallEvent {
            body,
            content_hash: content_hash.clone(),
            status: EventStatus::Processing,
            confirmations: 0,
            rejections: 0,
            witness_epoch,
            submitter: submitter.clone(),
            voters: Vec::new(env),
            escrow: config.proxy_deposit_per_event,
        };
        Self::store_event(env, event_idx, &event);
        env.storage()
            .instance()
            .set(&EVENT_SIZE, &(event_idx + 1));

        env.storage().persistent().set(&hash_key, &event_idx);
        env.storage()
            .persistent()
            .extend_ttl(&hash_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        let index_key = (SUBMITTER_EVENTS, submitter.clone(), chain_id);
        let mut submitted: Vec<u64> = env
            .storage()
            .persistent()
            .get(&index_key)
            .unwrap_or(Vec::new(env));
        submitted.push_back(event_idx);
        env.storage().persistent().set(&index_key, &submitted);
        env.storage()
            .persistent()
            .extend_ttl(&index_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        events::publish_event_submitted(env, event_idx, submitter, &content_hash);
        Ok(event_idx)
    }

    fn settle_confirmed(env: &Env, event: &CallEvent) -> Result<(), ContractError> {
        let config = Self::config(env)?;
        deposit::credit(env, &PROXY, &event.submitter, event.escrow)?;
        if config.witness_reward > 0 {
            RewardMinterClient::new(env, &config.reward_minter)
                .mint_many(&event.voters, &config.witness_reward);
        }
        Ok(())
    }

    fn settle_rejected(env: &Env, event_idx: u64, event: &CallEvent) -> Result<(), ContractError> {
        match access::multisig(env) {
            Some(multisig) => {
                let config = Self::config(env)?;
                deposit::pay_out(env, &config.deposit_asset, &multisig, event.escrow);
                events::publish_penalty(env, event_idx, &multisig, event.escrow);
            }
            None => {
                // Held on the ledger's own balance until `set_multisig`.
                let ledger = env.current_contract_address();
                deposit::credit(env, &PROXY, &ledger, event.escrow)?;
                events::publish_penalty(env, event_idx, &ledger, event.escrow);
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

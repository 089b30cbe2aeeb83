//! Collaborator ports shared between ledgers.
//!
//! Ledgers never reach into each other's storage. The signer ledger asks the
//! witness ledger about events through [`EventOracle`], and both mint rewards
//! through [`RewardMinter`]. Addresses of the collaborators are wired at
//! `init`, so each ledger can be tested against fakes.

use soroban_sdk::{contractclient, contracttype, Address, Bytes, Env, Vec};

/// Origin chain family of a relayed call.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventType {
    Waves = 0,
    Evm = 1,
}

/// Read-side view of confirmed cross-chain events, keyed by
/// `(execution_chain_id, event_id)`.
#[contractclient(name = "EventOracleClient")]
pub trait EventOracle {
    fn is_confirmed(env: Env, execution_chain_id: u64, event_id: u64) -> bool;
    fn event_type(env: Env, execution_chain_id: u64, event_id: u64) -> Option<EventType>;
    fn event_data(env: Env, execution_chain_id: u64, event_id: u64) -> Option<Bytes>;
    fn event_submitter(env: Env, execution_chain_id: u64, event_id: u64) -> Option<Address>;
}

/// Reward token issuance.
#[contractclient(name = "RewardMinterClient")]
pub trait RewardMinter {
    fn mint(env: Env, to: Address, amount: i128);
    fn mint_many(env: Env, recipients: Vec<Address>, amount: i128);
}

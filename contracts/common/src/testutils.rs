//! In-memory fakes for the collaborator ports, for tests only.

use soroban_sdk::{contract, contractimpl, symbol_short, Address, Bytes, Env, Vec};

use crate::interfaces::EventType;

/// Records every mint as a plain balance.
#[contract]
pub struct MockMinter;

#[contractimpl]
impl MockMinter {
    pub fn mint(env: Env, to: Address, amount: i128) {
        let key = (symbol_short!("BAL"), to);
        let current: i128 = env.storage().persistent().get(&key).unwrap_or(0);
        env.storage().persistent().set(&key, &(current + amount));
        let calls: u32 = env
            .storage()
            .instance()
            .get(&symbol_short!("CALLS"))
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&symbol_short!("CALLS"), &(calls + 1));
    }

    pub fn mint_many(env: Env, recipients: Vec<Address>, amount: i128) {
        for to in recipients.iter() {
            Self::mint(env.clone(), to, amount);
        }
    }

    pub fn balance(env: Env, who: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(symbol_short!("BAL"), who))
            .unwrap_or(0)
    }

    /// Number of individual recipient credits so far.
    pub fn mint_count(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&symbol_short!("CALLS"))
            .unwrap_or(0)
    }
}

/// Event oracle whose answers are set directly by the test.
#[contract]
pub struct MockOracle;

#[contractimpl]
impl MockOracle {
    pub fn set_event(
        env: Env,
        execution_chain_id: u64,
        event_id: u64,
        confirmed: bool,
        event_type: EventType,
        submitter: Address,
    ) {
        let key = (symbol_short!("EVT"), execution_chain_id, event_id);
        env.storage()
            .persistent()
            .set(&key, &(confirmed, event_type, submitter));
    }

    pub fn is_confirmed(env: Env, execution_chain_id: u64, event_id: u64) -> bool {
        Self::load(&env, execution_chain_id, event_id)
            .map(|(confirmed, _, _)| confirmed)
            .unwrap_or(false)
    }

    pub fn event_type(env: Env, execution_chain_id: u64, event_id: u64) -> Option<EventType> {
        Self::load(&env, execution_chain_id, event_id).map(|(_, kind, _)| kind)
    }

    pub fn event_data(env: Env, execution_chain_id: u64, event_id: u64) -> Option<Bytes> {
        Self::load(&env, execution_chain_id, event_id).map(|_| Bytes::new(&env))
    }

    pub fn event_submitter(env: Env, execution_chain_id: u64, event_id: u64) -> Option<Address> {
        Self::load(&env, execution_chain_id, event_id).map(|(_, _, submitter)| submitter)
    }

    fn load(env: &Env, execution_chain_id: u64, event_id: u64) -> Option<(bool, EventType, Address)> {
        env.storage()
            .persistent()
            .get(&(symbol_short!("EVT"), execution_chain_id, event_id))
    }
}

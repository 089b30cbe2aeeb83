//! Structured event publishing for the Signer Ledger.

use soroban_sdk::{symbol_short, Address, Env, String, Vec};

use crate::round::RoundStatus;

pub fn publish_signers_set(env: &Env, execution_chain_id: u64, epoch: u64, size: u32, t: u32) {
    env.events().publish(
        (symbol_short!("SIG_SET"), execution_chain_id),
        (epoch, size, t),
    );
}

pub fn publish_r_submitted(
    env: &Env,
    execution_chain_id: u64,
    event_id: u64,
    signer: &Address,
    status: RoundStatus,
) {
    env.events().publish(
        (symbol_short!("R_SUB"), execution_chain_id, event_id),
        (signer.clone(), status),
    );
}

pub fn publish_s_submitted(
    env: &Env,
    execution_chain_id: u64,
    event_id: u64,
    signer: &Address,
    status: RoundStatus,
) {
    env.events().publish(
        (symbol_short!("S_SUB"), execution_chain_id, event_id),
        (signer.clone(), status),
    );
}

pub fn publish_round_done(
    env: &Env,
    execution_chain_id: u64,
    event_id: u64,
    r_sigma: &String,
    s_sigma: &String,
) {
    env.events().publish(
        (symbol_short!("RND_DONE"), execution_chain_id, event_id),
        (r_sigma.clone(), s_sigma.clone()),
    );
}

pub fn publish_round_reset(
    env: &Env,
    execution_chain_id: u64,
    event_id: u64,
    caller: &Address,
    punished: &Vec<Address>,
) {
    env.events().publish(
        (symbol_short!("RND_RST"), execution_chain_id, event_id),
        (caller.clone(), punished.clone()),
    );
}

pub fn publish_punishment(env: &Env, signer: &Address, amount: i128, beneficiary: &Address) {
    env.events().publish(
        (symbol_short!("PUNISH"), signer.clone()),
        (amount, beneficiary.clone()),
    );
}

pub fn publish_deposit(env: &Env, who: &Address, amount: i128, balance: i128) {
    env.events()
        .publish((symbol_short!("DEP_ADD"), who.clone()), (amount, balance));
}

pub fn publish_withdrawal(env: &Env, who: &Address, amount: i128, balance: i128) {
    env.events()
        .publish((symbol_short!("DEP_SUB"), who.clone()), (amount, balance));
}

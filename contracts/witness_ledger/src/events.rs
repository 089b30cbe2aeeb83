//! Structured event publishing for the Witness Ledger.

use soroban_sdk::{symbol_short, Address, BytesN, Env, Vec};

use crate::event::EventStatus;

pub fn publish_event_submitted(
    env: &Env,
    event_idx: u64,
    submitter: &Address,
    content_hash: &BytesN<32>,
) {
    env.events().publish(
        (symbol_short!("EVT_NEW"), event_idx),
        (submitter.clone(), content_hash.clone()),
    );
}

pub fn publish_vote(env: &Env, event_idx: u64, witness: &Address, status: EventStatus) {
    env.events().publish(
        (symbol_short!("EVT_VOTE"), event_idx),
        (witness.clone(), status),
    );
}

pub fn publish_decision(env: &Env, event_idx: u64, status: EventStatus, voters: &Vec<Address>) {
    env.events().publish(
        (symbol_short!("EVT_DONE"), event_idx),
        (status, voters.clone()),
    );
}

pub fn publish_witnesses_set(env: &Env, chain_id: u64, epoch: u64, size: u32) {
    env.events()
        .publish((symbol_short!("WIT_SET"), chain_id), (epoch, size));
}

pub fn publish_proxy_deposit(env: &Env, who: &Address, amount: i128, balance: i128) {
    env.events()
        .publish((symbol_short!("PRX_ADD"), who.clone()), (amount, balance));
}

pub fn publish_proxy_withdrawal(env: &Env, who: &Address, amount: i128, balance: i128) {
    env.events()
        .publish((symbol_short!("PRX_SUB"), who.clone()), (amount, balance));
}

pub fn publish_penalty(env: &Env, event_idx: u64, recipient: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("EVT_PEN"), event_idx),
        (recipient.clone(), amount),
    );
}

pub fn publish_forfeits_released(env: &Env, multisig: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("FORFEIT"),), (multisig.clone(), amount));
}

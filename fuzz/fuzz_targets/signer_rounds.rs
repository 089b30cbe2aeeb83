#![no_main]

use arbitrary::Arbitrary;
use common::testutils::{MockMinter, MockOracle, MockOracleClient};
use common::EventType;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{StellarAssetClient, TokenClient},
    Address, Env, String, Vec as SorobanVec,
};
use signer_ledger::{RoundStatus, SignerConfig, SignerLedger, SignerLedgerClient};

const CHAIN: u64 = 2;
const EVENTS: u64 = 3;
const MIN_DEPO: i128 = 100;
const DELTA: u32 = 5;

/// Signer-ledger entry points over a small pool of signers and events.
///
/// Share values come from a two-letter alphabet so conflicting and
/// identical resubmissions are both common.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    SubmitR { signer: u8, event: u8, value: bool },
    SubmitS { signer: u8, event: u8, value: bool, r_sigma: bool },
    Reset { signer: u8, event: u8, value: bool },
    AddDeposit { signer: u8, amount: u16 },
    SubDeposit { signer: u8, amount: u16 },
    AdvanceBlocks { blocks: u8 },
}

fn share(env: &Env, value: bool) -> String {
    String::from_str(env, if value { "a" } else { "b" })
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(10);

    let asset = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let oracle_id = env.register(MockOracle, ());
    let minter_id = env.register(MockMinter, ());
    let contract_id = env.register(SignerLedger, ());
    let client = SignerLedgerClient::new(&env, &contract_id);

    let config = SignerConfig {
        witness_oracle: oracle_id.clone(),
        reward_minter: minter_id,
        deposit_asset: asset.clone(),
        min_sec_depo: MIN_DEPO,
        punishment: 150,
        reset_block_delta: DELTA,
        waves_reward: 1,
        evm_reward: 2,
    };
    if client.try_init(&contract_id, &config).is_err() {
        return;
    }

    let oracle = MockOracleClient::new(&env, &oracle_id);
    let submitter = Address::generate(&env);
    for event in 0..EVENTS {
        let kind = if event % 2 == 0 { EventType::Waves } else { EventType::Evm };
        oracle.set_event(&CHAIN, &event, &true, &kind, &submitter);
    }

    let mut signers = Vec::new();
    let mut set = SorobanVec::new(&env);
    for _ in 0..4 {
        let s = Address::generate(&env);
        StellarAssetClient::new(&env, &asset).mint(&s, &1_000_000);
        client.add_security_deposit(&s, &s, &(MIN_DEPO * 3));
        set.push_back(s.clone());
        signers.push(s);
    }
    client.set_active_signers(&contract_id, &CHAIN, &set, &3, &String::from_str(&env, "group"));

    let token = TokenClient::new(&env, &asset);
    let mut ready = 0u64;

    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::SubmitR { signer, event, value } => {
                let who = &signers[signer as usize % signers.len()];
                let _ = client.try_submit_r(who, &(event as u64 % EVENTS), &CHAIN, &share(&env, value));
            }
            FuzzAction::SubmitS { signer, event, value, r_sigma } => {
                let who = &signers[signer as usize % signers.len()];
                let _ = client.try_submit_s(
                    who,
                    &(event as u64 % EVENTS),
                    &CHAIN,
                    &share(&env, r_sigma),
                    &share(&env, value),
                    &String::from_str(&env, "sigma"),
                );
            }
            FuzzAction::Reset { signer, event, value } => {
                let who = &signers[signer as usize % signers.len()];
                let _ = client.try_reset(who, &(event as u64 % EVENTS), &CHAIN, &share(&env, value));
            }
            FuzzAction::AddDeposit { signer, amount } => {
                let who = &signers[signer as usize % signers.len()];
                let _ = client.try_add_security_deposit(who, who, &(amount as i128));
            }
            FuzzAction::SubDeposit { signer, amount } => {
                let who = &signers[signer as usize % signers.len()];
                let _ = client.try_sub_security_deposit(who, &(amount as i128));
            }
            FuzzAction::AdvanceBlocks { blocks } => {
                let seq = env.ledger().sequence().saturating_add(blocks as u32);
                env.ledger().set_sequence_number(seq);
            }
        }

        // ── Post-action invariant checks ──
        let sum: i128 = signers.iter().map(|s| client.get_security_deposit(s)).sum();
        assert_eq!(
            sum,
            token.balance(&contract_id),
            "INVARIANT VIOLATION: deposits diverged from custody"
        );
        for s in &signers {
            assert!(client.get_security_deposit(s) >= 0, "INVARIANT VIOLATION: negative deposit");
        }

        let count = client.get_ready_count(&CHAIN);
        assert!(count >= ready && count <= ready + 1, "INVARIANT VIOLATION: ready index jumped");
        ready = count;

        let done = (0..EVENTS)
            .filter(|e| client.get_round_status(&CHAIN, e) == RoundStatus::Done)
            .count() as u64;
        assert_eq!(done, ready, "INVARIANT VIOLATION: ready index out of step with done rounds");
    }
});

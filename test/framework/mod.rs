//! # Relay Contract Testing Framework
//!
//! A reusable harness for the relay ledgers supporting property-based
//! testing, invariant checking, state exploration and a declarative
//! scenario DSL.
//!
//! ## Architecture
//!
//! ```text
//! test/framework/
//! ├── mod.rs            : TestEnv, RelayHarness, snapshots
//! ├── generators.rs     : Property-based test value generators
//! ├── invariants.rs     : State invariant definitions & verification
//! ├── state_explorer.rs : Signing-round state-space exploration
//! └── scenario_dsl.rs   : Declarative test scenario builder
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_test_framework::{RelayHarness, TestEnv};
//!
//! let mut env = TestEnv::new();
//! let relay = RelayHarness::new(&mut env);
//! let signers = relay.install_signers(3, 2);
//! let event = relay.relay_confirmed_event(0);
//! relay.complete_round(event, &signers);
//! ```

extern crate std;

pub mod generators;
pub mod state_explorer;

use common::testutils::{MockMinter, MockMinterClient};
use ed25519_dalek::{Signer as _, SigningKey};
use executor::{Executor, ExecutorClient};
use gateway::{Gateway, GatewayClient};
use signer_ledger::{RoundStatus, SignerConfig, SignerLedger, SignerLedgerClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{StellarAssetClient, TokenClient},
    Address, BytesN, Env, String, Vec,
};
use witness_ledger::{
    EventStatus, WavesCallEvent, WitnessConfig, WitnessLedger, WitnessLedgerClient,
};

/// Chain the gateway and the witnesses observe.
pub const SOURCE_CHAIN: u64 = 1;
/// Chain the signers sign for and the executor runs on.
pub const TARGET_CHAIN: u64 = 2;

pub const PROXY_DEPOSIT_PER_EVENT: i128 = 100;
pub const WITNESS_REWARD: i128 = 3;
pub const MIN_SEC_DEPO: i128 = 1_000;
pub const PUNISHMENT: i128 = 300;
pub const RESET_BLOCK_DELTA: u32 = 20;
pub const WAVES_REWARD: i128 = 10;
pub const EVM_REWARD: i128 = 20;

// ── Core Test Environment ────────────────────────────────────────────────────

/// Wraps the Soroban `Env` with address management, block control and
/// token helpers.
pub struct TestEnv {
    pub env: Env,
    generated_addresses: std::vec::Vec<Address>,
}

impl TestEnv {
    /// Create a new test environment with all auth mocked.
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_sequence_number(100);
        Self {
            env,
            generated_addresses: std::vec::Vec::new(),
        }
    }

    pub fn generate_address(&mut self) -> Address {
        let addr = Address::generate(&self.env);
        self.generated_addresses.push(addr.clone());
        addr
    }

    /// Generate `n` distinct addresses.
    pub fn generate_addresses(&mut self, n: usize) -> std::vec::Vec<Address> {
        (0..n).map(|_| self.generate_address()).collect()
    }

    /// Every address handed out so far, in generation order.
    pub fn generated(&self) -> &[Address] {
        &self.generated_addresses
    }

    /// Current ledger sequence, the protocol's block height.
    pub fn sequence(&self) -> u32 {
        self.env.ledger().sequence()
    }

    pub fn set_sequence(&self, sequence: u32) {
        self.env.ledger().set_sequence_number(sequence);
    }

    /// Advance the ledger sequence by `blocks`.
    pub fn advance_blocks(&self, blocks: u32) {
        self.set_sequence(self.sequence().saturating_add(blocks));
    }

    /// Deploy a Stellar asset contract and return its address.
    pub fn deploy_token(&self) -> Address {
        self.env
            .register_stellar_asset_contract_v2(Address::generate(&self.env))
            .address()
    }

    pub fn mint_tokens(&self, token: &Address, recipient: &Address, amount: i128) {
        StellarAssetClient::new(&self.env, token).mint(recipient, &amount);
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ── Relay Harness ────────────────────────────────────────────────────────────

/// All four ledgers deployed and wired together.
///
/// The signer ledger uses the witness ledger as its event oracle; both mint
/// through one `MockMinter`. Deposits are held in a single native asset.
pub struct RelayHarness<'a> {
    pub env: &'a mut TestEnv,
    pub witness: WitnessLedgerClient<'static>,
    pub signer: SignerLedgerClient<'static>,
    pub executor: ExecutorClient<'static>,
    pub gateway: GatewayClient<'static>,
    pub minter: MockMinterClient<'static>,
    pub asset: Address,
    pub relayer: Address,
    pub witnesses: std::vec::Vec<Address>,
    /// ed25519 key standing in for the signer group's aggregate key.
    pub group_key: SigningKey,
}

impl<'a> RelayHarness<'a> {
    /// Deploy and initialise every ledger with the default economics and
    /// install a three-witness set for [`SOURCE_CHAIN`].
    pub fn new(env: &'a mut TestEnv) -> Self {
        let asset = env.deploy_token();
        let e = env.env.clone();

        let minter_id = e.register(MockMinter, ());
        let witness_id = e.register(WitnessLedger, ());
        let signer_id = e.register(SignerLedger, ());
        let executor_id = e.register(Executor, ());
        let gateway_id = e.register(Gateway, ());

        let witness = WitnessLedgerClient::new(&e, &witness_id);
        witness.init(
            &witness_id,
            &WitnessConfig {
                deposit_asset: asset.clone(),
                reward_minter: minter_id.clone(),
                proxy_deposit_per_event: PROXY_DEPOSIT_PER_EVENT,
                witness_reward: WITNESS_REWARD,
            },
        );

        let signer = SignerLedgerClient::new(&e, &signer_id);
        signer.init(
            &signer_id,
            &SignerConfig {
                witness_oracle: witness_id.clone(),
                reward_minter: minter_id.clone(),
                deposit_asset: asset.clone(),
                min_sec_depo: MIN_SEC_DEPO,
                punishment: PUNISHMENT,
                reset_block_delta: RESET_BLOCK_DELTA,
                waves_reward: WAVES_REWARD,
                evm_reward: EVM_REWARD,
            },
        );

        let group_key = SigningKey::from_bytes(&[7u8; 32]);
        let executor = ExecutorClient::new(&e, &executor_id);
        let pauser = env.generate_address();
        executor.init(
            &executor_id,
            &TARGET_CHAIN,
            &pauser,
            &BytesN::from_array(&e, &group_key.verifying_key().to_bytes()),
        );

        let gateway = GatewayClient::new(&e, &gateway_id);
        gateway.init(&gateway_id, &SOURCE_CHAIN);

        let relayer = env.generate_address();
        env.mint_tokens(&asset, &relayer, 1_000_000);
        witness.add_proxy_security_deposit(&relayer, &relayer, &100_000);

        let witnesses = env.generate_addresses(3);
        let mut set = Vec::new(&e);
        for w in &witnesses {
            set.push_back(w.clone());
        }
        witness.set_active_witnesses(&witness_id, &SOURCE_CHAIN, &set);

        Self {
            env,
            witness,
            signer,
            executor,
            gateway,
            minter: MockMinterClient::new(&e, &minter_id),
            asset,
            relayer,
            witnesses,
            group_key,
        }
    }

    pub fn e(&self) -> &Env {
        &self.env.env
    }

    pub fn str(&self, value: &str) -> String {
        String::from_str(self.e(), value)
    }

    /// Install `n` funded signers for [`TARGET_CHAIN`] with threshold `t`.
    pub fn install_signers(&self, n: usize, t: u32) -> std::vec::Vec<Address> {
        let signers: std::vec::Vec<Address> =
            (0..n).map(|_| Address::generate(self.e())).collect();
        let mut set = Vec::new(self.e());
        for s in &signers {
            self.fund_signer(s, MIN_SEC_DEPO * 2);
            set.push_back(s.clone());
        }
        let group = hex::encode(self.group_key.verifying_key().to_bytes());
        self.signer.set_active_signers(
            &self.signer.address,
            &TARGET_CHAIN,
            &set,
            &t,
            &String::from_str(self.e(), &group),
        );
        signers
    }

    /// Mint native asset to `signer` and deposit `amount` of it.
    pub fn fund_signer(&self, signer: &Address, amount: i128) {
        self.env.mint_tokens(&self.asset, signer, amount);
        self.signer.add_security_deposit(signer, signer, &amount);
    }

    /// A Waves-style call event from [`SOURCE_CHAIN`] to [`TARGET_CHAIN`].
    pub fn waves_event(&self, nonce: u64) -> WavesCallEvent {
        let e = self.e();
        WavesCallEvent {
            caller_chain_id: SOURCE_CHAIN,
            execution_chain_id: TARGET_CHAIN,
            nonce,
            caller: self.str("3PCaller"),
            execution_contract: self.str("counter"),
            function_name: self.str("add"),
            args: Vec::from_array(e, [self.str("1")]),
            tx_hash: self.str("txhash"),
            block_number: u64::from(self.env.sequence()),
        }
    }

    /// Submit event `nonce` and let every witness vote `Confirmed`.
    /// Returns the event index.
    pub fn relay_confirmed_event(&self, nonce: u64) -> u64 {
        let idx = self
            .witness
            .submit_waves_call_event(&self.relayer, &self.waves_event(nonce));
        for w in &self.witnesses {
            if self.witness.get_event_status(&idx) != EventStatus::Processing {
                break;
            }
            self.witness
                .publish_event_status(w, &idx, &EventStatus::Confirmed);
        }
        idx
    }

    pub fn submit_r(&self, signer: &Address, event_id: u64, r: &str) -> RoundStatus {
        self.signer
            .submit_r(signer, &event_id, &TARGET_CHAIN, &self.str(r))
    }

    pub fn submit_s(&self, signer: &Address, event_id: u64, s: &str) -> RoundStatus {
        self.signer.submit_s(
            signer,
            &event_id,
            &TARGET_CHAIN,
            &self.str("rsigma"),
            &self.str(s),
            &self.str("ssigma"),
        )
    }

    /// Drive a round to `Done` using the first `t` of `signers`.
    pub fn complete_round(&self, event_id: u64, signers: &[Address]) -> RoundStatus {
        let t = self
            .signer
            .get_t(&TARGET_CHAIN, &self.signer.get_epoch(&TARGET_CHAIN))
            .unwrap_or(0) as usize;
        for s in signers.iter().take(t) {
            self.submit_r(s, event_id, "r");
        }
        let mut status = RoundStatus::SCollecting;
        for s in signers.iter().take(t) {
            status = self.submit_s(s, event_id, "s");
        }
        status
    }

    /// Group signature over `digest`, as the executor expects it.
    pub fn group_sign(&self, digest: &BytesN<32>) -> BytesN<64> {
        BytesN::from_array(
            self.e(),
            &self.group_key.sign(&digest.to_array()).to_bytes(),
        )
    }

    /// Native-asset balance held by the signer ledger.
    pub fn signer_custody(&self) -> i128 {
        TokenClient::new(self.e(), &self.asset).balance(&self.signer.address)
    }

    /// Snapshot of the observable signer-ledger state for invariant checks.
    pub fn snapshot(&self, signers: &[Address], event_id: u64) -> RelaySnapshot {
        RelaySnapshot {
            sequence: self.env.sequence(),
            epoch: self.signer.get_epoch(&TARGET_CHAIN),
            custody: self.signer_custody(),
            ready_count: self.signer.get_ready_count(&TARGET_CHAIN),
            round_status: self.signer.get_round_status(&TARGET_CHAIN, &event_id),
            deposits: signers
                .iter()
                .map(|s| (s.clone(), self.signer.get_security_deposit(s)))
                .collect(),
            locks: signers
                .iter()
                .map(|s| (s.clone(), self.signer.get_locks(s)))
                .collect(),
        }
    }
}

/// Immutable snapshot of signer-ledger state at a point in time.
#[derive(Debug, Clone)]
pub struct RelaySnapshot {
    pub sequence: u32,
    pub epoch: u64,
    pub custody: i128,
    pub ready_count: u64,
    pub round_status: RoundStatus,
    pub deposits: std::vec::Vec<(Address, i128)>,
    pub locks: std::vec::Vec<(Address, u32)>,
}

impl RelaySnapshot {
    /// Sum of the tracked security deposits.
    pub fn sum_deposits(&self) -> i128 {
        self.deposits.iter().map(|(_, d)| d).sum()
    }
}

// ── Test Outcome Tracking ────────────────────────────────────────────────────

/// Result of a single test action, used by the state explorer and scenario DSL.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Ok,
    /// The ledger rejected the action with this contract error code.
    ExpectedError(u32),
    UnexpectedError(std::string::String),
}

/// Summary of a test run with coverage metrics.
#[derive(Debug, Clone)]
pub struct TestRunSummary {
    pub actions_executed: usize,
    pub invariant_checks: usize,
    pub invariant_violations: std::vec::Vec<std::string::String>,
    pub entry_points_hit: std::collections::HashSet<std::string::String>,
    pub transitions_observed: usize,
}

impl TestRunSummary {
    pub fn new() -> Self {
        Self {
            actions_executed: 0,
            invariant_checks: 0,
            invariant_violations: std::vec::Vec::new(),
            entry_points_hit: std::collections::HashSet::new(),
            transitions_observed: 0,
        }
    }

    /// True when no invariant violations were detected.
    pub fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    /// Coverage ratio: entry points hit / total known entry points.
    pub fn entry_point_coverage(&self, total_entry_points: usize) -> f64 {
        if total_entry_points == 0 {
            return 0.0;
        }
        self.entry_points_hit.len() as f64 / total_entry_points as f64
    }
}

impl Default for TestRunSummary {
    fn default() -> Self {
        Self::new()
    }
}

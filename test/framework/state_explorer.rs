//! # State Space Explorer
//!
//! Executes signer-ledger action sequences against one signing round and
//! verifies invariants after every transition.
//!
//! ## Design
//!
//! Each explored state is a `RelaySnapshot`; edges are `SignerAction`s.
//! Snapshot invariants run after every action, transition invariants on
//! every consecutive pair.
//!
//! ## Complexity
//!
//! - Time: O(S × I × N) where S = executed steps, I = invariants and
//!   N = tracked signers.
//! - Space: O(S × N) when snapshots are recorded, O(N) otherwise.

extern crate std;

use soroban_sdk::Address;
use std::vec::Vec;

use super::generators::{share, SignerAction};
use super::invariants::{InvariantSet, TransitionInvariantSet};
use super::{ActionOutcome, RelayHarness, RelaySnapshot, TestRunSummary};

// ── Explorer Configuration ───────────────────────────────────────────────────

/// Configuration for state-space exploration.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Maximum number of actions to execute in a single exploration run.
    pub max_steps: usize,
    /// Whether to halt on the first invariant violation (fail-fast).
    pub fail_fast: bool,
    /// Whether to record snapshots for later analysis.
    pub record_snapshots: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            fail_fast: true,
            record_snapshots: false,
        }
    }
}

// ── Exploration Result ───────────────────────────────────────────────────────

/// Full result of an exploration run.
#[derive(Debug)]
pub struct ExplorationResult {
    pub summary: TestRunSummary,
    pub snapshots: Vec<RelaySnapshot>,
    pub action_log: Vec<(SignerAction, ActionOutcome)>,
}

impl ExplorationResult {
    pub fn passed(&self) -> bool {
        self.summary.passed()
    }

    /// Number of actions the ledger accepted.
    pub fn accepted(&self) -> usize {
        self.action_log
            .iter()
            .filter(|(_, o)| matches!(o, ActionOutcome::Ok))
            .count()
    }
}

// ── State Space Explorer ─────────────────────────────────────────────────────

/// Drives a signing round on `event_id` through arbitrary actions.
pub struct StateExplorer<'a, 'b> {
    relay: &'a RelayHarness<'b>,
    invariants: InvariantSet,
    transitions: TransitionInvariantSet,
    config: ExplorerConfig,
    signers: Vec<Address>,
    event_id: u64,
}

impl<'a, 'b> StateExplorer<'a, 'b> {
    pub fn new(
        relay: &'a RelayHarness<'b>,
        invariants: InvariantSet,
        transitions: TransitionInvariantSet,
        config: ExplorerConfig,
        signers: Vec<Address>,
        event_id: u64,
    ) -> Self {
        Self {
            relay,
            invariants,
            transitions,
            config,
            signers,
            event_id,
        }
    }

    /// Explorer with default configuration and the built-in invariants.
    pub fn with_defaults(relay: &'a RelayHarness<'b>, signers: Vec<Address>, event_id: u64) -> Self {
        Self::new(
            relay,
            InvariantSet::signer_defaults(),
            TransitionInvariantSet::signer_defaults(),
            ExplorerConfig::default(),
            signers,
            event_id,
        )
    }

    /// Execute a sequence of actions, checking invariants after each.
    pub fn explore(&mut self, actions: &[SignerAction]) -> ExplorationResult {
        let mut summary = TestRunSummary::new();
        let mut snapshots = Vec::new();
        let mut action_log = Vec::new();

        let mut previous = self.relay.snapshot(&self.signers, self.event_id);
        if self.config.record_snapshots {
            snapshots.push(previous.clone());
        }

        for action in actions.iter().take(self.config.max_steps) {
            let outcome = self.execute_action(action);
            summary.entry_points_hit.insert(action.entry_point().into());
            summary.actions_executed += 1;
            summary.transitions_observed += 1;
            action_log.push((action.clone(), outcome));

            let snapshot = self.relay.snapshot(&self.signers, self.event_id);
            let mut violations = self.invariants.check_all(&snapshot);
            violations.extend(self.transitions.check_all(&previous, &snapshot));
            summary.invariant_checks += 1;

            let failed = !violations.is_empty();
            for (name, msg) in violations {
                summary.invariant_violations.push(std::format!(
                    "After action #{} ({:?}): [{}] {}",
                    summary.actions_executed,
                    action,
                    name,
                    msg
                ));
            }

            if self.config.record_snapshots {
                snapshots.push(snapshot.clone());
            }
            if failed && self.config.fail_fast {
                break;
            }
            previous = snapshot;
        }

        ExplorationResult {
            summary,
            snapshots,
            action_log,
        }
    }

    fn signer(&self, index: usize) -> &Address {
        &self.signers[index % self.signers.len()]
    }

    fn execute_action(&mut self, action: &SignerAction) -> ActionOutcome {
        let relay = self.relay;
        let chain = super::TARGET_CHAIN;
        let event = self.event_id;
        match action {
            SignerAction::SubmitR { signer, value } => outcome(relay.signer.try_submit_r(
                self.signer(*signer),
                &event,
                &chain,
                &relay.str(share(*value)),
            )),
            SignerAction::SubmitS { signer, value } => outcome(relay.signer.try_submit_s(
                self.signer(*signer),
                &event,
                &chain,
                &relay.str("rsigma"),
                &relay.str(share(*value)),
                &relay.str("ssigma"),
            )),
            SignerAction::Reset { signer, value } => outcome(relay.signer.try_reset(
                self.signer(*signer),
                &event,
                &chain,
                &relay.str(share(*value)),
            )),
            SignerAction::AddDeposit { signer, amount } => {
                let who = self.signer(*signer).clone();
                relay.env.mint_tokens(&relay.asset, &who, *amount);
                outcome(relay.signer.try_add_security_deposit(&who, &who, amount))
            }
            SignerAction::SubDeposit { signer, amount } => outcome(
                relay
                    .signer
                    .try_sub_security_deposit(self.signer(*signer), amount),
            ),
            SignerAction::AdvanceBlocks { blocks } => {
                relay.env.advance_blocks(*blocks);
                ActionOutcome::Ok
            }
        }
    }
}

/// Classify a `try_*` client result.
fn outcome<T, C, E>(
    result: Result<Result<T, C>, Result<signer_ledger::ContractError, E>>,
) -> ActionOutcome
where
    E: core::fmt::Debug,
{
    match result {
        Ok(_) => ActionOutcome::Ok,
        Err(Ok(e)) => ActionOutcome::ExpectedError(e as u32),
        Err(Err(e)) => ActionOutcome::UnexpectedError(std::format!("{:?}", e)),
    }
}

/// Signer-ledger entry points the explorer can reach, for coverage.
pub const SIGNER_ENTRY_POINTS: &[&str] = &[
    "submit_r",
    "submit_s",
    "reset",
    "add_security_deposit",
    "sub_security_deposit",
];

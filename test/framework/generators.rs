//! # Property-Based Test Generators
//!
//! Composable `proptest` strategies for generating valid and adversarial inputs
//! across the relay ledgers.
//!
//! ## Design Decisions
//!
//! - Generators produce *semantic* values (deposits, share values, action
//!   sequences), not raw bytes, so tests exercise real code paths rather than
//!   tripping field validation on every input.
//! - Roughly a fifth of generated values are boundary cases (0, 1, the i64
//!   ceiling of the wire format).
//! - Share values are drawn from a tiny alphabet so that conflicting and
//!   identical resubmissions both occur often.

extern crate std;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::string::String;
use std::vec::Vec;

use crate::{MIN_SEC_DEPO, RESET_BLOCK_DELTA};

// ── Scalar Generators ────────────────────────────────────────────────────────

/// Strategy for deposit amounts, biased toward edge cases.
pub fn amount_strategy() -> impl Strategy<Value = i128> {
    prop_oneof![
        1 => Just(0i128),
        1 => Just(1i128),
        1 => Just(MIN_SEC_DEPO),
        7 => (1i128..=MIN_SEC_DEPO * 10),
    ]
}

/// Strategy for strictly positive amounts.
pub fn positive_amount_strategy() -> impl Strategy<Value = i128> {
    prop_oneof![
        1 => Just(1i128),
        1 => Just(MIN_SEC_DEPO),
        8 => (1i128..=MIN_SEC_DEPO * 10),
    ]
}

/// Strategy for amounts every ledger rejects.
pub fn invalid_amount_strategy() -> impl Strategy<Value = i128> {
    prop_oneof![
        5 => Just(0i128),
        3 => (-1_000_000i128..=-1i128),
        2 => Just(i128::MIN),
    ]
}

/// Chain ids and nonces that fit the wire format's signed 64-bit range.
pub fn wire_int_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        1 => Just(0u64),
        1 => Just(i64::MAX as u64),
        8 => (0u64..=1_000_000u64),
    ]
}

/// Integers just past the wire format's range.
pub fn oversized_int_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        1 => Just(i64::MAX as u64 + 1),
        1 => Just(u64::MAX),
        3 => ((i64::MAX as u64 + 1)..=u64::MAX),
    ]
}

/// Non-empty field text without the `__` separator.
pub fn field_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]([a-zA-Z0-9_]?[a-zA-Z0-9]){0,12}"
}

/// Field text that field validation must reject.
pub fn invalid_field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        3 => ("[a-z]{0,6}", "[a-z]{0,6}").prop_map(|(a, b)| std::format!("{}__{}", a, b)),
    ]
}

/// Block advances, mostly inside the reset window with some past it.
pub fn blocks_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        3 => (1u32..RESET_BLOCK_DELTA),
        1 => Just(RESET_BLOCK_DELTA),
        2 => ((RESET_BLOCK_DELTA + 1)..=RESET_BLOCK_DELTA * 3),
    ]
}

// ── Action Generators ────────────────────────────────────────────────────────

/// Signer-ledger actions for state exploration on a single event.
///
/// `signer` selects from the installed signer pool (modular indexing);
/// `value` picks a share from a three-letter alphabet.
#[derive(Debug, Clone)]
pub enum SignerAction {
    SubmitR { signer: usize, value: u8 },
    SubmitS { signer: usize, value: u8 },
    Reset { signer: usize, value: u8 },
    AddDeposit { signer: usize, amount: i128 },
    SubDeposit { signer: usize, amount: i128 },
    AdvanceBlocks { blocks: u32 },
}

impl SignerAction {
    /// Entry point this action exercises.
    pub fn entry_point(&self) -> &'static str {
        match self {
            SignerAction::SubmitR { .. } => "submit_r",
            SignerAction::SubmitS { .. } => "submit_s",
            SignerAction::Reset { .. } => "reset",
            SignerAction::AddDeposit { .. } => "add_security_deposit",
            SignerAction::SubDeposit { .. } => "sub_security_deposit",
            SignerAction::AdvanceBlocks { .. } => "advance_blocks",
        }
    }
}

/// Render a share index as its string value.
pub fn share(value: u8) -> &'static str {
    match value % 3 {
        0 => "a",
        1 => "b",
        _ => "c",
    }
}

/// Strategy for individual signer actions.
///
/// Share submissions dominate; deposit movements are rarer.
pub fn signer_action_strategy(num_signers: usize) -> impl Strategy<Value = SignerAction> {
    let idx = 0..num_signers;
    let value = 0u8..3;

    prop_oneof![
        30 => (idx.clone(), value.clone()).prop_map(|(signer, value)| SignerAction::SubmitR { signer, value }),
        25 => (idx.clone(), value.clone()).prop_map(|(signer, value)| SignerAction::SubmitS { signer, value }),
        10 => (idx.clone(), value).prop_map(|(signer, value)| SignerAction::Reset { signer, value }),
        8 => (idx.clone(), positive_amount_strategy()).prop_map(|(signer, amount)| SignerAction::AddDeposit { signer, amount }),
        8 => (idx, positive_amount_strategy()).prop_map(|(signer, amount)| SignerAction::SubDeposit { signer, amount }),
        15 => blocks_strategy().prop_map(|blocks| SignerAction::AdvanceBlocks { blocks }),
    ]
}

/// Strategy for a sequence of 1–`max_len` signer actions.
pub fn signer_action_sequence(
    num_signers: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<SignerAction>> {
    prop::collection::vec(signer_action_strategy(num_signers), 1..=max_len)
}

// ── Witness Voting ───────────────────────────────────────────────────────────

/// A single witness's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Verdict {
    Confirm,
    Reject,
    Abstain,
}

/// Verdicts for a witness set of `1..=max` members.
pub fn verdicts_strategy(max: usize) -> impl Strategy<Value = Vec<Verdict>> {
    prop::collection::vec(any::<Verdict>(), 1..=max)
}

// ── Round Pattern Generators ─────────────────────────────────────────────────

/// Common signing-round shapes, for generating realistic action sequences.
#[derive(Debug, Clone, Copy, Arbitrary)]
pub enum RoundPattern {
    /// t signers submit R then S.
    HappyPath,
    /// R collection completes, S stalls, a signer resets after the window.
    StalledThenReset,
    /// Every share is submitted twice with the same value.
    IdenticalResubmission,
    /// Signers race to submit R with conflicting values.
    ConflictingShares,
    /// A signer tries to withdraw while locked, then after completion.
    WithdrawWhileLocked,
}

/// Concrete action sequence for `pattern` with threshold `t`.
pub fn pattern_to_actions(pattern: RoundPattern, t: usize) -> Vec<SignerAction> {
    let mut actions = Vec::new();
    match pattern {
        RoundPattern::HappyPath => {
            for i in 0..t {
                actions.push(SignerAction::SubmitR { signer: i, value: 0 });
            }
            for i in 0..t {
                actions.push(SignerAction::SubmitS { signer: i, value: 0 });
            }
        }
        RoundPattern::StalledThenReset => {
            for i in 0..t {
                actions.push(SignerAction::SubmitR { signer: i, value: 0 });
            }
            actions.push(SignerAction::SubmitS { signer: 0, value: 0 });
            actions.push(SignerAction::AdvanceBlocks { blocks: RESET_BLOCK_DELTA + 1 });
            actions.push(SignerAction::Reset { signer: t, value: 1 });
        }
        RoundPattern::IdenticalResubmission => {
            for i in 0..t {
                actions.push(SignerAction::SubmitR { signer: i, value: 0 });
                actions.push(SignerAction::SubmitR { signer: i, value: 0 });
            }
            for i in 0..t {
                actions.push(SignerAction::SubmitS { signer: i, value: 0 });
                actions.push(SignerAction::SubmitS { signer: i, value: 0 });
            }
        }
        RoundPattern::ConflictingShares => {
            for i in 0..t {
                actions.push(SignerAction::SubmitR { signer: i, value: 0 });
                actions.push(SignerAction::SubmitR { signer: i, value: 1 });
            }
        }
        RoundPattern::WithdrawWhileLocked => {
            actions.push(SignerAction::SubmitR { signer: 0, value: 0 });
            actions.push(SignerAction::SubDeposit { signer: 0, amount: 1 });
            for i in 1..t {
                actions.push(SignerAction::SubmitR { signer: i, value: 0 });
            }
            for i in 0..t {
                actions.push(SignerAction::SubmitS { signer: i, value: 0 });
            }
            actions.push(SignerAction::SubDeposit { signer: 0, amount: 1 });
        }
    }
    actions
}

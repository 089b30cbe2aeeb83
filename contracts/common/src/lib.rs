//! Shared utilities and error types for the relay contract suite.
//!
//! This crate provides:
//! - [`CommonError`]: standardised error codes for all relay ledgers.
//! - [`access`]: init-once lifecycle flag and the owner / multisig
//!   capability check guarding privileged ("self-call") operations.
//! - [`pausable`]: the pauser-gated pause switch every ledger carries.
//! - [`codec`]: `__`-separated field validation, integer bounds and the
//!   boundary encoding of composite records.
//! - [`participants`]: epoch-versioned signer / witness sets per chain.
//! - [`deposit`]: native-asset deposit balances backed by a token contract.
//! - [`interfaces`]: collaborator ports (event oracle, reward minter).
//!
//! Contract-specific errors can extend the range starting at code **100** and
//! above, ensuring no collisions with the common set.

#![no_std]
#![allow(clippy::arithmetic_side_effects)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod access;
pub mod codec;
pub mod deposit;
pub mod interfaces;
pub mod participants;
pub mod pausable;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use interfaces::*;
pub use participants::ParticipantSet;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Standardised error codes shared by every relay ledger.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authentication & authorisation |
/// | 30 – 39 | Validation / input             |
/// | 60 – 69 | State conflict                 |
/// | 100+    | Reserved for contract-specific |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// The contract is currently paused and cannot process requests.
    Paused = 3,
    /// `unpause` was called while the contract is running.
    NotPaused = 4,
    AccessDenied = 10,
    /// Caller is not the configured pauser (or no pauser is set).
    NotPauser = 11,
    /// The multisig owner can only be installed once.
    MultisigAlreadySet = 12,
    InvalidAmount = 30,
    EmptyField = 31,
    FieldTooLong = 32,
    /// A string field contains the reserved `__` separator.
    ContainsSeparator = 33,
    /// Integer outside `[0, 2^63 - 1]`.
    IntegerOutOfRange = 34,
    EmptyParticipantSet = 35,
    InsufficientBalance = 60,
}

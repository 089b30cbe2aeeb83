//! Per-event signing rounds.
//!
//! ## State machine
//! ```text
//! Idle ──first R──▶ RCollecting ──t-th R──▶ SCollecting ──t-th S──▶ Done
//!                        ▲                       │
//!                        └──── reset (timeout) ──┘
//! ```
//! A signer contributes at most one R and one S per round. Resubmitting the
//! identical value is a no-op; a different value is rejected.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::ContractError;

const ROUND: Symbol = symbol_short!("ROUND");

const TTL_THRESHOLD: u32 = 17_280;
const TTL_EXTEND_TO: u32 = 518_400;

// ── Types ─────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundStatus {
    Idle = 0,
    RCollecting = 1,
    SCollecting = 2,
    Done = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigningRound {
    pub status: RoundStatus,
    /// R contributors in submission order; `r_values` is parallel.
    pub r_signers: Vec<Address>,
    pub r_values: Vec<String>,
    /// S contributors in submission order; `s_values` is parallel.
    pub s_signers: Vec<Address>,
    pub s_values: Vec<String>,
    /// Aggregated R, pinned by the first S submission.
    pub r_sigma: Option<String>,
    /// Aggregated S, set when the round completes.
    pub s_sigma: Option<String>,
    /// Ledger sequence at which S collection began.
    pub start_block: u32,
}

/// Result of a share submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Identical resubmission; nothing changed.
    Unchanged,
    Recorded,
    /// This share reached the threshold and advanced the round.
    Advanced,
}

/// Who a reset affects, beyond the resetting signer.
pub struct ResetEffects {
    /// S contributors other than the resetting signer.
    pub punished: Vec<Address>,
    /// Former R contributors other than the resetting signer.
    pub released: Vec<Address>,
    /// Whether the resetting signer had not contributed an R before.
    pub caller_newly_locked: bool,
}

fn position(list: &Vec<Address>, who: &Address) -> Option<u32> {
    list.iter().position(|a| a == *who).map(|i| i as u32)
}

fn without(env: &Env, list: &Vec<Address>, who: &Address) -> Vec<Address> {
    let mut out = Vec::new(env);
    for a in list.iter() {
        if a != *who {
            out.push_back(a);
        }
    }
    out
}

impl SigningRound {
    pub fn new(env: &Env) -> Self {
        SigningRound {
            status: RoundStatus::Idle,
            r_signers: Vec::new(env),
            r_values: Vec::new(env),
            s_signers: Vec::new(env),
            s_values: Vec::new(env),
            r_sigma: None,
            s_sigma: None,
            start_block: 0,
        }
    }

    pub fn has_r(&self, signer: &Address) -> bool {
        self.r_signers.contains(signer)
    }

    /// Record `signer`'s R share. Moves to `SCollecting` at `threshold`
    /// distinct contributors, stamping `height` as the start block.
    pub fn submit_r(
        &mut self,
        signer: &Address,
        r: &String,
        threshold: u32,
        height: u32,
    ) -> Result<Outcome, ContractError> {
        if !matches!(self.status, RoundStatus::Idle | RoundStatus::RCollecting) {
            return Err(ContractError::IncorrectRoundStatus);
        }
        if let Some(i) = position(&self.r_signers, signer) {
            return match self.r_values.get(i) {
                Some(existing) if existing == *r => Ok(Outcome::Unchanged),
                _ => Err(ContractError::RAlreadySubmitted),
            };
        }

        self.r_signers.push_back(signer.clone());
        self.r_values.push_back(r.clone());
        self.status = RoundStatus::RCollecting;
        if self.r_signers.len() >= threshold {
            self.status = RoundStatus::SCollecting;
            self.start_block = height;
            return Ok(Outcome::Advanced);
        }
        Ok(Outcome::Recorded)
    }

    /// Record `signer`'s S share against the round's aggregated R.
    /// Completes the round with `s_sigma` at `threshold` contributors.
    pub fn submit_s(
        &mut self,
        signer: &Address,
        r_sigma: &String,
        s: &String,
        s_sigma: &String,
        threshold: u32,
    ) -> Result<Outcome, ContractError> {
        if self.status != RoundStatus::SCollecting {
            return Err(ContractError::IncorrectRoundStatus);
        }
        if let Some(i) = position(&self.s_signers, signer) {
            let same_r_sigma = self.r_sigma.as_ref() == Some(r_sigma);
            return match self.s_values.get(i) {
                Some(existing) if existing == *s && same_r_sigma => Ok(Outcome::Unchanged),
                _ => Err(ContractError::SAlreadySubmitted),
            };
        }
        if !self.has_r(signer) {
            return Err(ContractError::RNotSubmitted);
        }
        match self.r_sigma.clone() {
            Some(pinned) if pinned != *r_sigma => return Err(ContractError::RSigmaMismatch),
            Some(_) => {}
            None => self.r_sigma = Some(r_sigma.clone()),
        }

        self.s_signers.push_back(signer.clone());
        self.s_values.push_back(s.clone());
        if self.s_signers.len() >= threshold {
            self.s_sigma = Some(s_sigma.clone());
            self.status = RoundStatus::Done;
            return Ok(Outcome::Advanced);
        }
        Ok(Outcome::Recorded)
    }

    /// Restart a stalled S collection, reseeding R with `caller`'s share.
    ///
    /// Allowed only once `height > start_block + delta`.
    pub fn reset(
        &mut self,
        env: &Env,
        caller: &Address,
        r: &String,
        height: u32,
        delta: u32,
    ) -> Result<ResetEffects, ContractError> {
        if self.status != RoundStatus::SCollecting {
            return Err(ContractError::IncorrectRoundStatus);
        }
        if u64::from(height) <= u64::from(self.start_block) + u64::from(delta) {
            return Err(ContractError::ResetTooEarly);
        }

        let effects = ResetEffects {
            punished: without(env, &self.s_signers, caller),
            released: without(env, &self.r_signers, caller),
            caller_newly_locked: !self.has_r(caller),
        };

        *self = SigningRound::new(env);
        self.status = RoundStatus::RCollecting;
        self.r_signers.push_back(caller.clone());
        self.r_values.push_back(r.clone());
        Ok(effects)
    }
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn round_key(execution_chain_id: u64, event_id: u64) -> (Symbol, u64, u64) {
    (ROUND, execution_chain_id, event_id)
}

pub(crate) fn load(env: &Env, execution_chain_id: u64, event_id: u64) -> Option<SigningRound> {
    env.storage()
        .persistent()
        .get(&round_key(execution_chain_id, event_id))
}

pub(crate) fn store(env: &Env, execution_chain_id: u64, event_id: u64, round: &SigningRound) {
    let key = round_key(execution_chain_id, event_id);
    env.storage().persistent().set(&key, round);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

//! Cross-chain call events and their content addressing.
//!
//! ## Content hash
//!
//! ```text
//! keccak256( be64(caller_chain_id) ‖ be64(execution_chain_id) ‖ be64(nonce)
//!          ‖ lp(caller) ‖ lp(execution_contract)
//!          ‖ 0x00 ‖ lp(function_name) ‖ be32(len(args)) ‖ lp(arg)*   -- Waves calls
//!          ‖ 0x01 ‖ lp(calldata)                                     -- EVM calls
//!          ‖ lp(tx_hash) ‖ be64(block_number) )
//! ```
//!
//! `lp(x)` is `be32(len(x)) ‖ x`. Every variable-length field carries its
//! length, so two events share a hash only when every field is equal.
//! The hash is the dedup key: the same content can only be recorded once.

use common::{codec, EventType};
use soroban_sdk::{contracttype, Address, Bytes, BytesN, Env, String, Vec};

use crate::ContractError;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventStatus {
    Unknown = 0,
    Processing = 1,
    Confirmed = 2,
    Rejected = 3,
}

/// Submission input for a call originating on a Waves-style chain.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WavesCallEvent {
    pub caller_chain_id: u64,
    pub execution_chain_id: u64,
    pub nonce: u64,
    pub caller: String,
    pub execution_contract: String,
    pub function_name: String,
    pub args: Vec<String>,
    pub tx_hash: String,
    pub block_number: u64,
}

/// Submission input for a call originating on an EVM chain.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EvmCallEvent {
    pub caller_chain_id: u64,
    pub execution_chain_id: u64,
    pub nonce: u64,
    pub caller: String,
    pub execution_contract: String,
    pub calldata: Bytes,
    pub tx_hash: String,
    pub block_number: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WavesCall {
    pub function_name: String,
    pub args: Vec<String>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CallPayload {
    Waves(WavesCall),
    Evm(Bytes),
}

/// The content part of an event; everything the hash covers.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallBody {
    pub caller_chain_id: u64,
    pub execution_chain_id: u64,
    pub nonce: u64,
    pub caller: String,
    pub execution_contract: String,
    pub payload: CallPayload,
    pub tx_hash: String,
    pub block_number: u64,
}

/// A recorded event together with its voting state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallEvent {
    pub body: CallBody,
    pub content_hash: BytesN<32>,
    pub status: EventStatus,
    pub confirmations: u32,
    pub rejections: u32,
    /// Witness epoch of `caller_chain_id` at submission; votes are counted
    /// against that set even if the chain rotates afterwards.
    pub witness_epoch: u64,
    pub submitter: Address,
    pub voters: Vec<Address>,
    /// Proxy deposit held back from the submitter until the decision.
    pub escrow: i128,
}

impl From<WavesCallEvent> for CallBody {
    fn from(ev: WavesCallEvent) -> Self {
        CallBody {
            caller_chain_id: ev.caller_chain_id,
            execution_chain_id: ev.execution_chain_id,
            nonce: ev.nonce,
            caller: ev.caller,
            execution_contract: ev.execution_contract,
            payload: CallPayload::Waves(WavesCall {
                function_name: ev.function_name,
                args: ev.args,
            }),
            tx_hash: ev.tx_hash,
            block_number: ev.block_number,
        }
    }
}

impl From<EvmCallEvent> for CallBody {
    fn from(ev: EvmCallEvent) -> Self {
        CallBody {
            caller_chain_id: ev.caller_chain_id,
            execution_chain_id: ev.execution_chain_id,
            nonce: ev.nonce,
            caller: ev.caller,
            execution_contract: ev.execution_contract,
            payload: CallPayload::Evm(ev.calldata),
            tx_hash: ev.tx_hash,
            block_number: ev.block_number,
        }
    }
}

const WAVES_TAG: u8 = 0;
const EVM_TAG: u8 = 1;

fn push_be64(env: &Env, out: &mut Bytes, value: u64) {
    out.append(&Bytes::from_array(env, &value.to_be_bytes()));
}

fn push_prefixed(env: &Env, out: &mut Bytes, field: &Bytes) {
    out.append(&Bytes::from_array(env, &field.len().to_be_bytes()));
    out.append(field);
}

impl CallBody {
    pub fn event_type(&self) -> EventType {
        match self.payload {
            CallPayload::Waves(_) => EventType::Waves,
            CallPayload::Evm(_) => EventType::Evm,
        }
    }

    /// Checks every field and names the first offending one.
    pub fn validate(&self) -> Result<(), ContractError> {
        codec::check_int(self.caller_chain_id).map_err(|_| ContractError::InvalidCallerChainId)?;
        codec::check_int(self.execution_chain_id)
            .map_err(|_| ContractError::InvalidExecutionChainId)?;
        codec::check_int(self.nonce).map_err(|_| ContractError::InvalidNonce)?;
        codec::check_int(self.block_number).map_err(|_| ContractError::InvalidBlockNumber)?;
        codec::require_non_empty(&self.caller).map_err(|_| ContractError::InvalidCaller)?;
        codec::require_non_empty(&self.execution_contract)
            .map_err(|_| ContractError::InvalidExecutionContract)?;
        codec::require_non_empty(&self.tx_hash).map_err(|_| ContractError::InvalidTxHash)?;
        match &self.payload {
            CallPayload::Waves(call) => {
                codec::require_non_empty(&call.function_name)
                    .map_err(|_| ContractError::InvalidFunctionName)?;
                for arg in call.args.iter() {
                    if arg.len() > codec::MAX_FIELD_LEN
                        || codec::contains_separator(&arg.to_bytes())
                    {
                        return Err(ContractError::InvalidArgs);
                    }
                }
            }
            CallPayload::Evm(calldata) => {
                if calldata.is_empty() {
                    return Err(ContractError::InvalidCalldata);
                }
            }
        }
        Ok(())
    }

    /// Canonical byte serialization covered by the content hash.
    pub fn preimage(&self, env: &Env) -> Bytes {
        let mut out = Bytes::new(env);
        push_be64(env, &mut out, self.caller_chain_id);
        push_be64(env, &mut out, self.execution_chain_id);
        push_be64(env, &mut out, self.nonce);
        push_prefixed(env, &mut out, &self.caller.to_bytes());
        push_prefixed(env, &mut out, &self.execution_contract.to_bytes());
        match &self.payload {
            CallPayload::Waves(call) => {
                out.push_back(WAVES_TAG);
                push_prefixed(env, &mut out, &call.function_name.to_bytes());
                out.append(&Bytes::from_array(env, &call.args.len().to_be_bytes()));
                for arg in call.args.iter() {
                    push_prefixed(env, &mut out, &arg.to_bytes());
                }
            }
            CallPayload::Evm(calldata) => {
                out.push_back(EVM_TAG);
                push_prefixed(env, &mut out, calldata);
            }
        }
        push_prefixed(env, &mut out, &self.tx_hash.to_bytes());
        push_be64(env, &mut out, self.block_number);
        out
    }

    pub fn content_hash(&self, env: &Env) -> BytesN<32> {
        env.crypto().keccak256(&self.preimage(env)).into()
    }
}

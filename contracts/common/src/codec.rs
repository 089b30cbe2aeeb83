//! Field validation and the `__`-joined boundary encoding.
//!
//! Records are stored as typed `#[contracttype]` values. The `__`-joined form
//! only exists at the edge, for clients that read composite records as flat
//! strings, so the separator is rejected inside every free-form field that
//! can end up in such a record.

use soroban_sdk::{Address, Bytes, Env, String, Vec};

use crate::CommonError;

/// Field separator and list delimiter of the flat encoding.
pub const SEPARATOR: [u8; 2] = *b"__";

/// Upper bound on any single string field.
pub const MAX_FIELD_LEN: u32 = 1024;

/// Largest integer accepted on input (`2^63 - 1`).
pub const MAX_INT: u64 = i64::MAX as u64;

/// Range-check an integer input against `[0, 2^63 - 1]`.
pub fn check_int(value: u64) -> Result<u64, CommonError> {
    if value > MAX_INT {
        return Err(CommonError::IntegerOutOfRange);
    }
    Ok(value)
}

pub fn contains_separator(bytes: &Bytes) -> bool {
    let mut prev_underscore = false;
    for b in bytes.iter() {
        let underscore = b == SEPARATOR[0];
        if underscore && prev_underscore {
            return true;
        }
        prev_underscore = underscore;
    }
    false
}

/// UTF-8 bytes of a non-empty string field.
pub fn require_non_empty(s: &String) -> Result<Bytes, CommonError> {
    if s.len() > MAX_FIELD_LEN {
        return Err(CommonError::FieldTooLong);
    }
    if s.len() == 0 {
        return Err(CommonError::EmptyField);
    }
    Ok(s.to_bytes())
}

/// UTF-8 bytes of a non-empty, separator-free string field.
pub fn require_field(s: &String) -> Result<Bytes, CommonError> {
    let bytes = require_non_empty(s)?;
    if contains_separator(&bytes) {
        return Err(CommonError::ContainsSeparator);
    }
    Ok(bytes)
}

/// Decimal ASCII rendering of `n`.
pub fn decimal(env: &Env, n: u64) -> Bytes {
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    let mut v = n;
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    Bytes::from_slice(env, &buf[i..])
}

/// Builds one `__`-joined record, field by field, in insertion order.
pub struct Joiner {
    env: Env,
    out: Bytes,
    started: bool,
}

impl Joiner {
    pub fn new(env: &Env) -> Self {
        Joiner {
            env: env.clone(),
            out: Bytes::new(env),
            started: false,
        }
    }

    fn separate(&mut self) {
        if self.started {
            self.out.append(&Bytes::from_slice(&self.env, &SEPARATOR));
        }
        self.started = true;
    }

    pub fn bytes(mut self, field: &Bytes) -> Self {
        self.separate();
        self.out.append(field);
        self
    }

    pub fn string(self, field: &String) -> Self {
        self.bytes(&field.to_bytes())
    }

    pub fn int(self, field: u64) -> Self {
        let rendered = decimal(&self.env, field);
        self.bytes(&rendered)
    }

    pub fn address(self, field: &Address) -> Self {
        self.string(&field.to_string())
    }

    /// Appends every item of a list, each as its own field.
    pub fn strings(mut self, items: &Vec<String>) -> Self {
        for item in items.iter() {
            self = self.string(&item);
        }
        self
    }

    pub fn finish(self) -> Bytes {
        self.out
    }
}

/// `a__b__c` rendering of a string list.
pub fn join_strings(env: &Env, items: &Vec<String>) -> Bytes {
    Joiner::new(env).strings(items).finish()
}

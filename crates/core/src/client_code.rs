//! Client-facing user code.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Alphabet the allocator draws from: uppercase letters and digits.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fixed length of every client code.
pub const CODE_LEN: usize = 5;

/// Short unique external identifier for a user, distinct from the store's
/// internal id. Assigned once at creation and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientCode(String);

impl ClientCode {
    /// Build a code from raw characters, validating length and alphabet.
    pub fn new(code: impl Into<String>) -> Result<Self, SyncError> {
        let code = code.into();
        if code.len() != CODE_LEN {
            return Err(SyncError::invalid_id(format!(
                "client code must be {CODE_LEN} characters, got {}",
                code.len()
            )));
        }
        if !code.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(SyncError::invalid_id(format!(
                "client code '{code}' contains characters outside [A-Z0-9]"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ClientCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClientCode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ClientCode {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientCode> for String {
    fn from(value: ClientCode) -> Self {
        value.0
    }
}

//! Shared error model.

use thiserror::Error;

use crate::id::UserId;

/// Result type used across the workspace.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised by the queue, tracker, allocator, and store.
///
/// All errors are synchronous and local to the call that raised them; the
/// core never retries internally. Retry is an explicit caller action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A referenced user or operation does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A non-terminal operation already exists for this (user, operation type).
    #[error("duplicate operation '{operation_type}' for user {user_id}")]
    DuplicateOperation {
        user_id: UserId,
        operation_type: String,
    },

    /// Client-code allocation hit the attempt cap without finding a free code.
    #[error("client code space exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// An illegal state transition was requested (operator must intervene).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Store-level failure (lock poisoning, backend I/O).
    #[error("storage error: {0}")]
    Storage(String),
}

impl SyncError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

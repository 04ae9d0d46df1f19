//! `syncbridge-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the shared error taxonomy, status vocabularies, and the
//! client-code value object.

pub mod client_code;
pub mod error;
pub mod id;
pub mod status;

pub use client_code::ClientCode;
pub use error::{SyncError, SyncResult};
pub use id::{OperationId, UserId};
pub use status::{MindReportStatus, OperationStatus, SyncStatus};

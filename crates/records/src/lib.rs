//! `syncbridge-records` — user and operation records.
//!
//! The record types own the state-machine and append-only-log invariants;
//! storage and queue orchestration live in `syncbridge-queue`.

pub mod classify;
pub mod history;
pub mod operation;
pub mod user;

pub use classify::{classify_mind_report, classify_sync, Eligibility};
pub use operation::{Operation, OperationType};
pub use user::{NewUser, User};

//! User record and its state-machine invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use syncbridge_core::{ClientCode, MindReportStatus, SyncError, SyncResult, SyncStatus, UserId};

use crate::history::string_or_seq;

/// Input for registering a new user. The client code is allocated by the
/// directory, not supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}

impl NewUser {
    pub fn named(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: None,
            telephone: None,
            email: None,
        }
    }
}

/// A user record as held by the entity store.
///
/// `recording_instruction` and `error_reason` are monotonically growing logs,
/// not mutable scalars. The only sanctioned truncation is the error-log clear
/// inside [`User::apply_synced`]. Field names are camelCase on the wire to
/// match the store's documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Globally unique, assigned once at creation, immutable thereafter.
    pub client_code: ClientCode,
    pub first_name: String,
    pub last_name: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    /// Historical recording links accumulated over retries. Append-only.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub recording_instruction: Vec<String>,
    /// True once the primary creation side-effect has succeeded.
    pub is_created_locally: bool,
    /// `None` models the unset state of a fresh record.
    pub sync_status: Option<SyncStatus>,
    /// Append-only error history; tolerates the legacy scalar shape on read.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub error_reason: Vec<String>,
    pub mind_report_status: Option<MindReportStatus>,
    pub mind_report_file_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record with unset statuses and empty logs.
    pub fn register(id: UserId, client_code: ClientCode, input: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id,
            client_code,
            first_name: input.first_name,
            last_name: input.last_name,
            telephone: input.telephone,
            email: input.email,
            recording_instruction: Vec::new(),
            is_created_locally: false,
            sync_status: None,
            error_reason: Vec::new(),
            mind_report_status: None,
            mind_report_file_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an entry to the error history. Never truncates.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.error_reason.push(message.into());
    }

    /// Append a recording link to the instruction log.
    pub fn push_recording_link(&mut self, link: impl Into<String>) {
        self.recording_instruction.push(link.into());
    }

    /// Confirmed successful creation: record the link, flip the local flag,
    /// and reset the error history to a clean slate.
    ///
    /// This is the single place the error log may shrink.
    pub fn apply_synced(&mut self, recording_link: impl Into<String>) {
        self.recording_instruction.push(recording_link.into());
        self.is_created_locally = true;
        self.sync_status = Some(SyncStatus::Completed);
        self.error_reason.clear();
    }

    /// Explicit operator retry: back to `pending` with the audit trail intact.
    ///
    /// Refused while `processing` (an in-flight worker must not have the
    /// record reset underneath it) and after `completed` (the side effect
    /// already succeeded; re-running it needs a deliberate new record).
    pub fn apply_retry_reset(&mut self) -> SyncResult<()> {
        match self.sync_status {
            Some(SyncStatus::Processing) => Err(SyncError::invalid_state(format!(
                "user {} is processing; cannot reset an in-flight sync",
                self.id
            ))),
            Some(SyncStatus::Completed) => Err(SyncError::invalid_state(format!(
                "user {} already completed; re-running sync requires a new record",
                self.id
            ))),
            _ => {
                self.sync_status = Some(SyncStatus::Pending);
                self.is_created_locally = false;
                Ok(())
            }
        }
    }

    /// Set the sync status, optionally appending an error entry.
    pub fn set_sync_status(&mut self, status: SyncStatus, error: Option<String>) {
        self.sync_status = Some(status);
        if let Some(message) = error {
            self.error_reason.push(message);
        }
    }

    /// Set the mind-report status, optionally appending an error entry.
    pub fn set_mind_report_status(&mut self, status: MindReportStatus, error: Option<String>) {
        self.mind_report_status = Some(status);
        if let Some(message) = error {
            self.error_reason.push(message);
        }
    }

    /// Record a retrieved report link and mark the report retrieval done.
    pub fn apply_mind_report_ready(&mut self, file_link: impl Into<String>) {
        self.mind_report_file_link = Some(file_link.into());
        self.mind_report_status = Some(MindReportStatus::Completed);
    }
}

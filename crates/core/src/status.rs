//! Status vocabularies for users, mind reports, and operations.
//!
//! The legacy store kept these as free-form strings; they are modeled here as
//! closed enums so the classifier and queue logic get exhaustiveness checking
//! instead of string comparison. The *unset* state is `Option<...>` on the
//! record, matching the store's optional fields.

use serde::{Deserialize, Serialize};

/// Primary sync state of a user record (remote account creation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// The legacy app reported a different client id than the one sent.
    ClientIdMismatch,
    /// A cleanup/delete pass in the legacy app failed.
    DeleteFailed,
    /// The backing MySQL row vanished mid-sync.
    MysqlErrorDeleted,
    /// The clipboard hand-off into the legacy app failed.
    ClipboardCopyFailed,
}

impl SyncStatus {
    /// Statuses that require a human to look at the record before any
    /// automatic retry is allowed.
    pub fn requires_intervention(self) -> bool {
        matches!(
            self,
            Self::ClientIdMismatch
                | Self::DeleteFailed
                | Self::MysqlErrorDeleted
                | Self::ClipboardCopyFailed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::ClientIdMismatch => "client_id_mismatch",
            Self::DeleteFailed => "delete_failed",
            Self::MysqlErrorDeleted => "mysql_error_deleted",
            Self::ClipboardCopyFailed => "clipboard_copy_failed",
        }
    }
}

/// Sync state of the secondary, independently tracked report retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MindReportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl MindReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Lifecycle state of a queued operation.
///
/// `pending → processing → {completed, failed}`; terminal states never
/// transition out (the operation is an audit record once finished).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether an operation in this state blocks another enqueue of the same
    /// (user, operation type) pair.
    pub fn blocks_enqueue(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervention_statuses_are_exactly_the_manual_four() {
        let manual = [
            SyncStatus::ClientIdMismatch,
            SyncStatus::DeleteFailed,
            SyncStatus::MysqlErrorDeleted,
            SyncStatus::ClipboardCopyFailed,
        ];
        for status in manual {
            assert!(status.requires_intervention());
        }
        for status in [
            SyncStatus::Pending,
            SyncStatus::Processing,
            SyncStatus::Completed,
            SyncStatus::Failed,
        ] {
            assert!(!status.requires_intervention());
        }
    }

    #[test]
    fn operation_status_blocking_set() {
        assert!(OperationStatus::Pending.blocks_enqueue());
        assert!(OperationStatus::Processing.blocks_enqueue());
        assert!(!OperationStatus::Completed.blocks_enqueue());
        assert!(!OperationStatus::Failed.blocks_enqueue());
    }

    #[test]
    fn serde_uses_snake_case_wire_names() {
        let json = serde_json::to_string(&SyncStatus::ClientIdMismatch).unwrap();
        assert_eq!(json, "\"client_id_mismatch\"");
        let back: SyncStatus = serde_json::from_str("\"mysql_error_deleted\"").unwrap();
        assert_eq!(back, SyncStatus::MysqlErrorDeleted);
    }
}

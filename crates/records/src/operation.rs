//! Operation record: one unit of asynchronous work tied to one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use syncbridge_core::{OperationId, OperationStatus, SyncError, SyncResult, UserId};

use crate::history::string_or_seq;

/// Kind of work an operation represents, used to route to a worker handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Create the user's account in the legacy desktop app.
    CreateUser,
    /// Retrieve and upload the user's mind report.
    GetMindReport,
    /// Escape hatch for operation types the core does not know about.
    Custom { kind: String },
}

impl OperationType {
    pub fn custom(kind: impl Into<String>) -> Self {
        Self::Custom { kind: kind.into() }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateUser => "create_user",
            Self::GetMindReport => "get_mind_report",
            Self::Custom { kind } => kind,
        }
    }
}

impl core::fmt::Display for OperationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued unit of work.
///
/// Operations are never deleted; once terminal they remain as an audit
/// record and their status is immutable. The `user_id` is a back-reference,
/// not an ownership link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: OperationId,
    pub operation_type: OperationType,
    pub user_id: UserId,
    pub status: OperationStatus,
    /// Higher values are served first. Default 0.
    pub priority: i64,
    /// Append-only error history; tolerates the legacy scalar shape on read.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub error_reason: Vec<String>,
    /// Operation-type-specific payload, opaque to the queue.
    pub metadata: Option<JsonValue>,
    /// Store-assigned arrival index; the creation-order tiebreaker for the
    /// pending list. Zero until inserted.
    pub seq: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Operation {
    /// Create a new pending operation (not yet inserted; `seq` is assigned
    /// by the store).
    pub fn new(user_id: UserId, operation_type: OperationType) -> Self {
        let now = Utc::now();
        Self {
            id: OperationId::new(),
            operation_type,
            user_id,
            status: OperationStatus::Pending,
            priority: 0,
            error_reason: Vec::new(),
            metadata: None,
            seq: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Apply a status transition, optionally appending to the error history.
    ///
    /// Terminal states are immutable: any attempt to move a completed or
    /// failed operation to a *different* status is refused. Re-asserting the
    /// current status is allowed so callers can attach further error entries.
    pub fn transition(
        &mut self,
        status: OperationStatus,
        error: Option<String>,
    ) -> SyncResult<()> {
        if self.status.is_terminal() && status != self.status {
            return Err(SyncError::invalid_state(format!(
                "operation {} is {} and cannot move to {}",
                self.id,
                self.status.as_str(),
                status.as_str()
            )));
        }
        self.status = status;
        if let Some(message) = error {
            self.error_reason.push(message);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Append an error entry without touching the status.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.error_reason.push(message.into());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_operation() -> Operation {
        Operation::new(UserId::new(), OperationType::CreateUser)
    }

    #[test]
    fn new_operation_is_pending_with_default_priority() {
        let op = test_operation();
        assert_eq!(op.status, OperationStatus::Pending);
        assert_eq!(op.priority, 0);
        assert!(op.error_reason.is_empty());
        assert!(op.metadata.is_none());
    }

    #[test]
    fn lifecycle_pending_processing_completed() {
        let mut op = test_operation();
        op.transition(OperationStatus::Processing, None).unwrap();
        assert_eq!(op.status, OperationStatus::Processing);
        op.transition(OperationStatus::Completed, None).unwrap();
        assert_eq!(op.status, OperationStatus::Completed);
    }

    #[test]
    fn terminal_status_is_immutable() {
        let mut op = test_operation();
        op.transition(OperationStatus::Failed, Some("boom".to_string()))
            .unwrap();

        let err = op
            .transition(OperationStatus::Pending, None)
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidState(_)));
        assert_eq!(op.status, OperationStatus::Failed);
    }

    #[test]
    fn terminal_operation_still_accepts_error_entries() {
        let mut op = test_operation();
        op.transition(OperationStatus::Failed, Some("first".to_string()))
            .unwrap();
        op.transition(OperationStatus::Failed, Some("second".to_string()))
            .unwrap();
        op.push_error("third");
        assert_eq!(op.error_reason, vec!["first", "second", "third"]);
    }

    #[test]
    fn unclaim_back_to_pending_is_allowed_before_terminal() {
        // An interrupted worker may hand a claimed operation back.
        let mut op = test_operation();
        op.transition(OperationStatus::Processing, None).unwrap();
        op.transition(OperationStatus::Pending, Some("interrupted".to_string()))
            .unwrap();
        assert_eq!(op.status, OperationStatus::Pending);
    }

    #[test]
    fn operation_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&OperationType::CreateUser).unwrap(),
            "\"create_user\""
        );
        assert_eq!(
            serde_json::to_string(&OperationType::GetMindReport).unwrap(),
            "\"get_mind_report\""
        );
        assert_eq!(OperationType::custom("export_eeg").as_str(), "export_eeg");
    }
}

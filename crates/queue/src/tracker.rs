//! Status and error-history mutations for user records.

use std::sync::Arc;

use syncbridge_core::{MindReportStatus, OperationId, SyncResult, SyncStatus, UserId};

use crate::store::EntityStore;

/// Append-only accumulation of error reasons and status transitions, plus
/// the explicit retry-reset protocol. Every method is one atomic patch.
pub struct StatusTracker<S> {
    store: Arc<S>,
}

impl<S: EntityStore> StatusTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append to a user's error history without touching any status.
    pub fn record_user_error(&self, user_id: UserId, message: &str) -> SyncResult<()> {
        self.store.patch_user(user_id, &mut |user| {
            user.push_error(message);
            Ok(())
        })
    }

    /// Append to an operation's error history without touching its status.
    pub fn record_operation_error(
        &self,
        operation_id: OperationId,
        message: &str,
    ) -> SyncResult<()> {
        self.store.patch_operation(operation_id, &mut |operation| {
            operation.push_error(message);
            Ok(())
        })
    }

    /// Confirmed successful creation in the legacy app: record the recording
    /// link, flip `is_created_locally`, mark the sync completed, and clear
    /// the error history (the one sanctioned reset).
    pub fn mark_synced(&self, user_id: UserId, recording_link: &str) -> SyncResult<()> {
        self.store.patch_user(user_id, &mut |user| {
            user.apply_synced(recording_link);
            Ok(())
        })?;
        tracing::info!(user_id = %user_id, "user synced");
        Ok(())
    }

    /// Set the user's sync status, optionally appending an error entry.
    pub fn mark_sync_status(
        &self,
        user_id: UserId,
        status: SyncStatus,
        error_reason: Option<String>,
    ) -> SyncResult<()> {
        self.store.patch_user(user_id, &mut |user| {
            user.set_sync_status(status, error_reason.clone());
            Ok(())
        })
    }

    /// Set the mind-report status, optionally appending an error entry.
    pub fn mark_mind_report_status(
        &self,
        user_id: UserId,
        status: MindReportStatus,
        error_reason: Option<String>,
    ) -> SyncResult<()> {
        self.store.patch_user(user_id, &mut |user| {
            user.set_mind_report_status(status, error_reason.clone());
            Ok(())
        })
    }

    /// Store the retrieved report link and mark the retrieval completed.
    pub fn mark_mind_report_ready(&self, user_id: UserId, file_link: &str) -> SyncResult<()> {
        self.store.patch_user(user_id, &mut |user| {
            user.apply_mind_report_ready(file_link);
            Ok(())
        })?;
        tracing::info!(user_id = %user_id, "mind report stored");
        Ok(())
    }

    /// Explicit operator retry: back to `pending`, logs preserved.
    ///
    /// Fails with `InvalidState` while the sync is `processing` (never reset
    /// under a live worker) or after `completed` (strict policy), leaving
    /// the record unchanged.
    pub fn reset_for_retry(&self, user_id: UserId) -> SyncResult<()> {
        self.store
            .patch_user(user_id, &mut |user| user.apply_retry_reset())?;
        tracing::info!(user_id = %user_id, "user reset for retry");
        Ok(())
    }
}

//! Operation queue manager.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use syncbridge_core::{OperationId, OperationStatus, SyncError, SyncResult, UserId};
use syncbridge_records::{Operation, OperationType, User};

use crate::store::EntityStore;

/// Optional enqueue parameters.
#[derive(Debug, Clone, Default)]
pub struct EnqueueRequest {
    /// Higher values are served first. Default 0.
    pub priority: i64,
    /// Opaque payload stored and returned verbatim.
    pub metadata: Option<JsonValue>,
}

impl EnqueueRequest {
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A pending operation joined with its user, as handed to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub operation: Operation,
    pub user: User,
}

/// Enqueues, deduplicates, orders, and transitions operations.
pub struct OperationQueue<S> {
    store: Arc<S>,
}

impl<S: EntityStore> OperationQueue<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Enqueue work for a user.
    ///
    /// Fails with `NotFound` if the user does not exist and with
    /// `DuplicateOperation` if a pending or processing operation of the same
    /// type already exists (the store performs that check-then-insert
    /// atomically).
    pub fn enqueue(
        &self,
        user_id: UserId,
        operation_type: OperationType,
        request: EnqueueRequest,
    ) -> SyncResult<OperationId> {
        if self.store.user(user_id)?.is_none() {
            return Err(SyncError::not_found(format!("user {user_id}")));
        }

        let mut operation =
            Operation::new(user_id, operation_type).with_priority(request.priority);
        if let Some(metadata) = request.metadata {
            operation = operation.with_metadata(metadata);
        }

        let stored = self.store.insert_operation(operation)?;
        tracing::debug!(
            operation_id = %stored.id,
            user_id = %user_id,
            operation_type = %stored.operation_type,
            priority = stored.priority,
            "enqueued operation"
        );
        Ok(stored.id)
    }

    /// Snapshot of pending work, ordered by priority descending with arrival
    /// order breaking ties (oldest first).
    ///
    /// Operations whose user record has vanished are dropped from the view:
    /// store inconsistency the caller should tolerate, not an error.
    pub fn list_pending(&self) -> SyncResult<Vec<PendingOperation>> {
        let mut pending = Vec::new();
        for operation in self.store.operations()? {
            if operation.status != OperationStatus::Pending {
                continue;
            }
            match self.store.user(operation.user_id)? {
                Some(user) => pending.push(PendingOperation { operation, user }),
                None => {
                    tracing::warn!(
                        operation_id = %operation.id,
                        user_id = %operation.user_id,
                        "dropping pending operation whose user no longer exists"
                    );
                }
            }
        }
        pending.sort_by(|a, b| {
            b.operation
                .priority
                .cmp(&a.operation.priority)
                .then(a.operation.seq.cmp(&b.operation.seq))
        });
        Ok(pending)
    }

    /// Single mutation path for worker claim, success, and failure reports.
    /// A provided error reason is appended to the operation's history.
    pub fn set_status(
        &self,
        id: OperationId,
        status: OperationStatus,
        error_reason: Option<String>,
    ) -> SyncResult<()> {
        self.store
            .patch_operation(id, &mut |operation| {
                operation.transition(status, error_reason.clone())
            })
    }

    /// Atomically claim a pending operation for processing.
    ///
    /// Returns `Ok(false)` without modifying anything if the operation is no
    /// longer pending (another worker won the race, or the snapshot was
    /// stale). This is how a worker honors "never claim an operation already
    /// processing".
    pub fn claim(&self, id: OperationId) -> SyncResult<bool> {
        let mut claimed = false;
        self.store.patch_operation(id, &mut |operation| {
            if operation.status == OperationStatus::Pending {
                operation.transition(OperationStatus::Processing, None)?;
                claimed = true;
            }
            Ok(())
        })?;
        Ok(claimed)
    }

    /// Terminal success without touching the error history.
    pub fn complete(&self, id: OperationId) -> SyncResult<()> {
        self.set_status(id, OperationStatus::Completed, None)
    }

    pub fn get(&self, id: OperationId) -> SyncResult<Operation> {
        self.store
            .operation(id)?
            .ok_or_else(|| SyncError::not_found(format!("operation {id}")))
    }
}

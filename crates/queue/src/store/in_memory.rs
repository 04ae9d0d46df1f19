//! In-memory reference store.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use syncbridge_core::{ClientCode, OperationId, SyncError, SyncResult, UserId};
use syncbridge_records::{Operation, User};

use super::EntityStore;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    user_order: Vec<UserId>,
    codes: HashSet<String>,
    operations: HashMap<OperationId, Operation>,
    operation_order: Vec<OperationId>,
    next_seq: u64,
}

/// In-memory [`EntityStore`] for tests and the single-process deployment.
///
/// A single `RwLock` over the whole dataset gives every mutating call the
/// serialized read-modify-write semantics the trait demands; reads return
/// snapshot clones.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> SyncResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| SyncError::storage(format!("store lock poisoned: {e}")))
    }

    fn write(&self) -> SyncResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| SyncError::storage(format!("store lock poisoned: {e}")))
    }
}

impl EntityStore for InMemoryStore {
    fn insert_user(&self, user: User) -> SyncResult<UserId> {
        let mut inner = self.write()?;
        if inner.users.contains_key(&user.id) {
            return Err(SyncError::invalid_state(format!(
                "user {} already exists",
                user.id
            )));
        }
        if inner.codes.contains(user.client_code.as_str()) {
            return Err(SyncError::invalid_state(format!(
                "client code {} already in use",
                user.client_code
            )));
        }
        let id = user.id;
        inner.codes.insert(user.client_code.as_str().to_owned());
        inner.user_order.push(id);
        inner.users.insert(id, user);
        Ok(id)
    }

    fn user(&self, id: UserId) -> SyncResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn users(&self) -> SyncResult<Vec<User>> {
        let inner = self.read()?;
        Ok(inner
            .user_order
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    fn patch_user(
        &self,
        id: UserId,
        patch: &mut dyn FnMut(&mut User) -> SyncResult<()>,
    ) -> SyncResult<()> {
        let mut inner = self.write()?;
        let current = inner
            .users
            .get(&id)
            .ok_or_else(|| SyncError::not_found(format!("user {id}")))?;

        // Work on a copy so a failed patch leaves the record untouched.
        let mut updated = current.clone();
        patch(&mut updated)?;
        updated.updated_at = Utc::now();
        inner.users.insert(id, updated);
        Ok(())
    }

    fn client_code_in_use(&self, code: &ClientCode) -> SyncResult<bool> {
        Ok(self.read()?.codes.contains(code.as_str()))
    }

    fn insert_operation(&self, mut operation: Operation) -> SyncResult<Operation> {
        let mut inner = self.write()?;

        // Dedup scan and insert under the same lock: the single atomic unit
        // the queue manager relies on.
        let duplicate = inner.operations.values().any(|existing| {
            existing.user_id == operation.user_id
                && existing.operation_type == operation.operation_type
                && existing.status.blocks_enqueue()
        });
        if duplicate {
            return Err(SyncError::DuplicateOperation {
                user_id: operation.user_id,
                operation_type: operation.operation_type.as_str().to_owned(),
            });
        }

        inner.next_seq += 1;
        operation.seq = inner.next_seq;
        let id = operation.id;
        inner.operation_order.push(id);
        inner.operations.insert(id, operation.clone());
        Ok(operation)
    }

    fn operation(&self, id: OperationId) -> SyncResult<Option<Operation>> {
        Ok(self.read()?.operations.get(&id).cloned())
    }

    fn operations(&self) -> SyncResult<Vec<Operation>> {
        let inner = self.read()?;
        Ok(inner
            .operation_order
            .iter()
            .filter_map(|id| inner.operations.get(id).cloned())
            .collect())
    }

    fn operations_for_user(&self, user_id: UserId) -> SyncResult<Vec<Operation>> {
        let inner = self.read()?;
        Ok(inner
            .operation_order
            .iter()
            .filter_map(|id| inner.operations.get(id))
            .filter(|op| op.user_id == user_id)
            .cloned()
            .collect())
    }

    fn patch_operation(
        &self,
        id: OperationId,
        patch: &mut dyn FnMut(&mut Operation) -> SyncResult<()>,
    ) -> SyncResult<()> {
        let mut inner = self.write()?;
        let current = inner
            .operations
            .get(&id)
            .ok_or_else(|| SyncError::not_found(format!("operation {id}")))?;

        let mut updated = current.clone();
        patch(&mut updated)?;
        inner.operations.insert(id, updated);
        Ok(())
    }
}

//! Entity store abstraction.

mod in_memory;

pub use in_memory::InMemoryStore;

use syncbridge_core::{ClientCode, OperationId, SyncResult, UserId};
use syncbridge_records::{Operation, User};

/// Storage boundary for user and operation records.
///
/// Contract: every method is a single-document atomic unit. `patch_*`
/// closures run under the store's write lock against a working copy; the
/// record is replaced only when the closure returns `Ok`, so a failed patch
/// leaves the record unchanged. `insert_operation` performs its duplicate
/// scan and the insert under one lock, which is what upholds the dedup
/// invariant against concurrent producers. Implementations backed by a real
/// database inherit these obligations explicitly.
pub trait EntityStore: Send + Sync {
    /// Insert a new user, enforcing client-code uniqueness.
    fn insert_user(&self, user: User) -> SyncResult<UserId>;

    fn user(&self, id: UserId) -> SyncResult<Option<User>>;

    /// All users in insertion order (the "store iteration order" the
    /// pending-user lists inherit).
    fn users(&self) -> SyncResult<Vec<User>>;

    /// Atomic read-modify-write of one user record.
    fn patch_user(
        &self,
        id: UserId,
        patch: &mut dyn FnMut(&mut User) -> SyncResult<()>,
    ) -> SyncResult<()>;

    /// Indexed equality lookup over client codes.
    fn client_code_in_use(&self, code: &ClientCode) -> SyncResult<bool>;

    /// Insert a new operation: assigns the arrival index (`seq`) and refuses
    /// the insert with `DuplicateOperation` if a pending or processing
    /// operation already exists for the same (user, operation type).
    fn insert_operation(&self, operation: Operation) -> SyncResult<Operation>;

    fn operation(&self, id: OperationId) -> SyncResult<Option<Operation>>;

    /// All operations in arrival order (`seq` ascending).
    fn operations(&self) -> SyncResult<Vec<Operation>>;

    fn operations_for_user(&self, user_id: UserId) -> SyncResult<Vec<Operation>>;

    /// Atomic read-modify-write of one operation record.
    fn patch_operation(
        &self,
        id: OperationId,
        patch: &mut dyn FnMut(&mut Operation) -> SyncResult<()>,
    ) -> SyncResult<()>;
}

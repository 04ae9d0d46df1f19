//! User registration and pending-user listing.

use std::sync::Arc;

use syncbridge_core::{SyncError, SyncResult, UserId};
use syncbridge_records::{classify_mind_report, classify_sync, Eligibility, NewUser, User};

use crate::allocator::CodeAllocator;
use crate::store::EntityStore;

/// Front door for user records: registration with client-code allocation,
/// lookups, and the classifier-driven pending lists the worker polls.
pub struct UserDirectory<S> {
    store: Arc<S>,
    allocator: CodeAllocator<S>,
}

impl<S: EntityStore> UserDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        let allocator = CodeAllocator::new(store.clone());
        Self { store, allocator }
    }

    pub fn with_allocator(store: Arc<S>, allocator: CodeAllocator<S>) -> Self {
        Self { store, allocator }
    }

    /// Register a new user: allocate a unique client code and insert the
    /// record with unset statuses and empty logs.
    pub fn register(&self, input: NewUser) -> SyncResult<User> {
        let code = self.allocator.allocate()?;
        let user = User::register(UserId::new(), code, input);
        self.store.insert_user(user.clone())?;
        tracing::info!(user_id = %user.id, client_code = %user.client_code, "registered user");
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> SyncResult<User> {
        self.store
            .user(id)?
            .ok_or_else(|| SyncError::not_found(format!("user {id}")))
    }

    /// Users still needing the primary creation side-effect, in store
    /// iteration order.
    pub fn list_pending_users(&self) -> SyncResult<Vec<User>> {
        Ok(self
            .store
            .users()?
            .into_iter()
            .filter(|user| classify_sync(user) == Eligibility::Eligible)
            .collect())
    }

    /// Users whose mind report is still awaiting retrieval.
    pub fn list_mind_report_pending(&self) -> SyncResult<Vec<User>> {
        Ok(self
            .store
            .users()?
            .into_iter()
            .filter(|user| classify_mind_report(user) == Eligibility::Eligible)
            .collect())
    }
}

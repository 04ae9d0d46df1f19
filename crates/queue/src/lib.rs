//! `syncbridge-queue` — storage boundary and queue orchestration.
//!
//! The store trait is the transactional seam: every mutating call here reads
//! and writes exactly one user or operation record under the store's write
//! lock, so concurrent producers and workers cannot race past the dedup
//! invariant or lose log appends.

pub mod allocator;
pub mod directory;
pub mod queue;
pub mod store;
pub mod tracker;
pub mod worker;

pub use allocator::CodeAllocator;
pub use directory::UserDirectory;
pub use queue::{EnqueueRequest, OperationQueue, PendingOperation};
pub use store::{EntityStore, InMemoryStore};
pub use tracker::StatusTracker;
pub use worker::{OperationWorker, WorkOutcome, WorkerConfig, WorkerHandle};

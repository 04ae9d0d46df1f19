//! Polling worker harness.
//!
//! The queue itself is a passive data structure; this harness is the polling
//! consumer that claims pending operations, runs a registered handler for
//! the side effect, and reports the terminal status back through the queue
//! and tracker. The handler is where the actual legacy-app automation lives;
//! from the core's point of view it is an opaque function.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use syncbridge_core::{MindReportStatus, OperationStatus, SyncResult, SyncStatus};
use syncbridge_records::{Operation, OperationType, User};

use crate::queue::{OperationQueue, PendingOperation};
use crate::store::EntityStore;
use crate::tracker::StatusTracker;

/// What a handler reports back after attempting the side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    /// Side effect succeeded; `link` carries the recording link or report
    /// file link when the operation type produces one.
    Completed { link: Option<String> },
    /// Side effect failed with a reason for the error history.
    Failed(String),
}

impl WorkOutcome {
    pub fn completed() -> Self {
        Self::Completed { link: None }
    }

    pub fn completed_with_link(link: impl Into<String>) -> Self {
        Self::Completed {
            link: Some(link.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Handler function for one operation type.
pub type OperationHandler = Box<dyn Fn(&Operation, &User) -> WorkOutcome + Send + Sync>;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How often to poll for pending operations.
    pub poll_interval: Duration,
    /// Name for logging and the thread.
    pub name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            name: "sync-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Worker runtime counters.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct WorkerStats {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Handle to control a running worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the thread to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

/// Polls the queue and drives operations through their side effects.
pub struct OperationWorker<S> {
    queue: OperationQueue<S>,
    tracker: StatusTracker<S>,
    handlers: HashMap<OperationType, OperationHandler>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl<S: EntityStore + 'static> OperationWorker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            queue: OperationQueue::new(store.clone()),
            tracker: StatusTracker::new(store),
            handlers: HashMap::new(),
            stats: Arc::new(Mutex::new(WorkerStats::default())),
        }
    }

    /// Register the handler for an operation type.
    pub fn register_handler<F>(&mut self, operation_type: OperationType, handler: F)
    where
        F: Fn(&Operation, &User) -> WorkOutcome + Send + Sync + 'static,
    {
        self.handlers.insert(operation_type, Box::new(handler));
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Run one polling cycle synchronously; returns how many operations were
    /// claimed and driven to a terminal report.
    pub fn run_once(&self) -> SyncResult<usize> {
        let pending = self.queue.list_pending()?;
        let mut handled = 0;

        for PendingOperation { operation, user } in pending {
            // The snapshot may be stale; the atomic claim is the gate.
            if !self.queue.claim(operation.id)? {
                debug!(operation_id = %operation.id, "skipping operation no longer pending");
                continue;
            }
            self.mark_user_processing(&operation)?;
            debug!(
                operation_id = %operation.id,
                operation_type = %operation.operation_type,
                user_id = %user.id,
                "claimed operation"
            );

            let outcome = match self.handlers.get(&operation.operation_type) {
                Some(handler) => handler(&operation, &user),
                None => {
                    warn!(
                        operation_type = %operation.operation_type,
                        "no handler registered for operation type"
                    );
                    WorkOutcome::failed(format!(
                        "unknown operation type: {}",
                        operation.operation_type
                    ))
                }
            };
            self.report(&operation, outcome)?;
            handled += 1;
        }

        Ok(handled)
    }

    /// Advance the user-side status alongside the operation claim, for the
    /// operation types that track one.
    fn mark_user_processing(&self, operation: &Operation) -> SyncResult<()> {
        match operation.operation_type {
            OperationType::CreateUser => {
                self.tracker
                    .mark_sync_status(operation.user_id, SyncStatus::Processing, None)
            }
            OperationType::GetMindReport => self.tracker.mark_mind_report_status(
                operation.user_id,
                MindReportStatus::Processing,
                None,
            ),
            OperationType::Custom { .. } => Ok(()),
        }
    }

    fn report(&self, operation: &Operation, outcome: WorkOutcome) -> SyncResult<()> {
        match outcome {
            WorkOutcome::Completed { link } => {
                match (&operation.operation_type, link) {
                    (OperationType::CreateUser, Some(link)) => {
                        self.tracker.mark_synced(operation.user_id, &link)?;
                    }
                    (OperationType::CreateUser, None) => {
                        // Completed without a fresh link (e.g. the account
                        // already existed in the legacy database).
                        self.tracker.mark_sync_status(
                            operation.user_id,
                            SyncStatus::Completed,
                            None,
                        )?;
                    }
                    (OperationType::GetMindReport, Some(link)) => {
                        self.tracker.mark_mind_report_ready(operation.user_id, &link)?;
                    }
                    (OperationType::GetMindReport, None) => {
                        self.tracker.mark_mind_report_status(
                            operation.user_id,
                            MindReportStatus::Completed,
                            None,
                        )?;
                    }
                    (OperationType::Custom { .. }, _) => {}
                }
                self.queue.complete(operation.id)?;
                self.bump(|s| s.succeeded += 1);
            }
            WorkOutcome::Failed(reason) => {
                self.queue.set_status(
                    operation.id,
                    OperationStatus::Failed,
                    Some(reason.clone()),
                )?;
                match operation.operation_type {
                    OperationType::CreateUser => {
                        self.tracker.mark_sync_status(
                            operation.user_id,
                            SyncStatus::Failed,
                            Some(reason),
                        )?;
                    }
                    OperationType::GetMindReport => {
                        self.tracker.mark_mind_report_status(
                            operation.user_id,
                            MindReportStatus::Failed,
                            Some(reason),
                        )?;
                    }
                    OperationType::Custom { .. } => {}
                }
                self.bump(|s| s.failed += 1);
            }
        }
        self.bump(|s| s.processed += 1);
        Ok(())
    }

    fn bump(&self, f: impl FnOnce(&mut WorkerStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }

    /// Spawn the worker in a background thread.
    pub fn spawn(self, config: WorkerConfig) -> SyncResult<WorkerHandle> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let stats = self.stats.clone();

        let name = config.name.clone();
        let join = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(self, config, shutdown_rx))
            .map_err(|e| {
                syncbridge_core::SyncError::storage(format!("failed to spawn worker thread: {e}"))
            })?;

        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
            stats,
        })
    }
}

fn worker_loop<S: EntityStore + 'static>(
    worker: OperationWorker<S>,
    config: WorkerConfig,
    shutdown_rx: mpsc::Receiver<()>,
) {
    info!(worker = %config.name, "sync worker started");

    loop {
        match shutdown_rx.recv_timeout(config.poll_interval) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        match worker.run_once() {
            Ok(0) => {}
            Ok(handled) => debug!(worker = %config.name, handled, "processed operations"),
            Err(e) => error!(worker = %config.name, error = %e, "polling cycle failed"),
        }
    }

    info!(worker = %config.name, "sync worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use syncbridge_core::UserId;
    use syncbridge_records::NewUser;

    fn seed(store: &Arc<InMemoryStore>, code: &str, name: &str) -> User {
        let user = User::register(
            UserId::new(),
            syncbridge_core::ClientCode::new(code).unwrap(),
            NewUser::named(name),
        );
        store.insert_user(user.clone()).unwrap();
        user
    }

    #[test]
    fn create_user_success_flows_through_mark_synced() {
        let store = Arc::new(InMemoryStore::new());
        let user = seed(&store, "AAAA1", "Alice");
        let queue = OperationQueue::new(store.clone());
        let op_id = queue
            .enqueue(user.id, OperationType::CreateUser, Default::default())
            .unwrap();

        let mut worker = OperationWorker::new(store.clone());
        worker.register_handler(OperationType::CreateUser, |_op, _user| {
            WorkOutcome::completed_with_link("link1")
        });

        assert_eq!(worker.run_once().unwrap(), 1);

        let op = queue.get(op_id).unwrap();
        assert_eq!(op.status, OperationStatus::Completed);

        let user = store.user(user.id).unwrap().unwrap();
        assert!(user.is_created_locally);
        assert_eq!(user.sync_status, Some(SyncStatus::Completed));
        assert_eq!(user.recording_instruction, vec!["link1".to_string()]);
        assert_eq!(worker.stats().succeeded, 1);
    }

    #[test]
    fn handler_failure_reports_to_operation_and_user() {
        let store = Arc::new(InMemoryStore::new());
        let user = seed(&store, "AAAA1", "Alice");
        let queue = OperationQueue::new(store.clone());
        let op_id = queue
            .enqueue(user.id, OperationType::CreateUser, Default::default())
            .unwrap();

        let mut worker = OperationWorker::new(store.clone());
        worker.register_handler(OperationType::CreateUser, |_op, _user| {
            WorkOutcome::failed("window never appeared")
        });

        worker.run_once().unwrap();

        let op = queue.get(op_id).unwrap();
        assert_eq!(op.status, OperationStatus::Failed);
        assert_eq!(op.error_reason, vec!["window never appeared".to_string()]);

        let user = store.user(user.id).unwrap().unwrap();
        assert_eq!(user.sync_status, Some(SyncStatus::Failed));
        assert_eq!(user.error_reason, vec!["window never appeared".to_string()]);
        assert_eq!(worker.stats().failed, 1);
    }

    #[test]
    fn unknown_operation_type_fails_with_reason() {
        let store = Arc::new(InMemoryStore::new());
        let user = seed(&store, "AAAA1", "Alice");
        let queue = OperationQueue::new(store.clone());
        let op_id = queue
            .enqueue(
                user.id,
                OperationType::custom("export_eeg"),
                Default::default(),
            )
            .unwrap();

        let worker = OperationWorker::new(store.clone());
        worker.run_once().unwrap();

        let op = queue.get(op_id).unwrap();
        assert_eq!(op.status, OperationStatus::Failed);
        assert_eq!(
            op.error_reason,
            vec!["unknown operation type: export_eeg".to_string()]
        );
    }

    #[test]
    fn mind_report_success_stores_file_link() {
        let store = Arc::new(InMemoryStore::new());
        let user = seed(&store, "AAAA1", "Alice");
        let queue = OperationQueue::new(store.clone());
        queue
            .enqueue(user.id, OperationType::GetMindReport, Default::default())
            .unwrap();

        let mut worker = OperationWorker::new(store.clone());
        worker.register_handler(OperationType::GetMindReport, |_op, _user| {
            WorkOutcome::completed_with_link("https://files/report.pdf")
        });

        worker.run_once().unwrap();

        let user = store.user(user.id).unwrap().unwrap();
        assert_eq!(user.mind_report_status, Some(MindReportStatus::Completed));
        assert_eq!(
            user.mind_report_file_link.as_deref(),
            Some("https://files/report.pdf")
        );
    }

    #[test]
    fn spawned_worker_drains_queue_and_shuts_down() {
        let store = Arc::new(InMemoryStore::new());
        let user = seed(&store, "AAAA1", "Alice");
        let queue = OperationQueue::new(store.clone());
        let op_id = queue
            .enqueue(user.id, OperationType::CreateUser, Default::default())
            .unwrap();

        let mut worker = OperationWorker::new(store.clone());
        worker.register_handler(OperationType::CreateUser, |_op, _user| {
            WorkOutcome::completed_with_link("link1")
        });

        let handle = worker
            .spawn(WorkerConfig::default().with_poll_interval(Duration::from_millis(5)))
            .unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            let op = queue.get(op_id).unwrap();
            if op.status == OperationStatus::Completed {
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "worker did not complete the operation in time"
            );
            thread::sleep(Duration::from_millis(5));
        }

        handle.shutdown();
    }
}

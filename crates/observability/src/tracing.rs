//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset: quiet dependencies, the
/// syncbridge crates at info.
const DEFAULT_DIRECTIVES: &str = "warn,syncbridge_core=info,syncbridge_records=info,syncbridge_queue=info";

/// Initialize tracing/logging for the process.
///
/// JSON lines with timestamps and targets, filtered via `RUST_LOG` when set.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}

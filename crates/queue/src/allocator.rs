//! Client-code allocation.

use std::sync::Arc;

use rand::Rng;

use syncbridge_core::client_code::{CODE_ALPHABET, CODE_LEN};
use syncbridge_core::{ClientCode, SyncError, SyncResult};

use crate::store::EntityStore;

/// Hard cap on allocation attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Allocates unique client codes by rejection sampling.
///
/// Draws a fixed-length code uniformly at random and retries on collision.
/// Not probabilistically guaranteed to terminate, hence the attempt cap and
/// the explicit `Exhausted` failure.
pub struct CodeAllocator<S> {
    store: Arc<S>,
    max_attempts: u32,
}

impl<S: EntityStore> CodeAllocator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Allocate a code not currently in use.
    ///
    /// The uniqueness check here narrows the race window; the store's insert
    /// constraint is what makes uniqueness absolute.
    pub fn allocate(&self) -> SyncResult<ClientCode> {
        let mut rng = rand::rng();
        for _ in 0..self.max_attempts {
            let code = draw_code(&mut rng)?;
            if !self.store.client_code_in_use(&code)? {
                return Ok(code);
            }
            tracing::debug!(code = %code, "client code collision, redrawing");
        }
        Err(SyncError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

fn draw_code(rng: &mut impl Rng) -> SyncResult<ClientCode> {
    let raw: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    ClientCode::new(raw)
}

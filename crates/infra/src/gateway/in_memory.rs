use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use stockledger_inventory::Snapshot;

use super::{GatewayError, PersistenceGateway};

/// In-memory gateway for tests/dev.
///
/// Saves can be switched to fail so the "applied but not durable" path can be
/// exercised without a real backend.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    stored: RwLock<Snapshot>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent saves fail (`true`) or succeed (`false`).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// What a fresh `load()` would return.
    pub fn stored(&self) -> Snapshot {
        self.stored.read().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn load(&self) -> Result<Snapshot, GatewayError> {
        self.stored
            .read()
            .map(|s| s.clone())
            .map_err(|_| GatewayError::Unavailable("in-memory store poisoned".to_string()))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("saves disabled".to_string()));
        }
        let mut stored = self
            .stored
            .write()
            .map_err(|_| GatewayError::Unavailable("in-memory store poisoned".to_string()))?;
        *stored = snapshot.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

//! Persistence gateway: the load/save boundary for whole-state snapshots.

pub mod http;
pub mod in_memory;
pub mod json_file;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockledger_inventory::Snapshot;

pub use http::HttpGateway;
pub use in_memory::InMemoryGateway;
pub use json_file::JsonFileGateway;

/// Load/save failure.
///
/// These are **infrastructure errors**. The ledger service reports a failed
/// save as "applied but not durable"; it never rolls the in-memory change back.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport failed: {0}")]
    Transport(String),

    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Whole-snapshot persistence.
///
/// ## Semantics
///
/// - `load()` returns the full state; an absent store is an empty snapshot.
/// - `save()` overwrites the full state. There is no partial write and no
///   conflict detection: with several writers the last save wins.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn load(&self) -> Result<Snapshot, GatewayError>;

    async fn save(&self, snapshot: &Snapshot) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G> PersistenceGateway for Arc<G>
where
    G: PersistenceGateway + ?Sized,
{
    async fn load(&self) -> Result<Snapshot, GatewayError> {
        (**self).load().await
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        (**self).save(snapshot).await
    }
}

//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Which kind of record a stale reference pointed at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    Movement,
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityKind::Product => f.write_str("product"),
            EntityKind::Movement => f.write_str("movement"),
        }
    }
}

/// Ledger-level error.
///
/// `Validation`, `DuplicateSku` and `NotFound` are raised before any state
/// change. `Durability` means the mutation already happened in memory but the
/// persistence gateway did not accept it. `Parse` covers unreadable import files.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Bad input shape or range (e.g. empty name, negative quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Another product already uses this SKU.
    #[error("duplicate sku: {0}")]
    DuplicateSku(String),

    /// A referenced record does not exist (stale reference).
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// The in-memory state moved ahead of durable storage.
    #[error("mutation applied but not durable: {0}")]
    Durability(String),

    /// An import document could not be read.
    #[error("parse error: {0}")]
    Parse(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_sku(sku: impl Into<String>) -> Self {
        Self::DuplicateSku(sku.into())
    }

    pub fn not_found(entity: EntityKind, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn durability(msg: impl Into<String>) -> Self {
        Self::Durability(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

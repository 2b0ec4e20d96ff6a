//! `stockledger-core`: shared building blocks for the stock ledger.
//!
//! This crate contains **pure** primitives (identifiers, the entity trait and the
//! error taxonomy). No IO, no storage concerns.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{EntityKind, LedgerError, LedgerResult};
pub use id::{MovementId, ProductId};

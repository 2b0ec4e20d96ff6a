//! Stock ledger domain module.
//!
//! This crate keeps product quantities and the movement history mutually
//! consistent. It is implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage); durability lives in `stockledger-infra`.

pub mod confirm;
pub mod import;
pub mod ledger;
pub mod movement;
pub mod product;
pub mod query;
pub mod store;

pub use confirm::{Ack, Outcome, Risk};
pub use import::{ImportRecord, SkippedRecord, UpsertReport};
pub use ledger::{
    CreateProduct, DeleteMovement, DeleteProduct, Ledger, MovementDeleted, MovementRecorded,
    ProductCreated, ProductDeleted, ProductUpdated, RecordMovement, Reversal, UpdateProduct,
};
pub use movement::{Movement, MovementKind};
pub use product::{Product, ProductInput, StockStatus};
pub use query::{InventoryStats, MovementFilter, Period};
pub use store::{EntityStore, Snapshot};

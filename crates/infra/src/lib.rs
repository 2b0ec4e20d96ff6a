//! Infrastructure layer: persistence gateways, the durable ledger service,
//! import/export adapters, configuration and background reporting.

pub mod config;
pub mod exchange;
pub mod gateway;
pub mod reporter;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use gateway::{GatewayError, HttpGateway, InMemoryGateway, JsonFileGateway, PersistenceGateway};
pub use service::{Committed, Durability, LedgerService};

//! File exchange formats: CSV and JSON export/import.
//!
//! Parsing never touches the ledger. Callers hand the parsed result to
//! `bulk_upsert_products` (CSV) or `replace_snapshot` (JSON), so a file that
//! fails to parse is never partially applied.

pub mod csv_format;
pub mod json_format;

use thiserror::Error;

use stockledger_core::LedgerError;

pub use csv_format::{CsvImport, export_products_csv, import_products_csv};
pub use json_format::{ExportDocument, ExportStats, export_json, parse_json_import};

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is empty")]
    Empty,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("no recognised columns in header")]
    UnrecognisedHeader,
}

impl From<ExchangeError> for LedgerError {
    fn from(err: ExchangeError) -> Self {
        LedgerError::parse(err.to_string())
    }
}

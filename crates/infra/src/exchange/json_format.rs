use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_inventory::{Movement, Product, Snapshot};

use super::ExchangeError;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    pub total_products: usize,
    pub total_movements: usize,
    pub total_stock: i64,
}

/// Full backup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub data: Snapshot,
    pub stats: ExportStats,
}

impl ExportDocument {
    pub fn from_snapshot(snapshot: &Snapshot, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: exported_at,
            stats: ExportStats {
                total_products: snapshot.products.len(),
                total_movements: snapshot.movements.len(),
                total_stock: snapshot.total_stock(),
            },
            data: snapshot.clone(),
        }
    }
}

pub fn export_json(snapshot: &Snapshot, exported_at: DateTime<Utc>) -> Result<String, ExchangeError> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from_snapshot(
        snapshot,
        exported_at,
    ))?)
}

// Import is looser than export: only `data.products` is required.
#[derive(Debug, Deserialize)]
struct ImportDocument {
    data: Option<ImportData>,
}

#[derive(Debug, Deserialize)]
struct ImportData {
    products: Option<Vec<Product>>,
    #[serde(default)]
    movements: Vec<Movement>,
}

/// Parse a backup document into a snapshot. Any malformed entry rejects the whole file.
pub fn parse_json_import(text: &str) -> Result<Snapshot, ExchangeError> {
    if text.trim().is_empty() {
        return Err(ExchangeError::Empty);
    }
    let doc: ImportDocument = serde_json::from_str(text)?;
    let data = doc.data.ok_or(ExchangeError::MissingField("data"))?;
    let products = data.products.ok_or(ExchangeError::MissingField("data.products"))?;
    Ok(Snapshot::new(products, data.movements))
}

//! Partial product records fed to bulk upsert, and their default-fill policy.
//!
//! Import adapters (CSV today) produce [`ImportRecord`]s where every field may
//! be absent. The policy is:
//!
//! - `sku`: trimmed and upper-cased; absent or blank gets a generated
//!   placeholder `SKU-<millis>-<row>`.
//! - `name` / `description`: absent keeps the existing value on update; on
//!   create they default to `"Unnamed Product"` / empty.
//! - `quantity` / `min_stock`: parsed as a leading integer; unparsable text
//!   becomes 0, negatives become 0. Absent keeps the existing value on update
//!   and defaults to 0 on create.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::ProductId;

use crate::product::{MAX_QUANTITY, ProductInput, normalize_sku};

pub const PLACEHOLDER_NAME: &str = "Unnamed Product";

/// One incoming row. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub min_stock: Option<String>,
}

impl ImportRecord {
    /// A row with no usable field at all.
    pub fn is_blank(&self) -> bool {
        [
            &self.sku,
            &self.name,
            &self.description,
            &self.quantity,
            &self.min_stock,
        ]
        .iter()
        .all(|f| present(f).is_none())
    }

    pub(crate) fn resolve(&self, row: usize, at: DateTime<Utc>) -> ResolvedRecord {
        let sku = present(&self.sku)
            .map(normalize_sku)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("SKU-{}-{}", at.timestamp_millis(), row + 1));

        ResolvedRecord {
            sku,
            name: present(&self.name).map(str::to_string),
            description: present(&self.description).map(str::to_string),
            quantity: present(&self.quantity).map(parse_count),
            min_stock: present(&self.min_stock).map(parse_count),
        }
    }
}

/// Record after default-fill; `None` means "keep what is there".
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedRecord {
    pub sku: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub min_stock: Option<i64>,
}

impl ResolvedRecord {
    pub(crate) fn into_new_input(self) -> ProductInput {
        ProductInput {
            sku: self.sku,
            name: self.name.unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
            description: self.description.unwrap_or_default(),
            quantity: self.quantity.unwrap_or(0),
            min_stock: self.min_stock.unwrap_or(0),
        }
    }
}

/// A row that bulk upsert did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Zero-based position in the submitted batch.
    pub index: usize,
    pub reason: String,
}

/// Per-record result of a bulk upsert. Partial success is the normal case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertReport {
    pub created: Vec<ProductId>,
    pub updated: Vec<ProductId>,
    pub skipped: Vec<SkippedRecord>,
}

impl UpsertReport {
    pub fn applied(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Leading-integer parse (`"12"`, `"+3"`, `"7.9"` → 7, `"12abc"` → 12); anything else is 0.
///
/// Results are capped at [`MAX_QUANTITY`].
pub fn parse_count(raw: &str) -> i64 {
    let raw = raw.trim();
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => (-1, &raw[1..]),
        Some(b'+') => (1, &raw[1..]),
        _ => (1, raw),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i64>()
        .map(|n| (sign * n).clamp(0, MAX_QUANTITY))
        .unwrap_or(0)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{Entity, LedgerError, LedgerResult, ProductId};

/// Upper bound for stored quantities and movement sizes.
///
/// Keeps stock arithmetic far away from `i64` overflow.
pub const MAX_QUANTITY: i64 = 1_000_000_000_000;

/// Stock classification derived from `quantity` and `min_stock`.
///
/// Not stored; recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Normal,
}

impl StockStatus {
    pub fn classify(quantity: i64, min_stock: i64) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock {
            StockStatus::Low
        } else {
            StockStatus::Normal
        }
    }

    /// Display label used by exports.
    pub fn label(self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::Low => "Low Stock",
            StockStatus::Normal => "Normal",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked product.
///
/// Only the ledger mutates products; everything else reads them through the
/// accessors below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    #[serde(default)]
    description: String,
    quantity: i64,
    min_stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub(crate) fn create(id: ProductId, input: ProductInput, at: DateTime<Utc>) -> Self {
        Self {
            id,
            sku: input.sku,
            name: input.name,
            description: input.description,
            quantity: input.quantity,
            min_stock: input.min_stock,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn min_stock(&self) -> i64 {
        self.min_stock
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// `quantity <= min_stock`.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    /// `quantity == 0`.
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::classify(self.quantity, self.min_stock)
    }

    /// Replace every user-editable field.
    pub(crate) fn replace_fields(&mut self, input: ProductInput, at: DateTime<Utc>) {
        self.sku = input.sku;
        self.name = input.name;
        self.description = input.description;
        self.quantity = input.quantity;
        self.min_stock = input.min_stock;
        self.updated_at = at;
    }

    /// Set the stock level, clamping below-zero values to zero. Returns the stored value.
    pub(crate) fn set_quantity_clamped(&mut self, quantity: i64, at: DateTime<Utc>) -> i64 {
        self.quantity = quantity.max(0);
        self.updated_at = at;
        self.quantity
    }

    /// Overwrite the fields that are present; absent ones keep their value.
    pub(crate) fn merge(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        quantity: Option<i64>,
        min_stock: Option<i64>,
        at: DateTime<Utc>,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(quantity) = quantity {
            self.quantity = quantity.max(0);
        }
        if let Some(min_stock) = min_stock {
            self.min_stock = min_stock.max(0);
        }
        self.updated_at = at;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// User-supplied product fields, as submitted by a create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_stock: i64,
}

impl ProductInput {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, quantity: i64, min_stock: i64) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            description: String::new(),
            quantity,
            min_stock,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Trim text fields, upper-case the SKU and check ranges.
    pub fn normalized(self) -> LedgerResult<Self> {
        let sku = normalize_sku(&self.sku);
        let name = self.name.trim().to_string();

        if sku.is_empty() {
            return Err(LedgerError::validation("sku cannot be empty"));
        }
        if name.is_empty() {
            return Err(LedgerError::validation("name cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(LedgerError::validation("quantity cannot be negative"));
        }
        if self.min_stock < 0 {
            return Err(LedgerError::validation("min stock cannot be negative"));
        }
        if self.quantity > MAX_QUANTITY || self.min_stock > MAX_QUANTITY {
            return Err(LedgerError::validation("quantity out of range"));
        }

        Ok(Self {
            sku,
            name,
            description: self.description.trim().to_string(),
            quantity: self.quantity,
            min_stock: self.min_stock,
        })
    }
}

/// SKUs are compared and stored trimmed and upper-cased.
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_uppercases() {
        let input = ProductInput::new("  ab-12 ", "  Widget ", 3, 1).with_description(" blue ");
        let n = input.normalized().unwrap();
        assert_eq!(n.sku, "AB-12");
        assert_eq!(n.name, "Widget");
        assert_eq!(n.description, "blue");
    }

    #[test]
    fn normalized_rejects_blank_sku_and_name() {
        let err = ProductInput::new("   ", "Widget", 0, 0).normalized().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(msg) if msg.contains("sku")));

        let err = ProductInput::new("A1", " ", 0, 0).normalized().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(msg) if msg.contains("name")));
    }

    #[test]
    fn normalized_rejects_out_of_range_numbers() {
        assert!(ProductInput::new("A1", "W", -1, 0).normalized().is_err());
        assert!(ProductInput::new("A1", "W", 0, -1).normalized().is_err());
        assert!(ProductInput::new("A1", "W", MAX_QUANTITY, 0).normalized().is_ok());

        let err = ProductInput::new("A1", "W", i64::MAX, 0).normalized().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(msg) if msg.contains("out of range")));
    }

    #[test]
    fn status_classification() {
        assert_eq!(StockStatus::classify(0, 5), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(0, 0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(5, 5), StockStatus::Low);
        assert_eq!(StockStatus::classify(6, 5), StockStatus::Normal);
        assert_eq!(StockStatus::Low.label(), "Low Stock");
    }

    #[test]
    fn product_serializes_with_camel_case_keys() {
        let at = Utc::now();
        let p = Product::create(ProductId::new(), ProductInput::new("A1", "Widget", 10, 5), at);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["minStock"], 5);
        assert_eq!(json["sku"], "A1");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}

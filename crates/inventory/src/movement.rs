use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{Entity, MovementId, ProductId};

use crate::product::Product;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
}

impl MovementKind {
    /// Stock after applying `quantity` in this direction, before clamping.
    ///
    /// `None` when the result does not fit in an `i64`.
    pub fn apply(self, stock: i64, quantity: i64) -> Option<i64> {
        match self {
            MovementKind::In => stock.checked_add(quantity),
            MovementKind::Out => stock.checked_sub(quantity),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for MovementKind {
    type Err = stockledger_core::LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(MovementKind::In),
            "out" => Ok(MovementKind::Out),
            other => Err(stockledger_core::LedgerError::validation(format!(
                "movement type must be 'in' or 'out', got '{other}'"
            ))),
        }
    }
}

/// An audited, immutable record of one stock change.
///
/// `product_name` and `product_sku` are captured when the movement is written
/// and are not re-synced if the product changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    id: MovementId,
    product_id: ProductId,
    product_name: String,
    product_sku: String,
    #[serde(rename = "type")]
    kind: MovementKind,
    quantity: i64,
    previous_stock: i64,
    new_stock: i64,
    reason: String,
    created_at: DateTime<Utc>,
}

impl Movement {
    /// Record a change on `product`, whose quantity is already `new_stock`.
    pub(crate) fn record(
        product: &Product,
        kind: MovementKind,
        quantity: i64,
        previous_stock: i64,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::new(),
            product_id: product.id_typed().clone(),
            product_name: product.name().to_string(),
            product_sku: product.sku().to_string(),
            kind,
            quantity,
            previous_stock,
            new_stock: product.quantity(),
            reason: reason.into(),
            created_at: at,
        }
    }

    pub fn id_typed(&self) -> &MovementId {
        &self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_sku(&self) -> &str {
        &self.product_sku
    }

    pub fn kind(&self) -> MovementKind {
        self.kind
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn previous_stock(&self) -> i64 {
        self.previous_stock
    }

    pub fn new_stock(&self) -> i64 {
        self.new_stock
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True when the arithmetic result went below zero and was stored as 0.
    pub fn is_clamped(&self) -> bool {
        self.new_stock == 0
            && self
                .kind
                .apply(self.previous_stock, self.quantity)
                .is_some_and(|stock| stock < 0)
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!(" IN ".parse::<MovementKind>().unwrap(), MovementKind::In);
        assert_eq!("out".parse::<MovementKind>().unwrap(), MovementKind::Out);
        assert!("sideways".parse::<MovementKind>().is_err());
    }

    #[test]
    fn kind_applies_with_overflow_check() {
        assert_eq!(MovementKind::In.apply(10, 3), Some(13));
        assert_eq!(MovementKind::Out.apply(10, 15), Some(-5));
        assert_eq!(MovementKind::In.apply(1, i64::MAX), None);
        assert_eq!(MovementKind::Out.apply(-2, i64::MAX), None);
    }

    #[test]
    fn kind_serializes_as_wire_type() {
        assert_eq!(serde_json::to_string(&MovementKind::Out).unwrap(), "\"out\"");
    }
}

//! Read-only views over the ledger: summary statistics, alerts and movement filters.
//!
//! Nothing here mutates state, so these are safe to call from periodic refreshes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{LedgerError, ProductId};

use crate::ledger::Ledger;
use crate::movement::{Movement, MovementKind};
use crate::product::Product;

/// Summary counters shown on dashboards and in exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: usize,
    pub total_stock: i64,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub total_movements: usize,
}

/// Time window for movement history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Since midnight (UTC) of the reference day.
    Today,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
}

impl Period {
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc())
                .unwrap_or(now),
            Period::Week => now - Duration::days(7),
            Period::Month => now - Duration::days(30),
        }
    }
}

impl core::str::FromStr for Period {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(LedgerError::validation(format!(
                "period must be one of today, week, month; got '{other}'"
            ))),
        }
    }
}

/// Movement history filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<ProductId>,
    pub kind: Option<MovementKind>,
    pub period: Option<Period>,
}

impl MovementFilter {
    pub fn matches(&self, movement: &Movement, now: DateTime<Utc>) -> bool {
        self.product_id.as_ref().is_none_or(|id| movement.product_id() == id)
            && self.kind.is_none_or(|k| movement.kind() == k)
            && self
                .period
                .is_none_or(|p| movement.created_at() >= p.since(now))
    }
}

impl Ledger {
    pub fn stats(&self) -> InventoryStats {
        let products = self.products();
        InventoryStats {
            total_products: products.len(),
            total_stock: products.iter().map(Product::quantity).sum(),
            low_stock: products.iter().filter(|p| p.is_low_stock()).count(),
            out_of_stock: products.iter().filter(|p| p.is_out_of_stock()).count(),
            total_movements: self.movements().len(),
        }
    }

    /// Products at or below their minimum, most critical first.
    pub fn low_stock_alerts(&self) -> Vec<&Product> {
        let mut alerts: Vec<&Product> = self.products().iter().filter(|p| p.is_low_stock()).collect();
        alerts.sort_by(|a, b| {
            b.is_out_of_stock()
                .cmp(&a.is_out_of_stock())
                .then(a.quantity().cmp(&b.quantity()))
                .then_with(|| a.name().cmp(b.name()))
        });
        alerts
    }

    /// All products, low-stock ones first, then by name.
    pub fn stock_overview(&self) -> Vec<&Product> {
        let mut all: Vec<&Product> = self.products().iter().collect();
        all.sort_by(|a, b| {
            b.is_low_stock()
                .cmp(&a.is_low_stock())
                .then_with(|| a.name().cmp(b.name()))
        });
        all
    }

    /// The `limit` newest movements in insertion order.
    pub fn recent_movements(&self, limit: usize) -> &[Movement] {
        let movements = self.movements();
        &movements[..limit.min(movements.len())]
    }

    /// Movements matching `filter`, keeping newest-first order.
    pub fn filter_movements(&self, filter: &MovementFilter, now: DateTime<Utc>) -> Vec<&Movement> {
        self.movements()
            .iter()
            .filter(|m| filter.matches(m, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::Ack;
    use crate::ledger::{CreateProduct, RecordMovement};
    use crate::product::ProductInput;

    fn seeded() -> (Ledger, ProductId, ProductId) {
        let mut ledger = Ledger::new();
        let mut create = |sku: &str, name: &str, q: i64, min: i64| {
            ledger
                .create_product(CreateProduct {
                    input: ProductInput::new(sku, name, q, min),
                    occurred_at: Utc::now(),
                })
                .unwrap()
                .product
                .id_typed()
                .clone()
        };
        let a = create("A1", "Bolt", 10, 5);
        let b = create("B1", "Anchor", 2, 5);
        create("C1", "Cable", 0, 1);
        (ledger, a, b)
    }

    #[test]
    fn stats_count_low_and_out_of_stock() {
        let (ledger, _, _) = seeded();
        assert_eq!(
            ledger.stats(),
            InventoryStats {
                total_products: 3,
                total_stock: 12,
                low_stock: 2,
                out_of_stock: 1,
                total_movements: 2,
            }
        );
    }

    #[test]
    fn alerts_put_out_of_stock_first() {
        let (ledger, _, _) = seeded();
        let skus: Vec<&str> = ledger.low_stock_alerts().iter().map(|p| p.sku()).collect();
        assert_eq!(skus, vec!["C1", "B1"]);
    }

    #[test]
    fn overview_orders_low_stock_then_name() {
        let (ledger, _, _) = seeded();
        let names: Vec<&str> = ledger.stock_overview().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Anchor", "Cable", "Bolt"]);
    }

    #[test]
    fn filters_compose() {
        let (mut ledger, a, _) = seeded();
        ledger
            .record_movement(RecordMovement {
                product_id: a.clone(),
                kind: MovementKind::Out,
                quantity: 1,
                reason: "sale".to_string(),
                ack: Ack::Pending,
                occurred_at: Utc::now(),
            })
            .unwrap();

        let now = Utc::now();
        let only_a = MovementFilter {
            product_id: Some(a.clone()),
            ..MovementFilter::default()
        };
        assert_eq!(ledger.filter_movements(&only_a, now).len(), 2);

        let a_out_today = MovementFilter {
            product_id: Some(a),
            kind: Some(MovementKind::Out),
            period: Some(Period::Today),
        };
        let hits = ledger.filter_movements(&a_out_today, now);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].reason(), "sale");

        let later = now + Duration::days(40);
        let month = MovementFilter {
            period: Some(Period::Month),
            ..MovementFilter::default()
        };
        assert!(ledger.filter_movements(&month, later).is_empty());
    }

    #[test]
    fn recent_movements_is_bounded() {
        let (ledger, _, _) = seeded();
        assert_eq!(ledger.recent_movements(1).len(), 1);
        assert_eq!(ledger.recent_movements(50).len(), 2);
    }

    #[test]
    fn period_parses() {
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Week);
        assert!("year".parse::<Period>().is_err());
    }
}

//! Entity store: the in-memory collections of products and movements.
//!
//! No business rules live here, only storage and identity lookup. Linear scans
//! are fine at the expected scale (hundreds to low thousands of records).

use serde::{Deserialize, Serialize};

use stockledger_core::{Entity, MovementId, ProductId};

use crate::movement::Movement;
use crate::product::Product;

/// Whole-state snapshot exchanged with the persistence gateway.
///
/// `movements` is ordered newest first by insertion. That order is load-bearing
/// and is never re-derived from timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub movements: Vec<Movement>,
}

impl Snapshot {
    pub fn new(products: Vec<Product>, movements: Vec<Movement>) -> Self {
        Self { products, movements }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.movements.is_empty()
    }

    /// Sum of all product quantities.
    pub fn total_stock(&self) -> i64 {
        self.products.iter().map(Product::quantity).sum()
    }
}

/// Owner of the two collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    state: Snapshot,
}

impl EntityStore {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { state: snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    /// Replace both collections wholesale (load / JSON import).
    pub fn replace(&mut self, snapshot: Snapshot) -> Snapshot {
        core::mem::replace(&mut self.state, snapshot)
    }

    pub fn products(&self) -> &[Product] {
        &self.state.products
    }

    pub fn movements(&self) -> &[Movement] {
        &self.state.movements
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        find(&self.state.products, id)
    }

    pub fn product_mut(&mut self, id: &ProductId) -> Option<&mut Product> {
        let idx = position(&self.state.products, id)?;
        self.state.products.get_mut(idx)
    }

    /// Find by SKU (already normalized), ignoring `except` when given.
    pub fn product_by_sku(&self, sku: &str, except: Option<&ProductId>) -> Option<&Product> {
        self.state
            .products
            .iter()
            .find(|p| p.sku() == sku && Some(p.id_typed()) != except)
    }

    pub fn product_by_sku_mut(&mut self, sku: &str) -> Option<&mut Product> {
        self.state.products.iter_mut().find(|p| p.sku() == sku)
    }

    pub fn movement(&self, id: &MovementId) -> Option<&Movement> {
        find(&self.state.movements, id)
    }

    pub fn push_product(&mut self, product: Product) {
        self.state.products.push(product);
    }

    /// Insert at the head: newest first.
    pub fn push_movement(&mut self, movement: Movement) {
        self.state.movements.insert(0, movement);
    }

    pub fn remove_product(&mut self, id: &ProductId) -> Option<Product> {
        let idx = position(&self.state.products, id)?;
        Some(self.state.products.remove(idx))
    }

    /// Remove every movement referencing `product_id`; returns how many went.
    pub fn remove_movements_for(&mut self, product_id: &ProductId) -> usize {
        let before = self.state.movements.len();
        self.state.movements.retain(|m| m.product_id() != product_id);
        before - self.state.movements.len()
    }

    pub fn remove_movement(&mut self, id: &MovementId) -> Option<Movement> {
        let idx = position(&self.state.movements, id)?;
        Some(self.state.movements.remove(idx))
    }

    pub fn clear_movements(&mut self) -> usize {
        let removed = self.state.movements.len();
        self.state.movements.clear();
        removed
    }

    pub fn movements_for<'a>(&'a self, product_id: &'a ProductId) -> impl Iterator<Item = &'a Movement> + 'a {
        self.state
            .movements
            .iter()
            .filter(move |m| m.product_id() == product_id)
    }
}

fn position<E: Entity>(items: &[E], id: &E::Id) -> Option<usize> {
    items.iter().position(|e| e.id() == id)
}

fn find<'a, E: Entity>(items: &'a [E], id: &E::Id) -> Option<&'a E> {
    items.iter().find(|e| e.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_defaults_missing_collections() {
        let snap: Snapshot = serde_json::from_str(r#"{"products": []}"#).unwrap();
        assert!(snap.movements.is_empty());

        let snap: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn replace_returns_previous_state() {
        let mut store = EntityStore::default();
        let old = store.replace(Snapshot::default());
        assert!(old.is_empty());
        assert!(store.products().is_empty());
    }
}

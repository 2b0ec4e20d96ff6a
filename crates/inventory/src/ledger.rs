//! Ledger engine: every stock-changing operation funnels through here.
//!
//! Operations are synchronous against the in-memory [`EntityStore`]. Each one
//! either fails before touching state or applies completely. Durability is a
//! separate step owned by the caller (see `stockledger-infra`).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{EntityKind, LedgerError, LedgerResult, MovementId, ProductId};

use crate::confirm::{Ack, Outcome, Risk};
use crate::import::{ImportRecord, SkippedRecord, UpsertReport};
use crate::movement::{Movement, MovementKind};
use crate::product::{MAX_QUANTITY, Product, ProductInput};
use crate::store::{EntityStore, Snapshot};

pub const INITIAL_STOCK_REASON: &str = "initial stock entry";
pub const MANUAL_EDIT_REASON: &str = "manual edit";

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub input: ProductInput,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub input: ProductInput,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteProduct (cascades to the product's movements).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProduct {
    pub product_id: ProductId,
    pub ack: Ack,
}

/// Command: RecordMovement. Backs both the full movement form and the quick in/out shortcuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMovement {
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub reason: String,
    pub ack: Ack,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteMovement (reverses its stock effect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMovement {
    pub movement_id: MovementId,
    pub ack: Ack,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub product: Product,
    /// Present when the product starts with stock.
    pub movement: Option<Movement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdated {
    pub product: Product,
    /// Present when the edit changed the quantity.
    pub movement: Option<Movement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeleted {
    pub product: Product,
    pub movements_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecorded {
    pub movement: Movement,
    /// The product is at or below its minimum after this movement.
    pub low_stock: bool,
}

/// Stock correction applied while deleting a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reversal {
    pub product_id: ProductId,
    pub previous_stock: i64,
    pub new_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDeleted {
    pub movement: Movement,
    /// `None` when the product no longer exists (history-only cleanup).
    pub reversal: Option<Reversal>,
}

/// The single owner of product and movement state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    store: EntityStore,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a persisted snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            store: EntityStore::from_snapshot(snapshot),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn products(&self) -> &[Product] {
        self.store.products()
    }

    /// Newest first.
    pub fn movements(&self) -> &[Movement] {
        self.store.movements()
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.store.product(id)
    }

    pub fn movement(&self, id: &MovementId) -> Option<&Movement> {
        self.store.movement(id)
    }

    pub fn create_product(&mut self, cmd: CreateProduct) -> LedgerResult<ProductCreated> {
        let input = cmd.input.normalized()?;
        if self.store.product_by_sku(&input.sku, None).is_some() {
            return Err(LedgerError::duplicate_sku(input.sku));
        }

        let product = Product::create(ProductId::new(), input, cmd.occurred_at);
        let movement = (product.quantity() > 0).then(|| {
            Movement::record(
                &product,
                MovementKind::In,
                product.quantity(),
                0,
                INITIAL_STOCK_REASON,
                cmd.occurred_at,
            )
        });

        self.store.push_product(product.clone());
        if let Some(m) = &movement {
            self.store.push_movement(m.clone());
        }

        Ok(ProductCreated { product, movement })
    }

    pub fn update_product(&mut self, cmd: UpdateProduct) -> LedgerResult<ProductUpdated> {
        let input = cmd.input.normalized()?;
        let id = &cmd.product_id;

        let previous_stock = self
            .store
            .product(id)
            .map(Product::quantity)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Product, id))?;
        if self.store.product_by_sku(&input.sku, Some(id)).is_some() {
            return Err(LedgerError::duplicate_sku(input.sku));
        }

        let delta = input.quantity.checked_sub(previous_stock).ok_or_else(out_of_range)?;
        let product = {
            let Some(product) = self.store.product_mut(id) else {
                return Err(LedgerError::not_found(EntityKind::Product, id));
            };
            product.replace_fields(input, cmd.occurred_at);
            product.clone()
        };

        let movement = (delta != 0).then(|| {
            let kind = if delta > 0 { MovementKind::In } else { MovementKind::Out };
            Movement::record(
                &product,
                kind,
                delta.abs(),
                previous_stock,
                MANUAL_EDIT_REASON,
                cmd.occurred_at,
            )
        });
        if let Some(m) = &movement {
            self.store.push_movement(m.clone());
        }

        Ok(ProductUpdated { product, movement })
    }

    pub fn delete_product(&mut self, cmd: DeleteProduct) -> LedgerResult<Outcome<ProductDeleted>> {
        let id = &cmd.product_id;
        let Some(product) = self.store.product(id) else {
            return Err(LedgerError::not_found(EntityKind::Product, id));
        };

        if !cmd.ack.is_confirmed() {
            return Ok(Outcome::NeedsConfirmation(Risk::DeleteProduct {
                product_id: id.clone(),
                name: product.name().to_string(),
                movements: self.store.movements_for(id).count(),
            }));
        }

        let Some(product) = self.store.remove_product(id) else {
            return Err(LedgerError::not_found(EntityKind::Product, id));
        };
        let movements_removed = self.store.remove_movements_for(id);

        Ok(Outcome::Applied(ProductDeleted {
            product,
            movements_removed,
        }))
    }

    pub fn record_movement(&mut self, cmd: RecordMovement) -> LedgerResult<Outcome<MovementRecorded>> {
        let id = &cmd.product_id;
        let Some(product) = self.store.product(id) else {
            return Err(LedgerError::not_found(EntityKind::Product, id));
        };

        if cmd.quantity <= 0 {
            return Err(LedgerError::validation("quantity must be greater than zero"));
        }
        let reason = cmd.reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::validation("reason cannot be empty"));
        }

        let previous_stock = product.quantity();
        let raw_stock = cmd
            .kind
            .apply(previous_stock, cmd.quantity)
            .filter(|_| cmd.quantity <= MAX_QUANTITY)
            .filter(|stock| *stock <= MAX_QUANTITY)
            .ok_or_else(out_of_range)?;

        if raw_stock < 0 && !cmd.ack.is_confirmed() {
            return Ok(Outcome::NeedsConfirmation(Risk::Overdraft {
                product_id: id.clone(),
                sku: product.sku().to_string(),
                available: previous_stock,
                requested: cmd.quantity,
                shortfall: -raw_stock,
            }));
        }

        let Some(product) = self.store.product_mut(id) else {
            return Err(LedgerError::not_found(EntityKind::Product, id));
        };
        product.set_quantity_clamped(raw_stock, cmd.occurred_at);
        let low_stock = product.is_low_stock();
        let movement = Movement::record(
            product,
            cmd.kind,
            cmd.quantity,
            previous_stock,
            reason,
            cmd.occurred_at,
        );
        self.store.push_movement(movement.clone());

        Ok(Outcome::Applied(MovementRecorded { movement, low_stock }))
    }

    /// Delete a movement and undo its effective stock change.
    ///
    /// The correction is `previous_stock - new_stock` of the deleted record, so a
    /// clamped out-movement gives back only what it actually removed. The
    /// correction lands on the current quantity, so later movements stay in effect.
    pub fn delete_movement(&mut self, cmd: DeleteMovement) -> LedgerResult<Outcome<MovementDeleted>> {
        let id = &cmd.movement_id;
        let Some(movement) = self.store.movement(id) else {
            return Err(LedgerError::not_found(EntityKind::Movement, id));
        };

        if !cmd.ack.is_confirmed() {
            return Ok(Outcome::NeedsConfirmation(Risk::DeleteMovement {
                movement_id: id.clone(),
                product_name: movement.product_name().to_string(),
                movement_kind: movement.kind(),
                quantity: movement.quantity(),
                clamped: movement.is_clamped(),
            }));
        }

        let product_id = movement.product_id().clone();
        let target = match self.store.product(&product_id) {
            Some(product) => Some(
                movement
                    .previous_stock()
                    .checked_sub(movement.new_stock())
                    .and_then(|correction| product.quantity().checked_add(correction))
                    .filter(|stock| *stock <= MAX_QUANTITY)
                    .ok_or_else(out_of_range)?,
            ),
            None => None,
        };

        let Some(movement) = self.store.remove_movement(id) else {
            return Err(LedgerError::not_found(EntityKind::Movement, id));
        };
        let reversal = match (target, self.store.product_mut(&product_id)) {
            (Some(target), Some(product)) => {
                let previous_stock = product.quantity();
                let new_stock = product.set_quantity_clamped(target, cmd.occurred_at);
                Some(Reversal {
                    product_id,
                    previous_stock,
                    new_stock,
                })
            }
            _ => None,
        };

        Ok(Outcome::Applied(MovementDeleted { movement, reversal }))
    }

    /// Wipe the movement history. Product quantities are left untouched.
    pub fn clear_movement_history(&mut self, ack: Ack) -> Outcome<usize> {
        let count = self.store.movements().len();
        if count == 0 {
            return Outcome::Applied(0);
        }
        if !ack.is_confirmed() {
            return Outcome::NeedsConfirmation(Risk::ClearHistory { movements: count });
        }
        Outcome::Applied(self.store.clear_movements())
    }

    /// Merge imported records by SKU. Never emits movements.
    ///
    /// Each record is handled on its own: a matching SKU updates that product in
    /// place (quantity replaced, id and creation time kept), otherwise a new
    /// product is created. Blank rows are skipped and reported.
    pub fn bulk_upsert_products(&mut self, records: &[ImportRecord], occurred_at: DateTime<Utc>) -> UpsertReport {
        let mut report = UpsertReport::default();

        for (index, record) in records.iter().enumerate() {
            if record.is_blank() {
                report.skipped.push(SkippedRecord {
                    index,
                    reason: "record has no fields".to_string(),
                });
                continue;
            }

            let resolved = record.resolve(index, occurred_at);
            match self.store.product_by_sku_mut(&resolved.sku) {
                Some(existing) => {
                    existing.merge(
                        resolved.name,
                        resolved.description,
                        resolved.quantity,
                        resolved.min_stock,
                        occurred_at,
                    );
                    report.updated.push(existing.id_typed().clone());
                }
                None => {
                    let product = Product::create(ProductId::new(), resolved.into_new_input(), occurred_at);
                    report.created.push(product.id_typed().clone());
                    self.store.push_product(product);
                }
            }
        }

        report
    }

    /// Replace all state with an imported snapshot.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot, ack: Ack) -> LedgerResult<Outcome<Snapshot>> {
        validate_snapshot(&snapshot)?;

        if !ack.is_confirmed() {
            return Ok(Outcome::NeedsConfirmation(Risk::ReplaceSnapshot {
                products: snapshot.products.len(),
                movements: snapshot.movements.len(),
            }));
        }

        Ok(Outcome::Applied(self.store.replace(snapshot)))
    }
}

fn out_of_range() -> LedgerError {
    LedgerError::validation("quantity out of range")
}

fn in_range(value: i64) -> bool {
    (0..=MAX_QUANTITY).contains(&value)
}

/// Reject snapshots that break at-rest invariants.
fn validate_snapshot(snapshot: &Snapshot) -> LedgerResult<()> {
    let mut product_ids = HashSet::new();
    for p in &snapshot.products {
        if !product_ids.insert(p.id_typed()) {
            return Err(LedgerError::validation(format!("duplicate product id {}", p.id_typed())));
        }
        if !in_range(p.quantity()) || !in_range(p.min_stock()) {
            return Err(LedgerError::validation(format!(
                "product {} has a quantity or min stock out of range",
                p.sku()
            )));
        }
    }

    let mut movement_ids = HashSet::new();
    for m in &snapshot.movements {
        if !movement_ids.insert(m.id_typed()) {
            return Err(LedgerError::validation(format!("duplicate movement id {}", m.id_typed())));
        }
        if m.quantity() <= 0 || m.quantity() > MAX_QUANTITY {
            return Err(LedgerError::validation(format!(
                "movement {} must have a quantity between 1 and {MAX_QUANTITY}",
                m.id_typed()
            )));
        }
        if !in_range(m.previous_stock()) || !in_range(m.new_stock()) {
            return Err(LedgerError::validation(format!(
                "movement {} has a stock level out of range",
                m.id_typed()
            )));
        }
    }
    Ok(())
}

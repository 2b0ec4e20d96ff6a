//! Durable ledger service: applies a command, then persists the whole snapshot.
//!
//! The ledger sits behind an async mutex so there is a single writer. The save
//! happens while the lock is still held, which keeps saves in mutation order.
//! A failed save does not undo the in-memory change; the caller gets the value
//! back tagged [`Durability::NotDurable`] and may call [`LedgerService::retry_save`].

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use stockledger_core::{LedgerError, LedgerResult, MovementId, ProductId};
use stockledger_inventory::{
    Ack, CreateProduct, DeleteMovement, DeleteProduct, ImportRecord, Ledger, Movement, MovementDeleted,
    MovementKind, MovementRecorded, Outcome, Product, ProductCreated, ProductDeleted, ProductInput,
    ProductUpdated, RecordMovement, Snapshot, UpdateProduct, UpsertReport,
};

use crate::gateway::{GatewayError, PersistenceGateway};

/// Whether an applied change reached the persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Durability {
    Durable,
    NotDurable(String),
}

impl Durability {
    fn from_save(result: Result<(), GatewayError>) -> Self {
        match result {
            Ok(()) => Durability::Durable,
            Err(e) => Durability::NotDurable(e.to_string()),
        }
    }
}

/// An applied change plus its durability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub value: T,
    pub durability: Durability,
}

impl<T> Committed<T> {
    pub fn is_durable(&self) -> bool {
        self.durability == Durability::Durable
    }

    /// Save failure reason, if any.
    pub fn warning(&self) -> Option<&str> {
        match &self.durability {
            Durability::Durable => None,
            Durability::NotDurable(reason) => Some(reason),
        }
    }

    /// Treat "applied but not saved" as an error.
    pub fn into_durable(self) -> LedgerResult<T> {
        match self.durability {
            Durability::Durable => Ok(self.value),
            Durability::NotDurable(reason) => Err(LedgerError::durability(reason)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        Committed {
            value: f(self.value),
            durability: self.durability,
        }
    }
}

pub struct LedgerService<G> {
    ledger: Mutex<Ledger>,
    gateway: G,
}

impl<G> LedgerService<G>
where
    G: PersistenceGateway,
{
    pub fn new(gateway: G, ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            gateway,
        }
    }

    /// Rehydrate from whatever the gateway currently holds.
    pub async fn bootstrap(gateway: G) -> Result<Self, GatewayError> {
        let snapshot = gateway.load().await?;
        info!(
            products = snapshot.products.len(),
            movements = snapshot.movements.len(),
            "ledger rehydrated"
        );
        Ok(Self::new(gateway, Ledger::from_snapshot(snapshot)))
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run a read-only closure against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        let ledger = self.ledger.lock().await;
        f(&*ledger)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.read(|l| l.snapshot().clone()).await
    }

    /// Re-send the current snapshot, e.g. after a `NotDurable` result.
    pub async fn retry_save(&self) -> Durability {
        let ledger = self.ledger.lock().await;
        self.persist("retry_save", ledger.snapshot()).await
    }

    pub async fn create_product(&self, input: ProductInput) -> LedgerResult<Committed<ProductCreated>> {
        self.apply("create_product", |ledger| {
            ledger.create_product(CreateProduct {
                input,
                occurred_at: Utc::now(),
            })
        })
        .await
    }

    pub async fn update_product(
        &self,
        product_id: ProductId,
        input: ProductInput,
    ) -> LedgerResult<Committed<ProductUpdated>> {
        self.apply("update_product", |ledger| {
            ledger.update_product(UpdateProduct {
                product_id,
                input,
                occurred_at: Utc::now(),
            })
        })
        .await
    }

    pub async fn delete_product(
        &self,
        product_id: ProductId,
        ack: Ack,
    ) -> LedgerResult<Outcome<Committed<ProductDeleted>>> {
        self.apply_guarded("delete_product", |ledger| {
            ledger.delete_product(DeleteProduct { product_id, ack })
        })
        .await
    }

    pub async fn record_movement(
        &self,
        product_id: ProductId,
        kind: MovementKind,
        quantity: i64,
        reason: String,
        ack: Ack,
    ) -> LedgerResult<Outcome<Committed<MovementRecorded>>> {
        self.apply_guarded("record_movement", |ledger| {
            ledger.record_movement(RecordMovement {
                product_id,
                kind,
                quantity,
                reason,
                ack,
                occurred_at: Utc::now(),
            })
        })
        .await
    }

    pub async fn delete_movement(
        &self,
        movement_id: MovementId,
        ack: Ack,
    ) -> LedgerResult<Outcome<Committed<MovementDeleted>>> {
        self.apply_guarded("delete_movement", |ledger| {
            ledger.delete_movement(DeleteMovement {
                movement_id,
                ack,
                occurred_at: Utc::now(),
            })
        })
        .await
    }

    pub async fn clear_movement_history(&self, ack: Ack) -> LedgerResult<Outcome<Committed<usize>>> {
        self.apply_guarded("clear_movement_history", |ledger| {
            Ok(ledger.clear_movement_history(ack))
        })
        .await
    }

    pub async fn bulk_upsert_products(&self, records: &[ImportRecord]) -> LedgerResult<Committed<UpsertReport>> {
        self.apply("bulk_upsert_products", |ledger| {
            Ok(ledger.bulk_upsert_products(records, Utc::now()))
        })
        .await
    }

    /// Replace everything after confirmation. Returns the previous state.
    pub async fn replace_snapshot(&self, snapshot: Snapshot, ack: Ack) -> LedgerResult<Outcome<Committed<Snapshot>>> {
        self.apply_guarded("replace_snapshot", |ledger| ledger.replace_snapshot(snapshot, ack))
            .await
    }

    /// Replace the collections that are present and keep the others.
    ///
    /// Backs the raw persistence endpoints, which have no confirmation step.
    pub async fn replace_collections(
        &self,
        products: Option<Vec<Product>>,
        movements: Option<Vec<Movement>>,
    ) -> LedgerResult<Committed<Snapshot>> {
        self.apply("replace_collections", |ledger| {
            let current = ledger.snapshot();
            let next = Snapshot::new(
                products.unwrap_or_else(|| current.products.clone()),
                movements.unwrap_or_else(|| current.movements.clone()),
            );
            match ledger.replace_snapshot(next, Ack::Confirmed)? {
                Outcome::Applied(previous) => Ok(previous),
                Outcome::NeedsConfirmation(risk) => Err(LedgerError::validation(risk.to_string())),
            }
        })
        .await
    }

    async fn apply<T, F>(&self, op: &'static str, f: F) -> LedgerResult<Committed<T>>
    where
        F: FnOnce(&mut Ledger) -> LedgerResult<T>,
    {
        let mut ledger = self.ledger.lock().await;
        let value = f(&mut *ledger).inspect_err(|e| debug!(op, error = %e, "command rejected"))?;
        let durability = self.persist(op, ledger.snapshot()).await;
        Ok(Committed { value, durability })
    }

    async fn apply_guarded<T, F>(&self, op: &'static str, f: F) -> LedgerResult<Outcome<Committed<T>>>
    where
        F: FnOnce(&mut Ledger) -> LedgerResult<Outcome<T>>,
    {
        let mut ledger = self.ledger.lock().await;
        match f(&mut *ledger).inspect_err(|e| debug!(op, error = %e, "command rejected"))? {
            Outcome::NeedsConfirmation(risk) => {
                debug!(op, %risk, "confirmation required");
                Ok(Outcome::NeedsConfirmation(risk))
            }
            Outcome::Applied(value) => {
                let durability = self.persist(op, ledger.snapshot()).await;
                Ok(Outcome::Applied(Committed { value, durability }))
            }
        }
    }

    async fn persist(&self, op: &'static str, snapshot: &Snapshot) -> Durability {
        let durability = Durability::from_save(self.gateway.save(snapshot).await);
        match &durability {
            Durability::Durable => debug!(op, "snapshot persisted"),
            Durability::NotDurable(reason) => warn!(op, %reason, "change applied but not persisted"),
        }
        durability
    }
}

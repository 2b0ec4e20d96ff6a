//! Two-phase confirmation for destructive or over-draft operations.
//!
//! A guarded operation called with [`Ack::Pending`] inspects the request and,
//! if it carries a risk, returns [`Outcome::NeedsConfirmation`] without touching
//! state. Calling again with [`Ack::Confirmed`] performs the mutation.

use serde::{Deserialize, Serialize};

use stockledger_core::{MovementId, ProductId};

use crate::movement::MovementKind;

/// Caller acknowledgement of a risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ack {
    #[default]
    Pending,
    Confirmed,
}

impl Ack {
    pub fn is_confirmed(self) -> bool {
        self == Ack::Confirmed
    }
}

impl From<bool> for Ack {
    fn from(confirmed: bool) -> Self {
        if confirmed { Ack::Confirmed } else { Ack::Pending }
    }
}

/// What the caller must acknowledge before the operation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Risk {
    /// An outgoing movement larger than the stock on hand; stored stock will clamp to 0.
    Overdraft {
        product_id: ProductId,
        sku: String,
        available: i64,
        requested: i64,
        shortfall: i64,
    },
    /// Product deletion cascades to its movement history.
    DeleteProduct {
        product_id: ProductId,
        name: String,
        movements: usize,
    },
    /// Deleting a movement reverses its stock effect and drops the audit record.
    DeleteMovement {
        movement_id: MovementId,
        product_name: String,
        movement_kind: MovementKind,
        quantity: i64,
        /// The movement was clamped at zero; only the effective change is undone.
        clamped: bool,
    },
    /// Wipes the whole movement history; quantities stay as they are.
    ClearHistory { movements: usize },
    /// Replaces every product and movement with an imported document.
    ReplaceSnapshot { products: usize, movements: usize },
}

impl core::fmt::Display for Risk {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Risk::Overdraft { sku, available, requested, shortfall, .. } => write!(
                f,
                "only {available} of {sku} in stock, {requested} requested: stock would go {shortfall} below zero"
            ),
            Risk::DeleteProduct { name, movements, .. } => write!(
                f,
                "deleting \"{name}\" also deletes {movements} movement record(s)"
            ),
            Risk::DeleteMovement { product_name, movement_kind, quantity, clamped, .. } => {
                write!(
                    f,
                    "deleting the {movement_kind} movement of {quantity} for \"{product_name}\" adjusts its stock"
                )?;
                if *clamped {
                    f.write_str(" (it was clamped at zero, so only the stock it actually removed comes back)")?;
                }
                Ok(())
            }
            Risk::ClearHistory { movements } => write!(
                f,
                "{movements} movement record(s) will be removed without any stock correction"
            ),
            Risk::ReplaceSnapshot { products, movements } => write!(
                f,
                "current data will be replaced by {products} product(s) and {movements} movement(s)"
            ),
        }
    }
}

/// Result of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    NeedsConfirmation(Risk),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            Outcome::NeedsConfirmation(_) => None,
        }
    }

    pub fn risk(&self) -> Option<&Risk> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::NeedsConfirmation(r) => Some(r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(v) => Outcome::Applied(f(v)),
            Outcome::NeedsConfirmation(r) => Outcome::NeedsConfirmation(r),
        }
    }
}

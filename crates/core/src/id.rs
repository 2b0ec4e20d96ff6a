//! Strongly-typed identifiers used across the ledger.
//!
//! Ids are opaque strings. New ones are UUIDv7 text, but any non-empty value
//! loaded from storage is accepted as-is, so data written by earlier clients
//! (base-36 timestamp ids and the like) keeps working.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

/// Identifier of a product. Opaque and immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

/// Identifier of a stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MovementId(String);

macro_rules! impl_string_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 text (time-ordered). Prefer passing IDs explicitly in
            /// tests for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = LedgerError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(LedgerError::validation(format!("invalid {}: empty", $name)));
                }
                if trimmed.len() == value.len() {
                    Ok(Self(value))
                } else {
                    Ok(Self(trimmed.to_string()))
                }
            }
        }

        impl FromStr for $t {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_from(s.to_string())
            }
        }
    };
}

impl_string_id!(ProductId, "ProductId");
impl_string_id!(MovementId, "MovementId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_their_display_form() {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn legacy_ids_are_accepted_verbatim() {
        let id: ProductId = " lq3k9x2abc123def ".parse().unwrap();
        assert_eq!(id.as_str(), "lq3k9x2abc123def");
    }

    #[test]
    fn empty_id_is_a_validation_error() {
        let err = "   ".parse::<MovementId>().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(msg) if msg.contains("MovementId")));
    }
}

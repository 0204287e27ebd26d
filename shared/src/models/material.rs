//! Raw material models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units::Unit;

/// A stocked ingredient.
///
/// `stock_quantity` is expressed in `unit` and is mutated only through the
/// stock ledger; it never goes negative after a committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterial {
    pub id: Uuid,
    pub name: String,
    pub unit: Unit,
    pub stock_quantity: Decimal,
    /// Low-stock threshold, in `unit`
    pub minimum_quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RawMaterial {
    /// Whether current stock has fallen to or below the configured minimum
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.minimum_quantity
    }
}

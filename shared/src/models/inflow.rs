//! Raw-material replenishment models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A replenishment event increasing raw-material stock.
///
/// Costs are informational per-inflow data; they are never blended into a
/// running average on the material itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientInflow {
    pub id: Uuid,
    pub material_id: Uuid,
    pub material_name: String,
    /// Quantity received, in the material's stock unit
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub supplier: String,
    pub user_id: Uuid,
    pub received_at: DateTime<Utc>,
}

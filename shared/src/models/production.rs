//! Production run models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed production event.
///
/// Created only after the full ingredient deduction succeeded; immutable
/// afterwards. Corrections happen through compensating records, not edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRun {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub quantity: i32,
    pub user_id: Uuid,
    pub produced_at: DateTime<Utc>,
}

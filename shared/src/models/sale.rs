//! Sale models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a sale. Voiding is terminal and keeps the lines for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Active,
    Voided,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Active => "active",
            SaleStatus::Voided => "voided",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SaleStatus::Active),
            "voided" => Some(SaleStatus::Voided),
            _ => None,
        }
    }
}

/// A sale of finished goods.
///
/// `total` always equals the sum of its line subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub total: Decimal,
    pub status: SaleStatus,
    pub user_id: Uuid,
    pub sold_at: DateTime<Utc>,
    pub voided_reason: Option<String>,
    pub voided_by: Option<Uuid>,
    pub voided_at: Option<DateTime<Utc>>,
}

/// One recipe/quantity/price entry within a sale.
///
/// `unit_price` is frozen from the recipe at sale time; later price changes
/// do not affect recorded sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Deficiency report entry for a sale request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleShortfall {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub requested: i32,
    pub available: i64,
}

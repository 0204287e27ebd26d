//! Ingredient inflow service for raw-material replenishments.
//!
//! Recording an inflow increases the material's stock through the ledger.
//! Editing one first reverses the stock effect of the stored quantities and
//! then applies the new ones, so the net effect is the difference and never
//! a naive re-add. Deleting reverses the effect, flooring at zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::{derive_inflow_costs, IngredientInflow};

use crate::error::{AppError, AppResult};

use super::material::MaterialService;

/// Inflow service for managing raw-material replenishments
#[derive(Clone)]
pub struct InflowService {
    db: PgPool,
}

/// Database row for an inflow with its material name
#[derive(Debug, sqlx::FromRow)]
struct InflowRow {
    id: Uuid,
    material_id: Uuid,
    material_name: String,
    quantity: Decimal,
    unit_cost: Decimal,
    total_cost: Decimal,
    supplier: String,
    user_id: Uuid,
    received_at: DateTime<Utc>,
}

impl From<InflowRow> for IngredientInflow {
    fn from(row: InflowRow) -> Self {
        IngredientInflow {
            id: row.id,
            material_id: row.material_id,
            material_name: row.material_name,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            total_cost: row.total_cost,
            supplier: row.supplier,
            user_id: row.user_id,
            received_at: row.received_at,
        }
    }
}

/// Input for recording an inflow. One of `unit_cost` or `total_cost` is
/// required; the other is derived.
#[derive(Debug, Deserialize)]
pub struct RecordInflowInput {
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub supplier: String,
    pub received_at: Option<DateTime<Utc>>,
}

/// Input for editing an inflow
#[derive(Debug, Deserialize)]
pub struct EditInflowInput {
    pub quantity: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub supplier: Option<String>,
}

impl InflowService {
    /// Create a new InflowService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record an inflow and apply its stock effect
    pub async fn record_inflow(
        &self,
        user_id: Uuid,
        input: RecordInflowInput,
    ) -> AppResult<IngredientInflow> {
        if input.supplier.trim().is_empty() {
            return Err(AppError::Validation {
                field: "supplier".to_string(),
                message: "Supplier is required".to_string(),
                message_es: "El proveedor es obligatorio".to_string(),
            });
        }

        let (unit_cost, total_cost) =
            derive_inflow_costs(input.quantity, input.unit_cost, input.total_cost).map_err(
                |msg| AppError::Validation {
                    field: "unit_cost".to_string(),
                    message: msg.to_string(),
                    message_es: "Costo o cantidad inválidos".to_string(),
                },
            )?;

        let material_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM raw_materials WHERE id = $1)",
        )
        .bind(input.material_id)
        .fetch_one(&self.db)
        .await?;

        if !material_exists {
            return Err(AppError::NotFound("Raw material".to_string()));
        }

        let received_at = input.received_at.unwrap_or_else(Utc::now);
        let materials = MaterialService::new(self.db.clone());

        let mut tx = self.db.begin().await?;

        let inflow_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO ingredient_inflows
                (material_id, quantity, unit_cost, total_cost, supplier, user_id, received_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.material_id)
        .bind(input.quantity)
        .bind(unit_cost)
        .bind(total_cost)
        .bind(input.supplier.trim())
        .bind(user_id)
        .bind(received_at)
        .fetch_one(&mut *tx)
        .await?;

        materials
            .apply_inflow(&mut tx, input.material_id, input.quantity)
            .await?;

        tx.commit().await?;

        self.get_inflow(inflow_id).await
    }

    /// Edit an inflow, reversing its prior stock effect before applying the
    /// new quantities
    pub async fn edit_inflow(
        &self,
        inflow_id: Uuid,
        input: EditInflowInput,
    ) -> AppResult<IngredientInflow> {
        let existing = self.get_inflow(inflow_id).await?;

        let quantity = input.quantity.unwrap_or(existing.quantity);
        let supplier = input.supplier.unwrap_or(existing.supplier);

        if supplier.trim().is_empty() {
            return Err(AppError::Validation {
                field: "supplier".to_string(),
                message: "Supplier is required".to_string(),
                message_es: "El proveedor es obligatorio".to_string(),
            });
        }

        // Keep the stored unit cost when the caller does not reprice
        let unit_cost_input = match (input.unit_cost, input.total_cost) {
            (None, None) => Some(existing.unit_cost),
            (unit, _) => unit,
        };

        let (unit_cost, total_cost) = derive_inflow_costs(quantity, unit_cost_input, input.total_cost)
            .map_err(|msg| AppError::Validation {
                field: "unit_cost".to_string(),
                message: msg.to_string(),
                message_es: "Costo o cantidad inválidos".to_string(),
            })?;

        let materials = MaterialService::new(self.db.clone());

        let mut tx = self.db.begin().await?;

        materials
            .reverse_inflow(&mut tx, existing.material_id, existing.quantity)
            .await?;

        sqlx::query(
            r#"
            UPDATE ingredient_inflows
            SET quantity = $1, unit_cost = $2, total_cost = $3, supplier = $4
            WHERE id = $5
            "#,
        )
        .bind(quantity)
        .bind(unit_cost)
        .bind(total_cost)
        .bind(supplier.trim())
        .bind(inflow_id)
        .execute(&mut *tx)
        .await?;

        materials
            .apply_inflow(&mut tx, existing.material_id, quantity)
            .await?;

        tx.commit().await?;

        self.get_inflow(inflow_id).await
    }

    /// Delete an inflow, reversing its stock effect (floors at zero)
    pub async fn delete_inflow(&self, inflow_id: Uuid) -> AppResult<()> {
        let existing = self.get_inflow(inflow_id).await?;

        let materials = MaterialService::new(self.db.clone());

        let mut tx = self.db.begin().await?;

        materials
            .reverse_inflow(&mut tx, existing.material_id, existing.quantity)
            .await?;

        sqlx::query("DELETE FROM ingredient_inflows WHERE id = $1")
            .bind(inflow_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get an inflow by ID
    pub async fn get_inflow(&self, inflow_id: Uuid) -> AppResult<IngredientInflow> {
        let row = sqlx::query_as::<_, InflowRow>(
            r#"
            SELECT i.id, i.material_id, m.name AS material_name, i.quantity,
                   i.unit_cost, i.total_cost, i.supplier, i.user_id, i.received_at
            FROM ingredient_inflows i
            JOIN raw_materials m ON m.id = i.material_id
            WHERE i.id = $1
            "#,
        )
        .bind(inflow_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inflow".to_string()))?;

        Ok(row.into())
    }

    /// List all inflows, newest first
    pub async fn list_inflows(&self) -> AppResult<Vec<IngredientInflow>> {
        let rows = sqlx::query_as::<_, InflowRow>(
            r#"
            SELECT i.id, i.material_id, m.name AS material_name, i.quantity,
                   i.unit_cost, i.total_cost, i.supplier, i.user_id, i.received_at
            FROM ingredient_inflows i
            JOIN raw_materials m ON m.id = i.material_id
            ORDER BY i.received_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(IngredientInflow::from).collect())
    }

    /// List inflows for one material, newest first
    pub async fn list_inflows_by_material(
        &self,
        material_id: Uuid,
    ) -> AppResult<Vec<IngredientInflow>> {
        let material_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM raw_materials WHERE id = $1)",
        )
        .bind(material_id)
        .fetch_one(&self.db)
        .await?;

        if !material_exists {
            return Err(AppError::NotFound("Raw material".to_string()));
        }

        let rows = sqlx::query_as::<_, InflowRow>(
            r#"
            SELECT i.id, i.material_id, m.name AS material_name, i.quantity,
                   i.unit_cost, i.total_cost, i.supplier, i.user_id, i.received_at
            FROM ingredient_inflows i
            JOIN raw_materials m ON m.id = i.material_id
            WHERE i.material_id = $1
            ORDER BY i.received_at DESC
            "#,
        )
        .bind(material_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(IngredientInflow::from).collect())
    }
}

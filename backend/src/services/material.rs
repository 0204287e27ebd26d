//! Raw material service and stock ledger
//!
//! This service is the only writer of `raw_materials.stock_quantity`. Every
//! stock mutation goes through the ledger methods below, inside the caller's
//! transaction, and refreshes the material's `updated_at`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::{validate_positive_quantity, RawMaterial, Unit};

use crate::error::{AppError, AppResult};

/// Material service owning raw-material records and their stock ledger
#[derive(Clone)]
pub struct MaterialService {
    db: PgPool,
}

/// Database row for a raw material
#[derive(Debug, sqlx::FromRow)]
struct MaterialRow {
    id: Uuid,
    name: String,
    unit: String,
    stock_quantity: Decimal,
    minimum_quantity: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parse a unit code persisted in the database into the closed enumeration
pub(crate) fn parse_unit(code: &str) -> AppResult<Unit> {
    Unit::from_str(code)
        .ok_or_else(|| AppError::Internal(format!("Unknown unit in database: {}", code)))
}

fn material_from_row(row: MaterialRow) -> AppResult<RawMaterial> {
    Ok(RawMaterial {
        id: row.id,
        name: row.name,
        unit: parse_unit(&row.unit)?,
        stock_quantity: row.stock_quantity,
        minimum_quantity: row.minimum_quantity,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Input for creating a raw material
#[derive(Debug, Deserialize)]
pub struct CreateMaterialInput {
    pub name: String,
    pub unit: Unit,
    pub stock_quantity: Option<Decimal>,
    pub minimum_quantity: Decimal,
}

/// Input for updating a raw material.
///
/// Stock and unit are intentionally absent: stock changes only through the
/// ledger, and the unit is fixed once stock has been recorded against it.
#[derive(Debug, Deserialize)]
pub struct UpdateMaterialInput {
    pub name: Option<String>,
    pub minimum_quantity: Option<Decimal>,
}

impl MaterialService {
    /// Create a new MaterialService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all raw materials
    pub async fn list_materials(&self) -> AppResult<Vec<RawMaterial>> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, unit, stock_quantity, minimum_quantity, created_at, updated_at
            FROM raw_materials
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(material_from_row).collect()
    }

    /// Get a raw material by ID
    pub async fn get_material(&self, material_id: Uuid) -> AppResult<RawMaterial> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, unit, stock_quantity, minimum_quantity, created_at, updated_at
            FROM raw_materials
            WHERE id = $1
            "#,
        )
        .bind(material_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

        material_from_row(row)
    }

    /// List materials whose stock has fallen to or below their minimum
    pub async fn list_low_stock(&self) -> AppResult<Vec<RawMaterial>> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, unit, stock_quantity, minimum_quantity, created_at, updated_at
            FROM raw_materials
            WHERE stock_quantity <= minimum_quantity
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(material_from_row).collect()
    }

    /// Create a raw material
    pub async fn create_material(&self, input: CreateMaterialInput) -> AppResult<RawMaterial> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_es: "El nombre es obligatorio".to_string(),
            });
        }

        let stock_quantity = input.stock_quantity.unwrap_or(Decimal::ZERO);
        if stock_quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "stock_quantity".to_string(),
                message: "Initial stock cannot be negative".to_string(),
                message_es: "El stock inicial no puede ser negativo".to_string(),
            });
        }

        if input.minimum_quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "minimum_quantity".to_string(),
                message: "Minimum quantity cannot be negative".to_string(),
                message_es: "La cantidad mínima no puede ser negativa".to_string(),
            });
        }

        // Material names identify ingredients on recipes and reports
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM raw_materials WHERE LOWER(name) = LOWER($1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            INSERT INTO raw_materials (name, unit, stock_quantity, minimum_quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, unit, stock_quantity, minimum_quantity, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.unit.as_str())
        .bind(stock_quantity)
        .bind(input.minimum_quantity)
        .fetch_one(&self.db)
        .await?;

        material_from_row(row)
    }

    /// Update a raw material's descriptive fields
    pub async fn update_material(
        &self,
        material_id: Uuid,
        input: UpdateMaterialInput,
    ) -> AppResult<RawMaterial> {
        let existing = self.get_material(material_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let minimum_quantity = input.minimum_quantity.unwrap_or(existing.minimum_quantity);

        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_es: "El nombre es obligatorio".to_string(),
            });
        }

        if minimum_quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "minimum_quantity".to_string(),
                message: "Minimum quantity cannot be negative".to_string(),
                message_es: "La cantidad mínima no puede ser negativa".to_string(),
            });
        }

        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            UPDATE raw_materials
            SET name = $1, minimum_quantity = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, unit, stock_quantity, minimum_quantity, created_at, updated_at
            "#,
        )
        .bind(name.trim())
        .bind(minimum_quantity)
        .bind(material_id)
        .fetch_one(&self.db)
        .await?;

        material_from_row(row)
    }

    // ========================================================================
    // Stock ledger
    // ========================================================================

    /// Whether the material's current stock covers the required quantity
    pub async fn check_available(
        &self,
        material_id: Uuid,
        required: Decimal,
    ) -> AppResult<bool> {
        let available = sqlx::query_scalar::<_, Decimal>(
            "SELECT stock_quantity FROM raw_materials WHERE id = $1",
        )
        .bind(material_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

        Ok(available >= required)
    }

    /// Deduct stock within the caller's transaction.
    ///
    /// The conditional update re-checks the balance so a concurrent deduction
    /// committed after the orchestrator's availability check still cannot
    /// drive stock negative.
    pub async fn deduct(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        material_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<()> {
        validate_positive_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
            message_es: "La cantidad debe ser mayor que cero".to_string(),
        })?;

        let result = sqlx::query(
            r#"
            UPDATE raw_materials
            SET stock_quantity = stock_quantity - $1, updated_at = NOW()
            WHERE id = $2 AND stock_quantity >= $1
            "#,
        )
        .bind(quantity)
        .bind(material_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            let name = sqlx::query_scalar::<_, String>(
                "SELECT name FROM raw_materials WHERE id = $1",
            )
            .bind(material_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

            return Err(AppError::InsufficientStock { material: name });
        }

        Ok(())
    }

    /// Apply a replenishment within the caller's transaction.
    ///
    /// Cost information stays on the inflow record; it is never blended into
    /// the material.
    pub async fn apply_inflow(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        material_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE raw_materials
            SET stock_quantity = stock_quantity + $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(quantity)
        .bind(material_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Raw material".to_string()));
        }

        Ok(())
    }

    /// Undo a previously applied inflow within the caller's transaction.
    ///
    /// Stock consumed since the inflow was recorded may exceed what is being
    /// reversed, so the balance floors at zero instead of failing.
    pub async fn reverse_inflow(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        material_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE raw_materials
            SET stock_quantity = GREATEST(stock_quantity - $1, 0), updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(quantity)
        .bind(material_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Raw material".to_string()));
        }

        Ok(())
    }
}

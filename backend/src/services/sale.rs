//! Sales orchestration over the derived finished-goods ledger.
//!
//! Sellable quantity is never stored: it is recomputed on demand as total
//! produced minus total sold. Sale creation gates every line on that derived
//! balance and commits the sale, its lines and the verified total in one
//! transaction. Voiding is an audit-only terminal transition; it does not
//! restore raw-material stock and the voided lines keep counting against
//! availability.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::{validate_batch_quantity, Sale, SaleLine, SaleShortfall, SaleStatus};

use crate::error::{AppError, AppResult};

/// Sale service for managing sales of finished goods
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Database row for a sale
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    total: Decimal,
    status: String,
    user_id: Uuid,
    sold_at: DateTime<Utc>,
    voided_reason: Option<String>,
    voided_by: Option<Uuid>,
    voided_at: Option<DateTime<Utc>>,
}

fn sale_from_row(row: SaleRow) -> AppResult<Sale> {
    let status = SaleStatus::from_str(&row.status)
        .ok_or_else(|| AppError::Internal(format!("Unknown sale status in database: {}", row.status)))?;

    Ok(Sale {
        id: row.id,
        total: row.total,
        status,
        user_id: row.user_id,
        sold_at: row.sold_at,
        voided_reason: row.voided_reason,
        voided_by: row.voided_by,
        voided_at: row.voided_at,
    })
}

/// Database row for a sale line with its recipe name
#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    id: Uuid,
    sale_id: Uuid,
    recipe_id: Uuid,
    recipe_name: String,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
}

impl From<SaleLineRow> for SaleLine {
    fn from(row: SaleLineRow) -> Self {
        SaleLine {
            id: row.id,
            sale_id: row.sale_id,
            recipe_id: row.recipe_id,
            recipe_name: row.recipe_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
        }
    }
}

/// One requested line of a sale
#[derive(Debug, Deserialize)]
pub struct SaleLineInput {
    pub recipe_id: Uuid,
    pub quantity: i32,
}

/// Input for creating a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub lines: Vec<SaleLineInput>,
}

/// Input for voiding a sale
#[derive(Debug, Deserialize)]
pub struct VoidSaleInput {
    pub reason: String,
}

/// Sale with its lines for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithLines {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

/// Sellable balance of a recipe
#[derive(Debug, Clone, Serialize)]
pub struct RecipeAvailability {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub total_produced: i64,
    pub total_sold: i64,
    pub available: i64,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Sellable quantity of a recipe, recomputed from the production and
    /// sale aggregates
    pub async fn available_to_sell(&self, recipe_id: Uuid) -> AppResult<RecipeAvailability> {
        let row = sqlx::query_as::<_, (String, i64, i64)>(
            r#"
            SELECT r.name,
                   COALESCE((SELECT SUM(quantity) FROM production_runs WHERE recipe_id = r.id), 0)::BIGINT,
                   COALESCE((SELECT SUM(quantity) FROM sale_lines WHERE recipe_id = r.id), 0)::BIGINT
            FROM recipes r
            WHERE r.id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        let (recipe_name, total_produced, total_sold) = row;

        Ok(RecipeAvailability {
            recipe_id,
            recipe_name,
            total_produced,
            total_sold,
            available: shared::available_to_sell(total_produced, total_sold),
        })
    }

    /// Create a sale: gate every line on derived availability, freeze prices
    /// from the recipes and persist the sale with its verified total in one
    /// transaction.
    pub async fn create_sale(
        &self,
        user_id: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<SaleWithLines> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "A sale needs at least one line".to_string(),
                message_es: "La venta necesita al menos una línea".to_string(),
            });
        }

        for line in &input.lines {
            validate_batch_quantity(line.quantity).map_err(|msg| AppError::Validation {
                field: "lines".to_string(),
                message: msg.to_string(),
                message_es: "La cantidad de cada línea debe ser un número entero positivo"
                    .to_string(),
            })?;
        }

        let mut tx = self.db.begin().await?;

        // Check every line against the derived balance and collect the
        // complete deficiency report before writing anything.
        let mut shortfalls = Vec::new();
        let mut priced_lines = Vec::new();

        for line in &input.lines {
            let row = sqlx::query_as::<_, (String, Decimal, i64, i64)>(
                r#"
                SELECT r.name, r.sale_price,
                       COALESCE((SELECT SUM(quantity) FROM production_runs WHERE recipe_id = r.id), 0)::BIGINT,
                       COALESCE((SELECT SUM(quantity) FROM sale_lines WHERE recipe_id = r.id), 0)::BIGINT
                FROM recipes r
                WHERE r.id = $1
                "#,
            )
            .bind(line.recipe_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

            let (recipe_name, sale_price, total_produced, total_sold) = row;
            let available = shared::available_to_sell(total_produced, total_sold);

            if i64::from(line.quantity) > available {
                shortfalls.push(SaleShortfall {
                    recipe_id: line.recipe_id,
                    recipe_name,
                    requested: line.quantity,
                    available,
                });
            } else {
                priced_lines.push((line.recipe_id, line.quantity, sale_price));
            }
        }

        if !shortfalls.is_empty() {
            tx.rollback().await?;
            return Err(AppError::InsufficientInventory { shortfalls });
        }

        // Insert the sale with a zero total, accumulate the true total from
        // the persisted lines, then fix the total before committing.
        let sale_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales (total, status, user_id)
            VALUES (0, 'active', $1)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut total = Decimal::ZERO;

        for (recipe_id, quantity, unit_price) in priced_lines {
            let subtotal = unit_price * Decimal::from(quantity);

            sqlx::query(
                r#"
                INSERT INTO sale_lines (sale_id, recipe_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(sale_id)
            .bind(recipe_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(subtotal)
            .execute(&mut *tx)
            .await?;

            total += subtotal;
        }

        sqlx::query("UPDATE sales SET total = $1 WHERE id = $2")
            .bind(total)
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_sale(sale_id).await
    }

    /// Get a sale with its lines
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithLines> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, total, status, user_id, sold_at, voided_reason, voided_by, voided_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let line_rows = sqlx::query_as::<_, SaleLineRow>(
            r#"
            SELECT sl.id, sl.sale_id, sl.recipe_id, r.name AS recipe_name,
                   sl.quantity, sl.unit_price, sl.subtotal
            FROM sale_lines sl
            JOIN recipes r ON r.id = sl.recipe_id
            WHERE sl.sale_id = $1
            ORDER BY sl.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleWithLines {
            sale: sale_from_row(row)?,
            lines: line_rows.into_iter().map(SaleLine::from).collect(),
        })
    }

    /// List sales, optionally restricted to a date range, newest first
    pub async fn list_sales(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, total, status, user_id, sold_at, voided_reason, voided_by, voided_at
            FROM sales
            WHERE ($1::DATE IS NULL OR sold_at::DATE >= $1)
              AND ($2::DATE IS NULL OR sold_at::DATE <= $2)
            ORDER BY sold_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(sale_from_row).collect()
    }

    /// Void a sale, recording reason, actor and timestamp.
    ///
    /// Lines are kept for audit and raw-material stock is not restored.
    pub async fn void_sale(
        &self,
        sale_id: Uuid,
        user_id: Uuid,
        input: VoidSaleInput,
    ) -> AppResult<SaleWithLines> {
        if input.reason.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: "A reason is required to void a sale".to_string(),
                message_es: "Se requiere un motivo para anular la venta".to_string(),
            });
        }

        let status = sqlx::query_scalar::<_, String>("SELECT status FROM sales WHERE id = $1")
            .bind(sale_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if status == SaleStatus::Voided.as_str() {
            return Err(AppError::InvalidStateTransition(
                "Sale is already voided".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE sales
            SET status = 'voided', voided_reason = $1, voided_by = $2, voided_at = NOW()
            WHERE id = $3 AND status = 'active'
            "#,
        )
        .bind(input.reason.trim())
        .bind(user_id)
        .bind(sale_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidStateTransition(
                "Sale is already voided".to_string(),
            ));
        }

        self.get_sale(sale_id).await
    }
}

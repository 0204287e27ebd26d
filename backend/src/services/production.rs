//! Production orchestration: requirement planning, availability checks and
//! the all-or-nothing stock deduction that records a production run.
//!
//! A production either fully succeeds, with every ingredient deducted and
//! the run recorded in one transaction, or leaves inventory and records
//! completely untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    find_shortfalls, plan_requirements, validate_batch_quantity, IngredientLine,
    MaterialRequirement, ProductionRun, Shortfall,
};

use crate::error::{AppError, AppResult};

use super::material::{parse_unit, MaterialService};

/// Production service coordinating requirement planning and stock deduction
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// Database row for a recipe ingredient joined with its stocked material
#[derive(Debug, sqlx::FromRow)]
struct IngredientLineRow {
    material_id: Uuid,
    material_name: String,
    quantity: Decimal,
    recipe_unit: String,
    stock_unit: String,
    stock_quantity: Decimal,
}

fn line_from_row(row: IngredientLineRow) -> AppResult<IngredientLine> {
    Ok(IngredientLine {
        material_id: row.material_id,
        material_name: row.material_name,
        quantity: row.quantity,
        recipe_unit: parse_unit(&row.recipe_unit)?,
        stock_unit: parse_unit(&row.stock_unit)?,
        stock_quantity: row.stock_quantity,
    })
}

/// Database row for a production run with its recipe name
#[derive(Debug, sqlx::FromRow)]
struct ProductionRunRow {
    id: Uuid,
    recipe_id: Uuid,
    recipe_name: String,
    quantity: i32,
    user_id: Uuid,
    produced_at: DateTime<Utc>,
}

/// Production run with recipe info for API responses
#[derive(Debug, Clone, Serialize)]
pub struct ProductionRunWithRecipe {
    #[serde(flatten)]
    pub run: ProductionRun,
    pub recipe_name: String,
}

impl From<ProductionRunRow> for ProductionRunWithRecipe {
    fn from(row: ProductionRunRow) -> Self {
        ProductionRunWithRecipe {
            run: ProductionRun {
                id: row.id,
                recipe_id: row.recipe_id,
                quantity: row.quantity,
                user_id: row.user_id,
                produced_at: row.produced_at,
            },
            recipe_name: row.recipe_name,
        }
    }
}

/// Input for recording a production run
#[derive(Debug, Deserialize)]
pub struct ProduceInput {
    pub recipe_id: Uuid,
    pub quantity: i32,
}

/// Result of an inventory check for a requested production quantity
#[derive(Debug, Clone, Serialize)]
pub struct InventoryCheck {
    pub sufficient: bool,
    pub missing: Vec<Shortfall>,
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Requirements for producing `quantity` batches of a recipe, expressed
    /// in each material's stock unit
    pub async fn compute_requirements(
        &self,
        recipe_id: Uuid,
        quantity: i32,
    ) -> AppResult<Vec<MaterialRequirement>> {
        Self::validate_quantity(quantity)?;
        let lines = self.load_ingredient_lines(recipe_id).await?;
        Ok(plan_requirements(&lines, quantity))
    }

    /// Whether current stock covers a requested production quantity, with
    /// the complete list of deficient ingredients when it does not
    pub async fn check_inventory(
        &self,
        recipe_id: Uuid,
        quantity: i32,
    ) -> AppResult<InventoryCheck> {
        Self::validate_quantity(quantity)?;
        let lines = self.load_ingredient_lines(recipe_id).await?;
        let missing = find_shortfalls(&lines, quantity);

        Ok(InventoryCheck {
            sufficient: missing.is_empty(),
            missing,
        })
    }

    /// Produce a recipe: check every ingredient, deduct all of them and
    /// record the run, atomically.
    pub async fn produce(
        &self,
        user_id: Uuid,
        input: ProduceInput,
    ) -> AppResult<ProductionRunWithRecipe> {
        Self::validate_quantity(input.quantity)?;

        let materials = MaterialService::new(self.db.clone());

        let mut tx = self.db.begin().await?;

        // Availability is confirmed on the transaction's own snapshot before
        // any deduction; deduct() re-checks row by row as it updates.
        let recipe_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)",
        )
        .bind(input.recipe_id)
        .fetch_one(&mut *tx)
        .await?;

        if !recipe_exists {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        let line_rows = sqlx::query_as::<_, IngredientLineRow>(
            r#"
            SELECT ri.material_id, m.name AS material_name, ri.quantity,
                   ri.unit AS recipe_unit, m.unit AS stock_unit, m.stock_quantity
            FROM recipe_ingredients ri
            JOIN raw_materials m ON m.id = ri.material_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.position
            "#,
        )
        .bind(input.recipe_id)
        .fetch_all(&mut *tx)
        .await?;

        let lines = line_rows
            .into_iter()
            .map(line_from_row)
            .collect::<AppResult<Vec<_>>>()?;

        let shortfalls = find_shortfalls(&lines, input.quantity);
        if !shortfalls.is_empty() {
            tx.rollback().await?;
            return Err(AppError::InsufficientIngredients { shortfalls });
        }

        for requirement in plan_requirements(&lines, input.quantity) {
            // find_shortfalls left only convertible requirements behind
            if let Some(required) = requirement.required_quantity {
                materials
                    .deduct(&mut tx, requirement.material_id, required)
                    .await?;
            }
        }

        let run_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO production_runs (recipe_id, quantity, user_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(input.recipe_id)
        .bind(input.quantity)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_run(run_id).await
    }

    /// Get a production run by ID
    pub async fn get_run(&self, run_id: Uuid) -> AppResult<ProductionRunWithRecipe> {
        let row = sqlx::query_as::<_, ProductionRunRow>(
            r#"
            SELECT p.id, p.recipe_id, r.name AS recipe_name, p.quantity, p.user_id, p.produced_at
            FROM production_runs p
            JOIN recipes r ON r.id = p.recipe_id
            WHERE p.id = $1
            "#,
        )
        .bind(run_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production run".to_string()))?;

        Ok(row.into())
    }

    /// List all production runs, newest first
    pub async fn list_runs(&self) -> AppResult<Vec<ProductionRunWithRecipe>> {
        let rows = sqlx::query_as::<_, ProductionRunRow>(
            r#"
            SELECT p.id, p.recipe_id, r.name AS recipe_name, p.quantity, p.user_id, p.produced_at
            FROM production_runs p
            JOIN recipes r ON r.id = p.recipe_id
            ORDER BY p.produced_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ProductionRunWithRecipe::from).collect())
    }

    fn validate_quantity(quantity: i32) -> AppResult<()> {
        validate_batch_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
            message_es: "La cantidad debe ser un número entero positivo".to_string(),
        })
    }

    /// Load a recipe's ingredient lines joined with their materials.
    /// Fails with NotFound when the recipe does not exist.
    async fn load_ingredient_lines(&self, recipe_id: Uuid) -> AppResult<Vec<IngredientLine>> {
        let recipe_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)",
        )
        .bind(recipe_id)
        .fetch_one(&self.db)
        .await?;

        if !recipe_exists {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        let rows = sqlx::query_as::<_, IngredientLineRow>(
            r#"
            SELECT ri.material_id, m.name AS material_name, ri.quantity,
                   ri.unit AS recipe_unit, m.unit AS stock_unit, m.stock_quantity
            FROM recipe_ingredients ri
            JOIN raw_materials m ON m.id = ri.material_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.position
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(line_from_row).collect()
    }
}

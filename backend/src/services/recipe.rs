//! Recipe management service for the bakery's bill of materials

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::{validate_positive_quantity, validate_price, Recipe, RecipeIngredient, Unit};

use crate::error::{AppError, AppResult};

use super::material::parse_unit;

/// Recipe service for managing recipes and their ingredient links
#[derive(Clone)]
pub struct RecipeService {
    db: PgPool,
}

/// Database row for a recipe
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: Uuid,
    name: String,
    instructions: String,
    sale_price: Decimal,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            name: row.name,
            instructions: row.instructions,
            sale_price: row.sale_price,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a recipe ingredient with its material
#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: Uuid,
    recipe_id: Uuid,
    material_id: Uuid,
    material_name: String,
    quantity: Decimal,
    unit: String,
}

fn ingredient_from_row(row: IngredientRow) -> AppResult<RecipeIngredient> {
    Ok(RecipeIngredient {
        id: row.id,
        recipe_id: row.recipe_id,
        material_id: row.material_id,
        material_name: row.material_name,
        quantity: row.quantity,
        unit: parse_unit(&row.unit)?,
    })
}

/// One ingredient entry when creating or replacing a recipe's ingredients
#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub unit: Unit,
}

/// Input for creating a recipe
#[derive(Debug, Deserialize)]
pub struct CreateRecipeInput {
    pub name: String,
    pub instructions: String,
    pub sale_price: Decimal,
    pub image_url: Option<String>,
    pub ingredients: Vec<IngredientInput>,
}

/// Input for updating a recipe.
///
/// When `ingredients` is present the full ingredient list is replaced.
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeInput {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub ingredients: Option<Vec<IngredientInput>>,
}

/// Recipe with its ingredient list for API responses
#[derive(Debug, Clone, Serialize)]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all recipes
    pub async fn list_recipes(&self) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, name, instructions, sale_price, image_url, created_at, updated_at
            FROM recipes
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// Get a recipe with its ingredients
    pub async fn get_recipe(&self, recipe_id: Uuid) -> AppResult<RecipeWithIngredients> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, name, instructions, sale_price, image_url, created_at, updated_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        let ingredient_rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT ri.id, ri.recipe_id, ri.material_id, m.name AS material_name,
                   ri.quantity, ri.unit
            FROM recipe_ingredients ri
            JOIN raw_materials m ON m.id = ri.material_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.position
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.db)
        .await?;

        let ingredients = ingredient_rows
            .into_iter()
            .map(ingredient_from_row)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(RecipeWithIngredients {
            recipe: row.into(),
            ingredients,
        })
    }

    /// Create a recipe with its ingredient list
    pub async fn create_recipe(&self, input: CreateRecipeInput) -> AppResult<RecipeWithIngredients> {
        self.validate_recipe_fields(&input.name, input.sale_price, &input.ingredients)?;

        let mut tx = self.db.begin().await?;

        let recipe_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO recipes (name, instructions, sale_price, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.instructions)
        .bind(input.sale_price)
        .bind(&input.image_url)
        .fetch_one(&mut *tx)
        .await?;

        self.insert_ingredients(&mut tx, recipe_id, &input.ingredients)
            .await?;

        tx.commit().await?;

        self.get_recipe(recipe_id).await
    }

    /// Update a recipe; replaces the ingredient list when one is provided
    pub async fn update_recipe(
        &self,
        recipe_id: Uuid,
        input: UpdateRecipeInput,
    ) -> AppResult<RecipeWithIngredients> {
        let existing = self.get_recipe(recipe_id).await?;

        let name = input.name.unwrap_or(existing.recipe.name);
        let instructions = input.instructions.unwrap_or(existing.recipe.instructions);
        let sale_price = input.sale_price.unwrap_or(existing.recipe.sale_price);
        let image_url = input.image_url.or(existing.recipe.image_url);

        if let Some(ingredients) = &input.ingredients {
            self.validate_recipe_fields(&name, sale_price, ingredients)?;
        } else {
            self.validate_recipe_fields(&name, sale_price, &[])?;
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE recipes
            SET name = $1, instructions = $2, sale_price = $3, image_url = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(name.trim())
        .bind(&instructions)
        .bind(sale_price)
        .bind(&image_url)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

        if let Some(ingredients) = &input.ingredients {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;

            self.insert_ingredients(&mut tx, recipe_id, ingredients).await?;
        }

        tx.commit().await?;

        self.get_recipe(recipe_id).await
    }

    /// Delete a recipe that has no production or sale history
    pub async fn delete_recipe(&self, recipe_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM production_runs WHERE recipe_id = $1)
                 + (SELECT COUNT(*) FROM sale_lines WHERE recipe_id = $1)
            "#,
        )
        .bind(recipe_id)
        .fetch_one(&self.db)
        .await?;

        if referenced > 0 {
            return Err(AppError::Conflict {
                resource: "recipe".to_string(),
                message: "Recipe has production or sale history and cannot be deleted".to_string(),
                message_es: "La receta tiene historial de producción o ventas y no puede eliminarse"
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        Ok(())
    }

    fn validate_recipe_fields(
        &self,
        name: &str,
        sale_price: Decimal,
        ingredients: &[IngredientInput],
    ) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_es: "El nombre es obligatorio".to_string(),
            });
        }

        validate_price(sale_price).map_err(|msg| AppError::Validation {
            field: "sale_price".to_string(),
            message: msg.to_string(),
            message_es: "El precio no puede ser negativo".to_string(),
        })?;

        for ingredient in ingredients {
            validate_positive_quantity(ingredient.quantity).map_err(|msg| {
                AppError::Validation {
                    field: "ingredients".to_string(),
                    message: msg.to_string(),
                    message_es: "La cantidad de cada ingrediente debe ser mayor que cero"
                        .to_string(),
                }
            })?;
        }

        Ok(())
    }

    async fn insert_ingredients(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: Uuid,
        ingredients: &[IngredientInput],
    ) -> AppResult<()> {
        for (position, ingredient) in ingredients.iter().enumerate() {
            let material_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM raw_materials WHERE id = $1)",
            )
            .bind(ingredient.material_id)
            .fetch_one(&mut **tx)
            .await?;

            if !material_exists {
                return Err(AppError::NotFound("Raw material".to_string()));
            }

            sqlx::query(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, material_id, quantity, unit, position)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(recipe_id)
            .bind(ingredient.material_id)
            .bind(ingredient.quantity)
            .bind(ingredient.unit.as_str())
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

//! HTTP handlers for recipe endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{MaterialRequirement, Recipe};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::production::InventoryCheck;
use crate::services::recipe::{CreateRecipeInput, RecipeWithIngredients, UpdateRecipeInput};
use crate::services::sale::RecipeAvailability;
use crate::services::{ProductionService, RecipeService, SaleService};
use crate::AppState;

/// Query parameters for requirement and availability checks
#[derive(Debug, Deserialize)]
pub struct QuantityQuery {
    pub quantity: i32,
}

/// List all recipes
pub async fn list_recipes(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Recipe>>> {
    let service = RecipeService::new(state.db);
    let recipes = service.list_recipes().await?;
    Ok(Json(recipes))
}

/// Get a recipe with its ingredients
pub async fn get_recipe(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<RecipeWithIngredients>> {
    let service = RecipeService::new(state.db);
    let recipe = service.get_recipe(recipe_id).await?;
    Ok(Json(recipe))
}

/// Create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<(StatusCode, Json<RecipeWithIngredients>)> {
    current_user.0.require_admin()?;
    let service = RecipeService::new(state.db);
    let recipe = service.create_recipe(input).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Update a recipe
pub async fn update_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<Json<RecipeWithIngredients>> {
    current_user.0.require_admin()?;
    let service = RecipeService::new(state.db);
    let recipe = service.update_recipe(recipe_id, input).await?;
    Ok(Json(recipe))
}

/// Delete a recipe without production or sale history
pub async fn delete_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    current_user.0.require_admin()?;
    let service = RecipeService::new(state.db);
    service.delete_recipe(recipe_id).await?;
    Ok(Json(()))
}

/// Raw-material requirements for producing a quantity of the recipe
pub async fn get_requirements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Query(query): Query<QuantityQuery>,
) -> AppResult<Json<Vec<MaterialRequirement>>> {
    let service = ProductionService::new(state.db);
    let requirements = service
        .compute_requirements(recipe_id, query.quantity)
        .await?;
    Ok(Json(requirements))
}

/// Whether current stock covers producing a quantity of the recipe
pub async fn check_availability(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Query(query): Query<QuantityQuery>,
) -> AppResult<Json<InventoryCheck>> {
    let service = ProductionService::new(state.db);
    let check = service.check_inventory(recipe_id, query.quantity).await?;
    Ok(Json(check))
}

/// Sellable balance of the recipe (produced minus sold)
pub async fn get_available_to_sell(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<RecipeAvailability>> {
    let service = SaleService::new(state.db);
    let availability = service.available_to_sell(recipe_id).await?;
    Ok(Json(availability))
}

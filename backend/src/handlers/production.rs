//! HTTP handlers for production endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::production::{ProduceInput, ProductionRunWithRecipe};
use crate::services::ProductionService;
use crate::AppState;

/// Record a production run, deducting ingredient stock atomically
pub async fn record_production(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ProduceInput>,
) -> AppResult<(StatusCode, Json<ProductionRunWithRecipe>)> {
    current_user.0.require_production_access()?;
    let service = ProductionService::new(state.db);
    let run = service.produce(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(run)))
}

/// List all production runs
pub async fn list_production(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductionRunWithRecipe>>> {
    let service = ProductionService::new(state.db);
    let runs = service.list_runs().await?;
    Ok(Json(runs))
}

/// Get a production run by ID
pub async fn get_production(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<ProductionRunWithRecipe>> {
    let service = ProductionService::new(state.db);
    let run = service.get_run(run_id).await?;
    Ok(Json(run))
}

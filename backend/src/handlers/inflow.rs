//! HTTP handlers for ingredient inflow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::IngredientInflow;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inflow::{EditInflowInput, RecordInflowInput};
use crate::services::InflowService;
use crate::AppState;

/// Record an inflow, increasing the material's stock
pub async fn record_inflow(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordInflowInput>,
) -> AppResult<(StatusCode, Json<IngredientInflow>)> {
    current_user.0.require_production_access()?;
    let service = InflowService::new(state.db);
    let inflow = service.record_inflow(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(inflow)))
}

/// List all inflows
pub async fn list_inflows(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<IngredientInflow>>> {
    let service = InflowService::new(state.db);
    let inflows = service.list_inflows().await?;
    Ok(Json(inflows))
}

/// List inflows for one material
pub async fn get_material_inflows(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<Vec<IngredientInflow>>> {
    let service = InflowService::new(state.db);
    let inflows = service.list_inflows_by_material(material_id).await?;
    Ok(Json(inflows))
}

/// Get an inflow by ID
pub async fn get_inflow(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(inflow_id): Path<Uuid>,
) -> AppResult<Json<IngredientInflow>> {
    let service = InflowService::new(state.db);
    let inflow = service.get_inflow(inflow_id).await?;
    Ok(Json(inflow))
}

/// Edit an inflow, reversing then reapplying its stock effect
pub async fn update_inflow(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inflow_id): Path<Uuid>,
    Json(input): Json<EditInflowInput>,
) -> AppResult<Json<IngredientInflow>> {
    current_user.0.require_admin()?;
    let service = InflowService::new(state.db);
    let inflow = service.edit_inflow(inflow_id, input).await?;
    Ok(Json(inflow))
}

/// Delete an inflow, reversing its stock effect
pub async fn delete_inflow(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inflow_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    current_user.0.require_admin()?;
    let service = InflowService::new(state.db);
    service.delete_inflow(inflow_id).await?;
    Ok(Json(()))
}

//! HTTP handlers for raw material endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::RawMaterial;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::material::{CreateMaterialInput, UpdateMaterialInput};
use crate::services::MaterialService;
use crate::AppState;

/// List all raw materials
pub async fn list_materials(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<RawMaterial>>> {
    let service = MaterialService::new(state.db);
    let materials = service.list_materials().await?;
    Ok(Json(materials))
}

/// Get a raw material by ID
pub async fn get_material(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<RawMaterial>> {
    let service = MaterialService::new(state.db);
    let material = service.get_material(material_id).await?;
    Ok(Json(material))
}

/// List materials at or below their minimum stock
pub async fn list_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<RawMaterial>>> {
    let service = MaterialService::new(state.db);
    let materials = service.list_low_stock().await?;
    Ok(Json(materials))
}

/// Create a raw material
pub async fn create_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateMaterialInput>,
) -> AppResult<(StatusCode, Json<RawMaterial>)> {
    current_user.0.require_admin()?;
    let service = MaterialService::new(state.db);
    let material = service.create_material(input).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

/// Update a raw material
pub async fn update_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(material_id): Path<Uuid>,
    Json(input): Json<UpdateMaterialInput>,
) -> AppResult<Json<RawMaterial>> {
    current_user.0.require_admin()?;
    let service = MaterialService::new(state.db);
    let material = service.update_material(material_id, input).await?;
    Ok(Json(material))
}

//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::Sale;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{CreateSaleInput, SaleWithLines, VoidSaleInput};
use crate::services::SaleService;
use crate::AppState;

/// Query parameters for listing sales
#[derive(Debug, Deserialize)]
pub struct SaleListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Create a sale gated on derived finished-goods availability
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<SaleWithLines>)> {
    current_user.0.require_sales_access()?;
    let service = SaleService::new(state.db);
    let sale = service.create_sale(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales, optionally within a date range
pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<SaleListQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db);
    let sales = service.list_sales(query.from, query.to).await?;
    Ok(Json(sales))
}

/// Get a sale with its lines
pub async fn get_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleWithLines>> {
    let service = SaleService::new(state.db);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// Void a sale, keeping its lines for audit
pub async fn void_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<VoidSaleInput>,
) -> AppResult<Json<SaleWithLines>> {
    current_user.0.require_admin()?;
    let service = SaleService::new(state.db);
    let sale = service
        .void_sale(sale_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(sale))
}

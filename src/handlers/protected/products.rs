// handlers/protected/products.rs - Product CRUD, inactive products included

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::database::models::{Product, ProductFilter, ProductInput, ProductPatch};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::catalog;
use crate::state::AppState;

/// GET /api/admin/products
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductFilter>, QueryRejection>,
) -> ApiResult<Vec<Product>> {
    let Query(filter) = query?;
    Ok(ApiResponse::success(state.store().list_products(&filter).await?))
}

/// GET /api/admin/products/:id
pub async fn get_product(State(state): State<AppState>, path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Product> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.store().get_product(id).await?))
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Product> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(catalog::create_product(state.store(), input).await?))
}

/// PATCH /api/admin/products/:id - Only the fields present are changed
pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Product> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(ApiResponse::success(catalog::update_product(state.store(), id, patch).await?))
}

/// DELETE /api/admin/products/:id - Refused once the product has been ordered
pub async fn delete_product(State(state): State<AppState>, path: Result<Path<Uuid>, PathRejection>) -> ApiResult<()> {
    let Path(id) = path?;
    catalog::delete_product(state.store(), id).await?;
    Ok(ApiResponse::no_content())
}

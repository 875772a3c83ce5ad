// handlers/protected/galleries.rs - Gallery management

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{GalleryImage, GalleryImageInput, GalleryImagePatch};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::gallery;
use crate::state::AppState;

/// GET /api/admin/galleries/:gallery - Every image, hidden ones included
pub async fn list_images(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Vec<GalleryImage>> {
    let Path(name) = path?;
    Ok(ApiResponse::success(gallery::list(state.store(), &name, false).await?))
}

/// POST /api/admin/galleries/:gallery
pub async fn add_image(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<GalleryImageInput>, JsonRejection>,
) -> ApiResult<GalleryImage> {
    let Path(name) = path?;
    let Json(input) = payload?;
    Ok(ApiResponse::created(gallery::add_image(state.store(), &name, input).await?))
}

/// PATCH /api/admin/galleries/images/:id
pub async fn update_image(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GalleryImagePatch>, JsonRejection>,
) -> ApiResult<GalleryImage> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(ApiResponse::success(gallery::update_image(state.store(), id, patch).await?))
}

/// DELETE /api/admin/galleries/images/:id
pub async fn delete_image(State(state): State<AppState>, path: Result<Path<Uuid>, PathRejection>) -> ApiResult<()> {
    let Path(id) = path?;
    state.store().delete_gallery_image(id).await?;
    Ok(ApiResponse::no_content())
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<Uuid>,
}

/// PUT /api/admin/galleries/:gallery/order - `{ "ids": [...] }` in display order
pub async fn reorder(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Vec<GalleryImage>> {
    let Path(name) = path?;
    let Json(request) = payload?;
    Ok(ApiResponse::success(gallery::reorder(state.store(), &name, &request.ids).await?))
}

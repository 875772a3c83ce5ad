// handlers/public/galleries.rs - GET /api/galleries/:gallery

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};

use crate::database::models::GalleryImage;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::gallery;
use crate::state::AppState;

/// GET /api/galleries/:gallery - Active images in display order
pub async fn get_gallery(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Vec<GalleryImage>> {
    let Path(name) = path?;
    Ok(ApiResponse::success(gallery::list(state.store(), &name, true).await?))
}

// handlers/public/catalog.rs - Storefront product listing

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::database::models::{Product, ProductFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::catalog;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ProductQuery> for ProductFilter {
    fn from(query: ProductQuery) -> Self {
        ProductFilter {
            category: query.category,
            featured: query.featured,
            active_only: true,
            search: query.search,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// GET /api/products - Active products, optionally filtered
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Vec<Product>> {
    let Query(query) = query?;
    let products = catalog::public_products(state.store(), query.into()).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/products/:slug - One active product
pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Product> {
    let Path(slug) = path?;
    Ok(ApiResponse::success(catalog::public_product(state.store(), &slug).await?))
}

/// GET /api/categories - Categories having at least one product
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::success(state.store().list_categories().await?))
}

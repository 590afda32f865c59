//! Catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use i1fashion_core::{ProductId, ProductResponse, ProductsResponse};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Matches the catalog cache TTL.
const CATALOG_CACHE_CONTROL: &str = "public, max-age=300";

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

fn cacheable(body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CATALOG_CACHE_CONTROL),
    );
    response
}

/// `GET /api/products` - active products, optionally by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Response> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let products = state.catalog().products(state.pool(), category).await?;
    Ok(cacheable(Json(ProductsResponse { products })))
}

/// `GET /api/products/{id}` - one active product with its variants.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let not_found = || AppError::NotFound("Product not found".to_string());
    let id: ProductId = id.parse().map_err(|_| not_found())?;

    let product = match state.catalog().product(state.pool(), id).await {
        Ok(detail) => detail,
        Err(RepositoryError::NotFound) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    Ok(cacheable(Json(ProductResponse { product })))
}

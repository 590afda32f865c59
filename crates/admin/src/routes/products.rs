//! Catalog management.
//!
//! Products can be updated and deleted either by path (`/products/{id}`) or
//! the older way, with the ID in the body (`PUT /products`) or query
//! (`DELETE /products?id=`).

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use i1fashion_core::{
    MessageResponse, Product, ProductDetail, ProductId, ProductResponse, ProductsResponse,
};

use crate::db::{NewProduct, ProductChanges, ProductRepository, RepositoryError, VariantRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Image shown until a real product photo is uploaded.
pub const PLACEHOLDER_IMAGE_URL: &str = "/api/placeholder/400/500";

/// Body for creating or updating a product. Every field is optional here;
/// [`ProductRequest::into_new_product`] enforces what creation needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductRequest {
    /// Only read by `PUT /products`.
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProductIdQuery {
    pub id: Option<String>,
}

/// Response for product create and update.
#[derive(Debug, Serialize)]
pub struct ProductMutationResponse {
    pub success: bool,
    pub product: Product,
    pub message: String,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_amounts(base_price: Option<Decimal>, stock_quantity: Option<i32>) -> Result<()> {
    if base_price.is_some_and(|p| p.is_sign_negative() && !p.is_zero()) {
        return Err(AppError::BadRequest(
            "base_price must not be negative".to_string(),
        ));
    }
    if stock_quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest(
            "stock_quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

impl ProductRequest {
    /// Validate a create request.
    ///
    /// Name, base price and category are required. Description defaults to
    /// empty, stock to zero, image to [`PLACEHOLDER_IMAGE_URL`] and the
    /// product starts active.
    fn into_new_product(self) -> Result<NewProduct> {
        let (Some(name), Some(base_price), Some(category)) = (
            trimmed(self.name),
            self.base_price,
            trimmed(self.category),
        ) else {
            return Err(AppError::BadRequest(
                "Missing required fields: name, base_price, category".to_string(),
            ));
        };
        check_amounts(Some(base_price), self.stock_quantity)?;

        Ok(NewProduct {
            name,
            description: self.description.unwrap_or_default().trim().to_string(),
            base_price,
            category,
            image_url: trimmed(self.image_url)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            stock_quantity: self.stock_quantity.unwrap_or(0),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    /// Validate an update request. Blank name or category are rejected
    /// rather than stored.
    fn into_changes(self) -> Result<ProductChanges> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest(
                "Product name cannot be empty".to_string(),
            ));
        }
        if self.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::BadRequest("Category cannot be empty".to_string()));
        }
        check_amounts(self.base_price, self.stock_quantity)?;

        Ok(ProductChanges {
            name: trimmed(self.name),
            description: self.description.map(|d| d.trim().to_string()),
            base_price: self.base_price,
            category: trimmed(self.category),
            image_url: trimmed(self.image_url),
            stock_quantity: self.stock_quantity,
            is_active: self.is_active,
        })
    }
}

/// Parse an ID supplied in a body or query string.
fn required_id(id: Option<&str>) -> Result<ProductId> {
    let id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Product ID is required".to_string()))?;
    id.parse()
        .map_err(|_| AppError::BadRequest("Invalid product ID".to_string()))
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// Parse an ID from the path. Malformed IDs cannot match any product.
fn path_id(id: &str) -> Result<ProductId> {
    id.parse().map_err(|_| not_found())
}

fn or_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    }
}

/// `GET /api/admin/products` - all products, newest first.
#[instrument(skip_all)]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(ProductsResponse { products }))
}

/// `GET /api/admin/products/{id}` - a product with all of its variants.
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let id = path_id(&id)?;
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await
        .map_err(or_not_found)?;
    let variants = VariantRepository::new(state.pool())
        .list_for_product(id)
        .await?;

    Ok(Json(ProductResponse {
        product: ProductDetail { product, variants },
    }))
}

/// `POST /api/admin/products` - create a product.
#[instrument(skip_all)]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductMutationResponse>> {
    let Json(request) = payload?;
    let new_product = request.into_new_product()?;

    let product = ProductRepository::new(state.pool())
        .create(&new_product)
        .await?;
    info!(admin_id = %admin.id, product_id = %product.id, slug = %product.slug, "Product created");

    Ok(Json(ProductMutationResponse {
        success: true,
        product,
        message: "Product created successfully".to_string(),
    }))
}

async fn apply_update(
    state: &AppState,
    id: ProductId,
    request: ProductRequest,
) -> Result<Json<ProductMutationResponse>> {
    let changes = request.into_changes()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(or_not_found)?;
    info!(product_id = %product.id, "Product updated");

    Ok(Json(ProductMutationResponse {
        success: true,
        product,
        message: "Product updated successfully".to_string(),
    }))
}

/// `PUT /api/admin/products` - update the product named by `id` in the body.
#[instrument(skip_all)]
pub async fn update_from_body(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductMutationResponse>> {
    let Json(request) = payload?;
    let id = required_id(request.id.as_deref())?;
    apply_update(&state, id, request).await
}

/// `PUT /api/admin/products/{id}` - update one product.
#[instrument(skip_all)]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductMutationResponse>> {
    let id = path_id(&id)?;
    let Json(request) = payload?;
    apply_update(&state, id, request).await
}

async fn apply_delete(state: &AppState, id: ProductId) -> Result<Json<MessageResponse>> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(or_not_found)?;
    info!(product_id = %id, "Product deleted");

    Ok(Json(MessageResponse::ok("Product deleted successfully")))
}

/// `DELETE /api/admin/products?id=` - delete the product named in the query.
#[instrument(skip_all)]
pub async fn delete_from_query(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ProductIdQuery>,
) -> Result<Json<MessageResponse>> {
    let id = required_id(query.id.as_deref())?;
    apply_delete(&state, id).await
}

/// `DELETE /api/admin/products/{id}` - delete one product.
#[instrument(skip_all)]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = path_id(&id)?;
    apply_delete(&state, id).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(body: &str) -> ProductRequest {
        serde_json::from_str(body).unwrap()
    }

    fn bad_request<T: std::fmt::Debug>(result: Result<T>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn test_create_defaults() {
        let product = request(r#"{"name":" Linen Kurta ","base_price":"1499","category":"kurtas"}"#)
            .into_new_product()
            .unwrap();

        assert_eq!(product.name, "Linen Kurta");
        assert_eq!(product.base_price, Decimal::new(1499, 0));
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(product.stock_quantity, 0);
        assert!(product.is_active);
        assert!(product.description.is_empty());
    }

    #[test]
    fn test_create_requires_fields() {
        for body in [
            r#"{"base_price":"1499","category":"kurtas"}"#,
            r#"{"name":"Kurta","category":"kurtas"}"#,
            r#"{"name":"Kurta","base_price":"1499","category":"  "}"#,
        ] {
            assert_eq!(
                bad_request(request(body).into_new_product()),
                "Missing required fields: name, base_price, category"
            );
        }
    }

    #[test]
    fn test_create_allows_free_product() {
        let product = request(r#"{"name":"Gift Wrap","base_price":"0","category":"extras"}"#)
            .into_new_product()
            .unwrap();
        assert_eq!(product.base_price, Decimal::ZERO);
    }

    #[test]
    fn test_negative_amounts_rejected() {
        assert_eq!(
            bad_request(
                request(r#"{"name":"Kurta","base_price":"-1","category":"kurtas"}"#)
                    .into_new_product()
            ),
            "base_price must not be negative"
        );
        assert_eq!(
            bad_request(request(r#"{"stock_quantity":-3}"#).into_changes()),
            "stock_quantity must not be negative"
        );
    }

    #[test]
    fn test_update_rejects_blank_name() {
        assert_eq!(
            bad_request(request(r#"{"name":"  "}"#).into_changes()),
            "Product name cannot be empty"
        );
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let changes = request(r#"{"is_active":false}"#).into_changes().unwrap();
        assert_eq!(
            changes,
            ProductChanges {
                is_active: Some(false),
                ..ProductChanges::default()
            }
        );
    }

    #[test]
    fn test_required_id() {
        assert_eq!(bad_request(required_id(None)), "Product ID is required");
        assert_eq!(bad_request(required_id(Some("abc"))), "Invalid product ID");
        let id = ProductId::generate();
        assert_eq!(required_id(Some(&id.to_string())).unwrap(), id);
    }
}

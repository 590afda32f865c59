//! Color/size variants of a product.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use i1fashion_core::{MessageResponse, ProductId, ProductVariant, VariantId};

use crate::db::{
    NewVariant, ProductRepository, RepositoryError, VariantChanges, VariantRepository,
};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VariantRequest {
    pub color: Option<String>,
    pub size: Option<String>,
    pub stock_quantity: Option<i32>,
    pub price_adjustment: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct VariantsResponse {
    pub variants: Vec<ProductVariant>,
}

#[derive(Debug, Serialize)]
pub struct VariantMutationResponse {
    pub success: bool,
    pub variant: ProductVariant,
    pub message: String,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_stock(stock_quantity: Option<i32>) -> Result<()> {
    if stock_quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest(
            "stock_quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

impl VariantRequest {
    /// Color and size are required. A negative price adjustment is allowed
    /// (a cheaper size, say); stock starts at zero.
    fn into_new_variant(self) -> Result<NewVariant> {
        let (Some(color), Some(size)) = (trimmed(self.color), trimmed(self.size)) else {
            return Err(AppError::BadRequest(
                "Missing required fields: color, size".to_string(),
            ));
        };
        check_stock(self.stock_quantity)?;

        Ok(NewVariant {
            color,
            size,
            stock_quantity: self.stock_quantity.unwrap_or(0),
            price_adjustment: self.price_adjustment.unwrap_or(Decimal::ZERO),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    fn into_changes(self) -> Result<VariantChanges> {
        if self.color.as_deref().is_some_and(|c| c.trim().is_empty())
            || self.size.as_deref().is_some_and(|s| s.trim().is_empty())
        {
            return Err(AppError::BadRequest(
                "Color and size cannot be empty".to_string(),
            ));
        }
        check_stock(self.stock_quantity)?;

        Ok(VariantChanges {
            color: trimmed(self.color),
            size: trimmed(self.size),
            stock_quantity: self.stock_quantity,
            price_adjustment: self.price_adjustment,
            is_active: self.is_active,
        })
    }
}

fn product_not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

fn variant_not_found() -> AppError {
    AppError::NotFound("Variant not found".to_string())
}

/// `GET /api/admin/products/{id}/variants`
#[instrument(skip_all)]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<VariantsResponse>> {
    let product_id: ProductId = product_id.parse().map_err(|_| product_not_found())?;

    // An empty list would hide a bad product ID.
    ProductRepository::new(state.pool())
        .get(product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => product_not_found(),
            other => other.into(),
        })?;
    let variants = VariantRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;

    Ok(Json(VariantsResponse { variants }))
}

/// `POST /api/admin/products/{id}/variants`
#[instrument(skip_all)]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    payload: std::result::Result<Json<VariantRequest>, JsonRejection>,
) -> Result<Json<VariantMutationResponse>> {
    let product_id: ProductId = product_id.parse().map_err(|_| product_not_found())?;
    let Json(request) = payload?;
    let new_variant = request.into_new_variant()?;

    let variant = VariantRepository::new(state.pool())
        .create(product_id, &new_variant)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => product_not_found(),
            other => other.into(),
        })?;
    info!(
        admin_id = %admin.id,
        product_id = %product_id,
        variant = %variant.display_name(),
        "Variant created"
    );

    Ok(Json(VariantMutationResponse {
        success: true,
        variant,
        message: "Variant created successfully".to_string(),
    }))
}

/// `PUT /api/admin/variants/{id}`
#[instrument(skip_all)]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<VariantRequest>, JsonRejection>,
) -> Result<Json<VariantMutationResponse>> {
    let id: VariantId = id.parse().map_err(|_| variant_not_found())?;
    let Json(request) = payload?;
    let changes = request.into_changes()?;

    let variant = VariantRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => variant_not_found(),
            other => other.into(),
        })?;
    info!(variant_id = %variant.id, stock = variant.stock_quantity, "Variant updated");

    Ok(Json(VariantMutationResponse {
        success: true,
        variant,
        message: "Variant updated successfully".to_string(),
    }))
}

/// `DELETE /api/admin/variants/{id}`
#[instrument(skip_all)]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id: VariantId = id.parse().map_err(|_| variant_not_found())?;

    VariantRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => variant_not_found(),
            other => other.into(),
        })?;
    info!(variant_id = %id, "Variant deleted");

    Ok(Json(MessageResponse::ok("Variant deleted successfully")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(body: &str) -> VariantRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_new_variant_defaults() {
        let variant = request(r#"{"color":" Indigo ","size":"M"}"#)
            .into_new_variant()
            .unwrap();

        assert_eq!(variant.color, "Indigo");
        assert_eq!(variant.size, "M");
        assert_eq!(variant.stock_quantity, 0);
        assert_eq!(variant.price_adjustment, Decimal::ZERO);
        assert!(variant.is_active);
    }

    #[test]
    fn test_new_variant_requires_color_and_size() {
        let err = request(r#"{"color":"Indigo"}"#).into_new_variant().unwrap_err();
        assert!(
            matches!(err, AppError::BadRequest(ref msg) if msg == "Missing required fields: color, size")
        );
    }

    #[test]
    fn test_negative_adjustment_allowed() {
        let variant = request(r#"{"color":"Black","size":"XS","price_adjustment":"-100"}"#)
            .into_new_variant()
            .unwrap();
        assert_eq!(variant.price_adjustment, Decimal::new(-100, 0));
    }

    #[test]
    fn test_changes_reject_negative_stock() {
        let err = request(r#"{"stock_quantity":-1}"#).into_changes().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_changes_reject_blank_size() {
        let err = request(r#"{"size":" "}"#).into_changes().unwrap_err();
        assert!(
            matches!(err, AppError::BadRequest(ref msg) if msg == "Color and size cannot be empty")
        );
    }
}

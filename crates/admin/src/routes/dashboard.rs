//! Dashboard numbers and the customer list.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use i1fashion_core::{CustomerSummary, DashboardStats};

use crate::db::DashboardRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    pub success: bool,
    pub customers: Vec<CustomerSummary>,
}

/// `GET /api/admin/stats`
#[instrument(skip_all)]
pub async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let stats = DashboardRepository::new(state.pool()).stats().await?;
    Ok(Json(stats))
}

/// `GET /api/admin/customers` - newest customers first, with order totals.
#[instrument(skip_all)]
pub async fn customers(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<CustomersResponse>> {
    let customers = DashboardRepository::new(state.pool()).customers().await?;

    Ok(Json(CustomersResponse {
        success: true,
        customers,
    }))
}

//! Admin dashboard aggregates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// Stock level below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct DashboardStats {
    pub total_products: i64,
    pub active_products: i64,
    /// Products with stock under [`LOW_STOCK_THRESHOLD`].
    pub low_stock_products: i64,
    pub total_orders: i64,
    /// Sum of all order totals.
    pub total_revenue: Decimal,
    pub total_customers: i64,
}

/// A customer with their order history rolled up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct CustomerSummary {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub order_count: i64,
    pub total_spent: Decimal,
}

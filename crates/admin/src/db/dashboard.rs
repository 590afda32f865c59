//! Dashboard aggregates and the customer list.

use sqlx::PgPool;

use i1fashion_core::{CustomerSummary, DashboardStats, LOW_STOCK_THRESHOLD};

use super::RepositoryError;

/// Repository for read-only dashboard queries.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Headline totals in a single round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            "SELECT \
                 (SELECT COUNT(*) FROM products) AS total_products, \
                 (SELECT COUNT(*) FROM products WHERE is_active) AS active_products, \
                 (SELECT COUNT(*) FROM products WHERE stock_quantity < $1) AS low_stock_products, \
                 (SELECT COUNT(*) FROM orders) AS total_orders, \
                 (SELECT COALESCE(SUM(total_amount), 0) FROM orders) AS total_revenue, \
                 (SELECT COUNT(*) FROM users) AS total_customers",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Every customer with their order count and lifetime spend, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn customers(&self) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let customers = sqlx::query_as::<_, CustomerSummary>(
            "SELECT u.id, u.email, u.full_name, u.phone, u.created_at, \
                 COUNT(o.id) AS order_count, \
                 COALESCE(SUM(o.total_amount), 0) AS total_spent \
             FROM users u \
             LEFT JOIN orders o ON o.user_id = u.id \
             GROUP BY u.id \
             ORDER BY u.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }
}

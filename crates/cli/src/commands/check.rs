//! Database health check.

use i1fashion_admin::db::{self, DashboardRepository};

use super::{CommandError, database_url};

/// Connect, report the migration state and log the dashboard totals.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or queried.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    tracing::info!("Connected to database");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(&pool)
        .await
        .unwrap_or(0);
    let available = sqlx::migrate!("../../migrations").iter().count();
    if usize::try_from(applied).unwrap_or(0) < available {
        tracing::warn!(applied, available, "Migrations pending, run `i1f-cli migrate`");
    } else {
        tracing::info!(applied, "Migrations up to date");
    }

    match DashboardRepository::new(&pool).stats().await {
        Ok(stats) => {
            tracing::info!(
                products = stats.total_products,
                active = stats.active_products,
                low_stock = stats.low_stock_products,
                orders = stats.total_orders,
                revenue = %stats.total_revenue,
                customers = stats.total_customers,
                "Store totals"
            );
        }
        Err(e) => tracing::warn!(error = %e, "Could not read store totals"),
    }

    Ok(())
}

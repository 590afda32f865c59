//! Database migration command.
//!
//! Applies every file in the workspace `migrations/` directory that has not
//! run yet. The migrations are embedded at compile time, so the binary can
//! run anywhere the database is reachable.

use i1fashion_admin::db;

use super::{CommandError, database_url};

/// Run pending migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the database cannot be
/// reached, or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let migrator = sqlx::migrate!("../../migrations");
    tracing::info!(
        available = migrator.iter().count(),
        "Running migrations..."
    );
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

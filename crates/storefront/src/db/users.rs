//! Customer profile queries.

use sqlx::PgPool;

use i1fashion_core::{Email, User};

use super::RepositoryError;

const USER_COLUMNS: &str = "id, email, full_name, phone, created_at, email_verified";

/// Repository for customer profiles.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = $1"
        ))
        .bind(email.normalized())
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Mark a user's email as verified and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_email_verified(&self, email: &Email) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET email_verified = TRUE WHERE LOWER(email) = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(email.normalized())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

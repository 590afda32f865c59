//! Account confirmation after email verification.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use tracing::{info, instrument};

use i1fashion_core::{ConfirmUserRequest, ConfirmUserResponse, Email};

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `POST /api/confirm-user` - mark a freshly verified email as confirmed.
///
/// Requires a successful `PUT /api/send-otp` for the same address within the
/// last few minutes.
#[instrument(skip(state, payload))]
pub async fn confirm(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ConfirmUserRequest>, JsonRejection>,
) -> Result<Json<ConfirmUserResponse>> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    let email = Email::parse(request.email.trim())
        .map_err(|_| AppError::BadRequest("Invalid email address".to_string()))?;

    let now = Utc::now();
    if !state.otp().take_confirmation(&email, now) {
        return Err(AppError::Forbidden(
            "Email has not been verified".to_string(),
        ));
    }

    let user = match UserRepository::new(state.pool())
        .mark_email_verified(&email)
        .await
    {
        Ok(user) => user,
        Err(RepositoryError::NotFound) => {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Err(e) => {
            state.otp().restore_confirmation(&email, now);
            return Err(e.into());
        }
    };

    info!(user_id = %user.id, "User email confirmed");
    Ok(Json(ConfirmUserResponse {
        success: true,
        message: "User confirmed successfully".to_string(),
        user,
    }))
}

//! Admin sign-in and sign-out.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use i1fashion_core::{AdminLoginRequest, AdminLoginResponse, MessageResponse};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// `POST /api/admin/login` - exchange the PIN for an admin session.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<AdminLoginResponse>> {
    let Json(request) = payload?;

    let identity = match AdminAuthService::new(&state.config().admin_pin)
        .login(&request.pin, Utc::now())
    {
        Ok(identity) => identity,
        Err(e @ AdminAuthError::InvalidPin) => {
            warn!("Admin login rejected");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_admin(&session, &identity.admin_user).await?;
    set_sentry_user(&identity.admin_user);
    info!(admin_id = %identity.admin_user.id, "Admin signed in");

    Ok(Json(AdminLoginResponse {
        success: true,
        user: identity.user,
        admin_user: identity.admin_user,
    }))
}

/// `POST /api/admin/logout` - end the admin session.
#[instrument(skip_all)]
pub async fn logout(
    RequireAdminAuth(admin): RequireAdminAuth,
    session: Session,
) -> Result<Json<MessageResponse>> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    info!(admin_id = %admin.id, "Admin signed out");

    Ok(Json(MessageResponse::ok("Logged out successfully")))
}

//! Email verification codes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use tracing::{info, instrument};

use i1fashion_core::{Email, MessageResponse, SendOtpRequest, VerifyOtpRequest};

use crate::error::{AppError, Result};
use crate::services::email::generate_verification_code;
use crate::services::otp::OTP_TTL;
use crate::state::AppState;

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw.trim()).map_err(|_| AppError::BadRequest("Invalid email address".to_string()))
}

/// `POST /api/send-otp` - issue and email a six digit code.
#[instrument(skip(state, payload))]
pub async fn send(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    let email = parse_email(&request.email)?;

    let mailer = state
        .email()
        .ok_or_else(|| AppError::ServiceUnavailable("Email service is not configured".to_string()))?;

    let code = generate_verification_code();
    state.otp().issue(&email, code.clone(), Utc::now());

    if let Err(e) = mailer
        .send_otp(email.as_str(), &code, OTP_TTL.num_minutes())
        .await
    {
        state.otp().revoke(&email, &code);
        return Err(AppError::Email("Failed to send OTP", e));
    }

    info!(email = %email, "OTP issued");
    Ok(Json(MessageResponse::ok("OTP sent successfully")))
}

/// `PUT /api/send-otp` - check a code. Each code works once.
#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() || request.otp.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Email and OTP are required".to_string(),
        ));
    }
    let email = parse_email(&request.email)?;

    state.otp().verify(&email, &request.otp, Utc::now())?;

    info!(email = %email, "OTP verified");
    Ok(Json(MessageResponse::ok("OTP verified successfully")))
}

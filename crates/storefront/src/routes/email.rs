//! Ad-hoc transactional email.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use i1fashion_core::Email;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
    pub details: SentEmail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailUsage {
    pub message: String,
    pub usage: String,
}

/// `POST /api/send-email` - wrap a message in the store layout and send it.
#[instrument(skip(state, payload))]
pub async fn send(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<SendEmailResponse>> {
    let Json(request) = payload?;
    let to = request.to.trim();
    let subject = request.subject.trim();
    if to.is_empty() || subject.is_empty() || request.message.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing required fields: to, subject, message".to_string(),
        ));
    }
    let to = Email::parse(to)
        .map_err(|_| AppError::BadRequest("Invalid recipient address".to_string()))?;

    let mailer = state
        .email()
        .ok_or_else(|| AppError::ServiceUnavailable("Email service is not configured".to_string()))?;

    mailer
        .send_message(to.as_str(), subject, &request.message)
        .await
        .map_err(|e| AppError::Email("Failed to send email", e))?;

    Ok(Json(SendEmailResponse {
        success: true,
        message: "Email sent successfully".to_string(),
        details: SentEmail {
            to: to.into_inner(),
            subject: subject.to_string(),
            sent_at: Utc::now(),
        },
    }))
}

/// `GET /api/send-email` - describe how to use the endpoint.
pub async fn usage() -> Json<EmailUsage> {
    Json(EmailUsage {
        message: "Email API endpoint is working".to_string(),
        usage: "POST to this endpoint with { to, subject, message } to send emails".to_string(),
    })
}

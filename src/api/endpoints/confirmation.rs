//! Confirmation email endpoint.
//!
//! `POST /api/confirmation` with `{ "email", "name" }`:
//! - 200 `{ "message": "Email sent successfully" }`
//! - 400 `BAD_REQUEST` for a malformed body, a malformed address or a
//!   missing/blank name
//! - 500 `INTERNAL` when delivery fails

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::confirmation::{ConfirmationEmail, ConfirmationRequest};

#[derive(Serialize)]
pub struct ConfirmationResponse {
    pub message: &'static str,
}

/// `POST /api/confirmation`
pub async fn send(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ConfirmationRequest>, JsonRejection>,
) -> Result<Json<ConfirmationResponse>, ApiError> {
    let Json(req) = payload?;
    let email = ConfirmationEmail::compose(&req, &ctx.core.config.mail_from)?;
    ctx.core.mailer().send(&email)?;

    Ok(Json(ConfirmationResponse {
        message: "Email sent successfully",
    }))
}

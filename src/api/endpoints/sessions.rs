//! Chat widget endpoints.
//!
//! - `POST /api/sessions`: create a widget session (greeting included)
//! - `GET /api/sessions/:id`: current log, stage, visibility, composing flag
//! - `DELETE /api/sessions/:id`: tear the session down
//! - `POST /api/sessions/:id/{open,close,toggle}`: visibility
//! - `POST /api/sessions/:id/messages`: submit user text (reply is delayed)
//! - `POST /api/sessions/:id/cancel`: drop replies not yet delivered

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_session_id, ApiContext};
use crate::chat::{ChatWidget, SessionSnapshot};
use crate::models::Message;

fn lookup(ctx: &ApiContext, raw_id: &str) -> Result<std::sync::Arc<ChatWidget>, ApiError> {
    let id = parse_session_id(raw_id)?;
    Ok(ctx.core.session(id)?)
}

/// `POST /api/sessions`
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let widget = ctx.core.create_session()?;
    Ok((StatusCode::CREATED, Json(widget.snapshot())))
}

/// `GET /api/sessions/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let widget = lookup(&ctx, &id)?;
    Ok(Json(widget.snapshot()))
}

/// `DELETE /api/sessions/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    ctx.core.remove_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct VisibilityResponse {
    pub open: bool,
}

/// `POST /api/sessions/:id/open`
pub async fn open(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    let widget = lookup(&ctx, &id)?;
    Ok(Json(VisibilityResponse {
        open: widget.open(),
    }))
}

/// `POST /api/sessions/:id/close`
pub async fn close(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    let widget = lookup(&ctx, &id)?;
    Ok(Json(VisibilityResponse {
        open: widget.close(),
    }))
}

/// `POST /api/sessions/:id/toggle`
pub async fn toggle(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    let widget = lookup(&ctx, &id)?;
    Ok(Json(VisibilityResponse {
        open: widget.toggle(),
    }))
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct SendMessageAck {
    /// False when the text was blank and nothing was appended.
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    pub composing: bool,
}

/// `POST /api/sessions/:id/messages`: blank text is acknowledged but
/// dropped, matching the widget's silent input gate.
pub async fn send(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SendMessageAck>), ApiError> {
    let widget = lookup(&ctx, &id)?;
    let Json(req) = payload?;
    let message = widget.send_message(&req.text)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SendMessageAck {
            accepted: message.is_some(),
            message,
            composing: widget.is_composing(),
        }),
    ))
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub cancelled: usize,
}

/// `POST /api/sessions/:id/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    let widget = lookup(&ctx, &id)?;
    Ok(Json(CancelResponse {
        cancelled: widget.cancel_pending(),
    }))
}

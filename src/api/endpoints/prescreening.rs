//! Pre-screening form endpoints.
//!
//! - `GET /api/prescreening/form`: step and field descriptions
//! - `POST /api/prescreening`: completed form submission

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::models::PreScreeningData;
use crate::prescreening::{form_schema, StepSchema};

/// `GET /api/prescreening/form`
pub async fn form() -> Json<Vec<StepSchema>> {
    Json(form_schema())
}

#[derive(Serialize)]
pub struct SubmissionAck {
    pub received: bool,
    pub data: PreScreeningData,
}

/// `POST /api/prescreening`: option ids and the numeric age are checked
/// during deserialization (400 on failure). The answers are acknowledged,
/// not stored.
pub async fn submit(
    payload: Result<Json<PreScreeningData>, JsonRejection>,
) -> Result<Json<SubmissionAck>, ApiError> {
    let Json(data) = payload?;
    tracing::info!(
        has_age = data.age.is_some(),
        research_types = data.research_types.as_ref().map_or(0, |t| t.len()),
        "Pre-screening answers received"
    );
    Ok(Json(SubmissionAck {
        received: true,
        data,
    }))
}

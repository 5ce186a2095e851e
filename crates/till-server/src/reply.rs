//! `POST /reply` — inbound answer submission.
//!
//! The station's frontend answers the most recent question by posting the
//! reply payload here, which completes the rendezvous and unblocks the
//! payment flow waiting in `QuestionCoordinator::ask`.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use till_core::StationId;

use crate::errors::ApiError;
use crate::server::AppState;

/// Request body for the reply endpoint.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    /// The answering station.
    pub station_id: StationId,
    /// Opaque answer payload for the outstanding question.
    pub reply: serde_json::Value,
}

/// POST /reply
#[instrument(skip_all, fields(station = %body.station_id))]
pub async fn reply_handler(
    State(state): State<AppState>,
    Json(body): Json<ReplyRequest>,
) -> Result<StatusCode, ApiError> {
    state.coordinator.deliver(&body.station_id, body.reply)?;
    Ok(StatusCode::NO_CONTENT)
}

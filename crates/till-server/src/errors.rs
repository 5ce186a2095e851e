//! HTTP error mapping.
//!
//! Broker protocol violations surface as `409 Conflict`, unknown stations
//! as `404`, bad tokens as `401`. Once a stream response has begun, no
//! error ever crosses the stream boundary as an HTTP status — the status
//! line is already committed.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use till_broker::BrokerError;

use crate::auth::AuthError;

/// Error type returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The stream token was missing or unrecognized.
    #[error("invalid station token")]
    Unauthorized(#[from] AuthError),

    /// A broker operation failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

impl ApiError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Broker(err) => match err {
                BrokerError::UnknownStation(_) | BrokerError::StationOffline(_) => {
                    StatusCode::NOT_FOUND
                }
                err if err.is_protocol_violation() => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

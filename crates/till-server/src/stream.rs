//! `GET /stream` — the long-lived server-push endpoint.
//!
//! A station opens this once and holds it for the life of the connection.
//! The response is `text/event-stream`; each item on the station's
//! outbound queue becomes one `data: <json>\n\n` frame, and the first
//! frame is always the `{}` keepalive seeded at session establishment.
//! The response never completes on its own — it ends when the station
//! drops the connection, and the next reconnect starts a fresh session.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::Sse;
use axum::response::sse::Event;
use futures::Stream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, instrument};

use till_broker::StreamSession;

use crate::errors::ApiError;
use crate::server::AppState;

/// Query parameters for the stream endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Station token, resolved by the upstream authentication collaborator.
    #[serde(default)]
    pub token: String,
}

/// GET /stream?token=…
#[instrument(skip_all, fields(station))]
pub async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let station = state.resolver.resolve(&query.token).await?;
    let _ = tracing::Span::current().record("station", station.as_str());

    let session = StreamSession::establish(&state.registry, &*state.hook, station).await;
    info!(station = %session.station(), "stream response starting");

    let frames = session
        .into_frames()
        .map(|frame| Ok(Event::default().data(frame.sse_json())));
    Ok(Sse::new(frames))
}

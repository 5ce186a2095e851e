//! `TillServer` — axum HTTP server wiring the broker to its endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use till_broker::{PendingTransactionCheck, QuestionCoordinator, StationRegistry};

use crate::auth::StationResolver;
use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::reply::reply_handler;
use crate::shutdown::ShutdownCoordinator;
use crate::stream::stream_handler;

/// Shared state accessible from the axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Station channel registry.
    pub registry: Arc<StationRegistry>,
    /// Question/answer coordinator.
    pub coordinator: Arc<QuestionCoordinator>,
    /// Pending-transaction reconciliation hook.
    pub hook: Arc<dyn PendingTransactionCheck>,
    /// Token → station resolver.
    pub resolver: Arc<dyn StationResolver>,
    /// When the server started.
    pub start_time: Instant,
}

/// The tillstream HTTP server.
pub struct TillServer {
    config: ServerConfig,
    registry: Arc<StationRegistry>,
    coordinator: Arc<QuestionCoordinator>,
    hook: Arc<dyn PendingTransactionCheck>,
    resolver: Arc<dyn StationResolver>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl TillServer {
    /// Create a new server around a fresh registry and coordinator.
    pub fn new(
        config: ServerConfig,
        resolver: Arc<dyn StationResolver>,
        hook: Arc<dyn PendingTransactionCheck>,
    ) -> Self {
        let registry = Arc::new(StationRegistry::new());
        let coordinator = Arc::new(QuestionCoordinator::with_timeout(
            registry.clone(),
            config.answer_timeout(),
        ));
        Self {
            config,
            registry,
            coordinator,
            hook,
            resolver,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            coordinator: self.coordinator.clone(),
            hook: self.hook.clone(),
            resolver: self.resolver.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/stream", get(stream_handler))
            .route("/reply", post(reply_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// The station registry (push / broadcast entry point for callers).
    pub fn registry(&self) -> &Arc<StationRegistry> {
        &self.registry
    }

    /// The question coordinator (ask / deliver entry point for callers).
    pub fn coordinator(&self) -> &Arc<QuestionCoordinator> {
        &self.coordinator
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let resp = health::health_check(state.start_time, state.registry.stations_online());
    Json(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use till_broker::NoPendingTransactions;
    use tower::ServiceExt;

    use crate::auth::TrustedTokenResolver;

    fn make_server() -> TillServer {
        TillServer::new(
            ServerConfig::default(),
            Arc::new(TrustedTokenResolver),
            Arc::new(NoPendingTransactions),
        )
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["stations_online"], 0);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let server = make_server();
        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stream_without_token_is_unauthorized() {
        let server = make_server();
        let req = Request::builder()
            .uri("/stream")
            .body(Body::empty())
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reply_for_unknown_station_is_404() {
        let server = make_server();
        let req = Request::builder()
            .method("POST")
            .uri("/reply")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"station_id":"ghost","reply":{}}"#))
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reply_without_question_is_conflict() {
        let server = make_server();
        // Register the station directly so the slot exists
        let _rx = server.registry().register(&till_core::StationId::from("s1"));

        let req = Request::builder()
            .method("POST")
            .uri("/reply")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"station_id":"s1","reply":{"ok":true}}"#))
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn accessors() {
        let server = make_server();
        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.registry().stations_online(), 0);
        assert!(!server.shutdown().is_shutting_down());
        assert!(Arc::ptr_eq(server.coordinator().registry(), server.registry()));
    }
}

//! # till-server
//!
//! Axum HTTP layer for the tillstream broker:
//!
//! - `GET /stream` — long-lived `text/event-stream` push channel per station
//! - `POST /reply` — answer submission completing the question rendezvous
//! - `GET /health` — uptime and stations online
//!
//! Business logic in the same process talks to the broker directly through
//! [`TillServer::registry`] and [`TillServer::coordinator`]; the HTTP
//! surface exists for the stations themselves.
//!
//! [`TillServer::registry`]: server::TillServer::registry
//! [`TillServer::coordinator`]: server::TillServer::coordinator

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod health;
pub mod reply;
pub mod server;
pub mod shutdown;
pub mod stream;

pub use auth::{AuthError, StationResolver, StaticTokenResolver, TrustedTokenResolver};
pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, TillServer};
pub use shutdown::ShutdownCoordinator;

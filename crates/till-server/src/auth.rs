//! Station authentication seam.
//!
//! Authentication is owned upstream; the stream endpoint only needs a way
//! to turn the `token` query parameter into a [`StationId`]. The
//! [`StationResolver`] trait is that seam. Deployments plug in their real
//! resolver; tests and development use the implementations below.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use till_core::StationId;

/// Token resolution failure.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token does not map to any known station.
    #[error("unknown station token")]
    UnknownToken,
}

/// Resolves a stream token to the station it identifies.
#[async_trait]
pub trait StationResolver: Send + Sync {
    /// Resolve `token` to a station, or fail if it is not recognized.
    async fn resolve(&self, token: &str) -> Result<StationId, AuthError>;
}

/// Resolver backed by a fixed token → station map.
pub struct StaticTokenResolver {
    tokens: HashMap<String, StationId>,
}

impl StaticTokenResolver {
    /// Create a resolver from `(token, station)` pairs.
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = (String, StationId)>) -> Self {
        Self {
            tokens: pairs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl StationResolver for StaticTokenResolver {
    async fn resolve(&self, token: &str) -> Result<StationId, AuthError> {
        self.tokens.get(token).cloned().ok_or(AuthError::UnknownToken)
    }
}

/// Development resolver that treats the token itself as the station ID.
///
/// Only suitable behind a trusted network boundary.
pub struct TrustedTokenResolver;

#[async_trait]
impl StationResolver for TrustedTokenResolver {
    async fn resolve(&self, token: &str) -> Result<StationId, AuthError> {
        if token.is_empty() {
            return Err(AuthError::UnknownToken);
        }
        Ok(StationId::from(token))
    }
}

//! Pending-transaction reconciliation hook.
//!
//! When a station establishes a fresh stream, the session asks an external
//! collaborator whether a payment transaction was left pending across the
//! previous connection. The detection logic belongs to the payment
//! integration; the broker only consumes the verdicts.

use async_trait::async_trait;

use till_core::StationId;

/// One subscriber's verdict on whether a transaction was left pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriberReport {
    /// Name of the reporting subscriber, for logging.
    pub subscriber: String,
    /// `true` if a transaction was left open or cancelled mid-flight.
    pub left_pending: bool,
}

/// Collaborator queried once per newly established stream.
#[async_trait]
pub trait PendingTransactionCheck: Send + Sync {
    /// Report, per subscriber, whether a transaction was left pending for
    /// `station`.
    async fn check_pending(&self, station: &StationId) -> Vec<SubscriberReport>;
}

/// Hook implementation for deployments with no payment integration.
pub struct NoPendingTransactions;

#[async_trait]
impl PendingTransactionCheck for NoPendingTransactions {
    async fn check_pending(&self, _station: &StationId) -> Vec<SubscriberReport> {
        Vec::new()
    }
}

//! Stream session lifecycle.
//!
//! Created each time a station opens a streaming connection. Establishment
//! walks Opening → Reconciling → Streaming: register a fresh outbound
//! queue, recover any question orphaned by the previous connection, seed
//! the keepalive frame, run the pending-transaction check, then hand the
//! frame sequence to the transport. The session ends only when the remote
//! side drops the connection; registry entries stay behind for the next
//! reconnect.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

use till_core::{StationEvent, StationId, StreamFrame};

use crate::reconcile::PendingTransactionCheck;
use crate::registry::StationRegistry;

/// Operator warning pushed when the previous connection left a payment
/// transaction unfinished.
pub const PENDING_TRANSACTION_WARNING: &str =
    "Última transação TEF não foi efetuada. Favor reter o Cupom.";

/// One established push stream for a station.
pub struct StreamSession {
    station: StationId,
    frames: mpsc::UnboundedReceiver<StreamFrame>,
}

impl StreamSession {
    /// Establish a stream session for `station`.
    ///
    /// 1. Registers a fresh outbound queue (replacing any previous one).
    /// 2. If a question from the previous connection is still outstanding,
    ///    breaks it so the blocked payment flow can resume.
    /// 3. Seeds the keepalive frame so the client observes an established
    ///    connection.
    /// 4. Queries the pending-transaction hook exactly once; if any
    ///    subscriber reports a leftover transaction, pushes a warning
    ///    followed by a clear-sale event.
    pub async fn establish(
        registry: &Arc<StationRegistry>,
        hook: &dyn PendingTransactionCheck,
        station: StationId,
    ) -> Self {
        let frames = registry.register(&station);
        info!(station = %station, "established event stream");

        if let Some(slot) = registry.answer_slot(&station) {
            if slot.break_stale() {
                warn!(station = %station, "broke question orphaned by previous stream");
            }
        }

        // Seeding cannot fail: the queue we just registered is ours.
        let _ = registry.push_frame(&station, StreamFrame::Keepalive);

        let reports = hook.check_pending(&station).await;
        let left_pending = reports.iter().any(|r| r.left_pending);
        for report in &reports {
            info!(
                station = %station,
                subscriber = %report.subscriber,
                left_pending = report.left_pending,
                "pending-transaction check"
            );
        }
        if left_pending {
            let _ = registry.push(&station, StationEvent::warning_message(PENDING_TRANSACTION_WARNING));
            let _ = registry.push(&station, StationEvent::clear_sale());
        }

        Self { station, frames }
    }

    /// The station this session serves.
    #[must_use]
    pub fn station(&self) -> &StationId {
        &self.station
    }

    /// Pull the next frame, suspending while the queue is empty.
    ///
    /// Returns `None` once this session has been superseded by a reconnect
    /// and the replacement queue's sender is gone.
    pub async fn next_frame(&mut self) -> Option<StreamFrame> {
        self.frames.recv().await
    }

    /// Turn the session into an endless FIFO frame stream for the transport.
    #[must_use]
    pub fn into_frames(self) -> UnboundedReceiverStream<StreamFrame> {
        UnboundedReceiverStream::new(self.frames)
    }
}

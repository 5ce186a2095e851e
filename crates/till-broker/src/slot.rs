//! Single-slot answer rendezvous for the question/answer protocol.
//!
//! Each station owns exactly one [`AnswerSlot`], created lazily on first
//! stream registration and shared across every subsequent stream session
//! for that station. It holds at most one pending [`Reply`] plus the
//! "question outstanding" flag, both guarded by a single mutex so the
//! capacity-one invariant survives arbitrary task interleaving.

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::warn;

use till_core::StationId;

use crate::errors::BrokerError;

/// A station's reply to the most recent question.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// A business answer submitted by the station.
    Answer(serde_json::Value),
    /// Sentinel injected when a reconnect orphans the outstanding question.
    Broken,
}

#[derive(Debug, Default)]
struct SlotState {
    reply: Option<Reply>,
    waiting: bool,
}

/// Capacity-one answer slot with an outstanding-question flag.
#[derive(Debug)]
pub struct AnswerSlot {
    station: StationId,
    state: Mutex<SlotState>,
    notify: Notify,
}

impl AnswerSlot {
    /// Create an empty slot for `station`.
    #[must_use]
    pub fn new(station: StationId) -> Self {
        Self {
            station,
            state: Mutex::new(SlotState::default()),
            notify: Notify::new(),
        }
    }

    /// Mark a question as outstanding.
    ///
    /// Rejects a second concurrent question for the same station with
    /// [`BrokerError::QuestionPending`] — the slot invariant cannot hold
    /// two rendezvous at once.
    pub fn begin_question(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock();
        if state.waiting {
            return Err(BrokerError::QuestionPending(self.station.clone()));
        }
        if state.reply.take().is_some() {
            warn!(station = %self.station, "discarding stale reply left in answer slot");
        }
        state.waiting = true;
        Ok(())
    }

    /// Place a reply into the slot and wake the waiting asker.
    ///
    /// Protocol invariant: a question must be outstanding and the slot must
    /// be empty. Violations fail loudly rather than silently overwrite.
    pub fn deliver(&self, reply: Reply) -> Result<(), BrokerError> {
        let mut state = self.state.lock();
        if !state.waiting {
            return Err(BrokerError::UnsolicitedReply(self.station.clone()));
        }
        if state.reply.is_some() {
            return Err(BrokerError::ReplyAlreadyPending(self.station.clone()));
        }
        state.reply = Some(reply);
        drop(state);
        self.notify.notify_one();
        Ok(())
    }

    /// Wait until a reply is available and take it.
    ///
    /// This is the coordinator's only suspension point.
    pub async fn take(&self) -> Reply {
        loop {
            let notified = self.notify.notified();
            if let Some(reply) = self.state.lock().reply.take() {
                return reply;
            }
            notified.await;
        }
    }

    /// Clear the outstanding-question flag (initiator side, idempotent).
    pub fn clear_waiting(&self) {
        self.state.lock().waiting = false;
    }

    /// Reconnect reconciliation: unblock a question orphaned by a dead stream.
    ///
    /// If a question is outstanding and no reply has arrived, inject the
    /// [`Reply::Broken`] sentinel, clear the flag, and wake the waiter.
    /// If a real reply is already in the slot the waiter will consume it
    /// normally, so the slot is left untouched.
    ///
    /// Returns `true` if the sentinel was injected.
    pub fn break_stale(&self) -> bool {
        let mut state = self.state.lock();
        if !state.waiting || state.reply.is_some() {
            return false;
        }
        state.reply = Some(Reply::Broken);
        state.waiting = false;
        drop(state);
        self.notify.notify_one();
        true
    }

    /// Resolve a timed-out question.
    ///
    /// Clears the flag; if a reply raced the deadline it is returned so the
    /// caller can still honor it as answered.
    pub fn resolve_timeout(&self) -> Option<Reply> {
        let mut state = self.state.lock();
        state.waiting = false;
        state.reply.take()
    }

    /// Whether a question is currently outstanding.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.state.lock().waiting
    }

    /// Whether a reply is sitting in the slot.
    #[must_use]
    pub fn has_reply(&self) -> bool {
        self.state.lock().reply.is_some()
    }
}

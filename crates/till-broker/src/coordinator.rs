//! Synchronous question/answer protocol over the push stream.
//!
//! A payment flow calls [`QuestionCoordinator::ask`], which pushes a
//! `TEF_ASK_QUESTION` event down the station's stream and suspends until
//! the station's reply lands in the answer slot. The inbound reply
//! endpoint calls [`QuestionCoordinator::deliver`] to complete the
//! rendezvous. At most one question may be outstanding per station.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use till_core::{StationEvent, StationId};

use crate::errors::BrokerError;
use crate::registry::StationRegistry;
use crate::slot::Reply;

/// Default time to wait for a station to answer a question.
pub const DEFAULT_ANSWER_TIMEOUT: Duration = Duration::from_secs(300);

/// Coordinates the blocking question/answer protocol per station.
pub struct QuestionCoordinator {
    registry: Arc<StationRegistry>,
    answer_timeout: Duration,
}

impl QuestionCoordinator {
    /// Create a coordinator with the default answer timeout.
    #[must_use]
    pub fn new(registry: Arc<StationRegistry>) -> Self {
        Self::with_timeout(registry, DEFAULT_ANSWER_TIMEOUT)
    }

    /// Create a coordinator with a custom answer timeout.
    #[must_use]
    pub fn with_timeout(registry: Arc<StationRegistry>, answer_timeout: Duration) -> Self {
        Self {
            registry,
            answer_timeout,
        }
    }

    /// Ask `station` a question and wait for its answer.
    ///
    /// Outcomes:
    /// - `Ok(value)` — the station answered
    /// - [`BrokerError::QuestionInterrupted`] — the station reconnected
    ///   mid-question and the rendezvous was broken; the business
    ///   operation has unknown outcome
    /// - [`BrokerError::AnswerTimeout`] — no answer within the configured
    ///   timeout; a reply racing the deadline is still honored
    /// - [`BrokerError::QuestionPending`] — a question is already
    ///   outstanding for this station
    /// - [`BrokerError::StationOffline`] — the question could not be
    ///   pushed; nothing is left outstanding
    pub async fn ask(
        &self,
        station: &StationId,
        question: serde_json::Value,
    ) -> Result<serde_json::Value, BrokerError> {
        let slot = self
            .registry
            .answer_slot(station)
            .ok_or_else(|| BrokerError::UnknownStation(station.clone()))?;

        // The flag goes up before the event goes out: under preemptive
        // scheduling the reply can arrive before this task reaches the slot.
        slot.begin_question()?;
        info!(station = %station, "asking station a question");

        if let Err(err) = self
            .registry
            .push(station, StationEvent::ask_question(question))
        {
            slot.clear_waiting();
            return Err(err);
        }

        match tokio::time::timeout(self.answer_timeout, slot.take()).await {
            Ok(Reply::Answer(value)) => {
                slot.clear_waiting();
                info!(station = %station, "got station reply");
                Ok(value)
            }
            Ok(Reply::Broken) => {
                slot.clear_waiting();
                warn!(station = %station, "question interrupted by reconnect");
                Err(BrokerError::QuestionInterrupted(station.clone()))
            }
            Err(_) => match slot.resolve_timeout() {
                Some(Reply::Answer(value)) => {
                    info!(station = %station, "reply raced the deadline, honoring it");
                    Ok(value)
                }
                Some(Reply::Broken) => {
                    Err(BrokerError::QuestionInterrupted(station.clone()))
                }
                None => {
                    warn!(station = %station, timeout = ?self.answer_timeout, "question timed out");
                    Err(BrokerError::AnswerTimeout(station.clone()))
                }
            },
        }
    }

    /// Deliver a station's reply, unblocking the waiting [`ask`] call.
    ///
    /// Fails loudly on protocol violations: an unknown station, a reply
    /// with no outstanding question, or a reply while one is already
    /// pending.
    ///
    /// [`ask`]: QuestionCoordinator::ask
    pub fn deliver(
        &self,
        station: &StationId,
        reply: serde_json::Value,
    ) -> Result<(), BrokerError> {
        let slot = self
            .registry
            .answer_slot(station)
            .ok_or_else(|| BrokerError::UnknownStation(station.clone()))?;
        info!(station = %station, "delivering station reply");
        slot.deliver(Reply::Answer(reply))
    }

    /// The registry this coordinator operates on.
    #[must_use]
    pub fn registry(&self) -> &Arc<StationRegistry> {
        &self.registry
    }
}

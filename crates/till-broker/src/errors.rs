//! Broker error taxonomy.
//!
//! Protocol violations (duplicate reply, unsolicited reply, concurrent
//! questions, pushes to offline stations) fail the offending call loudly —
//! they indicate a coordination bug upstream. [`BrokerError::QuestionInterrupted`]
//! is different: it is the recovered outcome of a question orphaned by a
//! station reconnect, and callers must treat the business operation as
//! aborted with unknown outcome.

use thiserror::Error;
use till_core::StationId;

/// Errors surfaced by the station registry and question coordinator.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// No stream is currently connected for the station.
    #[error("station {0} has no connected stream")]
    StationOffline(StationId),

    /// The station has never opened a stream, so no answer slot exists.
    #[error("station {0} is unknown to the registry")]
    UnknownStation(StationId),

    /// A reply arrived with no outstanding question for the station.
    #[error("unsolicited reply for station {0}: no question is outstanding")]
    UnsolicitedReply(StationId),

    /// A reply arrived while a previous one was still unconsumed.
    #[error("duplicate reply for station {0}: the answer slot is already occupied")]
    ReplyAlreadyPending(StationId),

    /// A question was asked while another is still outstanding.
    #[error("a question is already outstanding for station {0}")]
    QuestionPending(StationId),

    /// The outstanding question was aborted by a station reconnect.
    #[error("question for station {0} was interrupted by a reconnect")]
    QuestionInterrupted(StationId),

    /// The station did not answer within the configured timeout.
    #[error("question for station {0} timed out")]
    AnswerTimeout(StationId),
}

impl BrokerError {
    /// Whether this error indicates a protocol bug in a collaborator,
    /// as opposed to an expected runtime outcome (interrupt, timeout).
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::UnsolicitedReply(_) | Self::ReplyAlreadyPending(_) | Self::QuestionPending(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_station() {
        let err = BrokerError::StationOffline(StationId::from("till-07"));
        assert!(err.to_string().contains("till-07"));
    }

    #[test]
    fn violation_classification() {
        let station = StationId::from("s");
        assert!(BrokerError::UnsolicitedReply(station.clone()).is_protocol_violation());
        assert!(BrokerError::ReplyAlreadyPending(station.clone()).is_protocol_violation());
        assert!(BrokerError::QuestionPending(station.clone()).is_protocol_violation());
        assert!(!BrokerError::QuestionInterrupted(station.clone()).is_protocol_violation());
        assert!(!BrokerError::AnswerTimeout(station.clone()).is_protocol_violation());
        assert!(!BrokerError::StationOffline(station).is_protocol_violation());
    }
}

//! Wire events carried on a station's push stream.
//!
//! A [`StationEvent`] is a JSON object with a `type` discriminant plus
//! arbitrary extra fields. The broker treats the payload as opaque; the
//! constructors below cover the payment-flow events the server itself
//! emits (ask-question, warning, clear-sale).
//!
//! A [`StreamFrame`] is one item on a station's outbound queue: either a
//! real event or the synthetic keepalive (`{}`) that seeds every new
//! stream so the client observes an established connection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire type for a question pushed down the stream by a payment flow.
pub const ASK_QUESTION: &str = "TEF_ASK_QUESTION";
/// Wire type for an operator-facing warning message.
pub const WARNING_MESSAGE: &str = "TEF_WARNING_MESSAGE";
/// Wire type instructing the station to discard the current sale.
pub const CLEAR_SALE: &str = "CLEAR_SALE";

/// A tagged event destined for a station's UI.
///
/// Serializes as `{"type": <event_type>, ...fields}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationEvent {
    /// Event discriminant, e.g. `TEF_ASK_QUESTION`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Remaining payload fields, flattened into the event object.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StationEvent {
    /// Create an event with no extra fields.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    /// Add a payload field (builder style).
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let _ = self.fields.insert(key.into(), value);
        self
    }

    /// A `TEF_ASK_QUESTION` event carrying the question payload.
    #[must_use]
    pub fn ask_question(question: Value) -> Self {
        Self::new(ASK_QUESTION).with_field("data", question)
    }

    /// A `TEF_WARNING_MESSAGE` event carrying an operator-facing message.
    #[must_use]
    pub fn warning_message(message: impl Into<String>) -> Self {
        Self::new(WARNING_MESSAGE).with_field("message", Value::String(message.into()))
    }

    /// A `CLEAR_SALE` event instructing the station to discard the sale.
    #[must_use]
    pub fn clear_sale() -> Self {
        Self::new(CLEAR_SALE)
    }
}

/// One item on a station's outbound queue.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamFrame {
    /// Synthetic empty event seeded into every new stream.
    Keepalive,
    /// A real event for the station's UI.
    Event(StationEvent),
}

impl StreamFrame {
    /// Serialize this frame's payload for the `data:` field of an SSE frame.
    ///
    /// The keepalive serializes as `{}`, matching what clients expect from
    /// the initial frame of a freshly established stream.
    #[must_use]
    pub fn sse_json(&self) -> String {
        match self {
            Self::Keepalive => "{}".to_owned(),
            Self::Event(event) => serde_json::to_string(event).unwrap_or_else(|e| {
                tracing::error!(error = %e, event_type = %event.event_type, "failed to serialize event");
                "{}".to_owned()
            }),
        }
    }

    /// The event type, if this frame carries an event.
    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        match self {
            Self::Keepalive => None,
            Self::Event(event) => Some(&event.event_type),
        }
    }
}

impl From<StationEvent> for StreamFrame {
    fn from(event: StationEvent) -> Self {
        Self::Event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ask_question_wire_format() {
        let event = StationEvent::ask_question(json!({"type": "CONFIRM"}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "TEF_ASK_QUESTION");
        assert_eq!(value["data"]["type"], "CONFIRM");
    }

    #[test]
    fn warning_message_wire_format() {
        let event = StationEvent::warning_message("check the printer");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "TEF_WARNING_MESSAGE");
        assert_eq!(value["message"], "check the printer");
    }

    #[test]
    fn clear_sale_has_only_type() {
        let event = StationEvent::clear_sale();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"type": "CLEAR_SALE"}));
    }

    #[test]
    fn extra_fields_are_flattened() {
        let event = StationEvent::new("PRINT_RECEIPT")
            .with_field("copies", json!(2))
            .with_field("fiscal", json!(true));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "PRINT_RECEIPT");
        assert_eq!(value["copies"], 2);
        assert_eq!(value["fiscal"], true);
    }

    #[test]
    fn event_deserializes_from_wire() {
        let event: StationEvent =
            serde_json::from_str(r#"{"type":"CLEAR_SALE","reason":"timeout"}"#).unwrap();
        assert_eq!(event.event_type, "CLEAR_SALE");
        assert_eq!(event.fields["reason"], "timeout");
    }

    #[test]
    fn keepalive_serializes_as_empty_object() {
        assert_eq!(StreamFrame::Keepalive.sse_json(), "{}");
    }

    #[test]
    fn event_frame_serializes_event() {
        let frame = StreamFrame::from(StationEvent::clear_sale());
        let parsed: Value = serde_json::from_str(&frame.sse_json()).unwrap();
        assert_eq!(parsed["type"], "CLEAR_SALE");
    }

    #[test]
    fn frame_event_type() {
        assert_eq!(StreamFrame::Keepalive.event_type(), None);
        let frame = StreamFrame::from(StationEvent::clear_sale());
        assert_eq!(frame.event_type(), Some("CLEAR_SALE"));
    }
}

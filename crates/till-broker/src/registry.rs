//! Per-station channel registry.
//!
//! Process-wide (but explicitly constructed and injectable) mapping from
//! station identity to its current outbound queue and its shared
//! [`AnswerSlot`]. Entries are created lazily on first registration and
//! live for the life of the registry; only the outbound queue is replaced
//! when a station reconnects.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use till_core::{StationEvent, StationId, StreamFrame};

use crate::errors::BrokerError;
use crate::slot::AnswerSlot;

struct StationEntry {
    /// Sender half of the current outbound queue. Replaced on reconnect;
    /// a superseded session's receiver simply stops getting frames.
    sender: mpsc::UnboundedSender<StreamFrame>,
    /// Answer rendezvous, shared across reconnects.
    slot: Arc<AnswerSlot>,
}

/// Registry of connected stations and their outbound queues.
pub struct StationRegistry {
    stations: Mutex<HashMap<StationId, StationEntry>>,
}

impl StationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stations: Mutex::new(HashMap::new()),
        }
    }

    /// Install a fresh outbound queue for `station` and return its receiver.
    ///
    /// The answer slot is created on first registration and never replaced,
    /// so a question outstanding across a reconnect still has its
    /// rendezvous point.
    pub fn register(&self, station: &StationId) -> mpsc::UnboundedReceiver<StreamFrame> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut stations = self.stations.lock();
        match stations.get_mut(station) {
            Some(entry) => {
                debug!(station = %station, "replacing outbound queue on reconnect");
                entry.sender = tx;
            }
            None => {
                debug!(station = %station, "registering new station");
                let _ = stations.insert(
                    station.clone(),
                    StationEntry {
                        sender: tx,
                        slot: Arc::new(AnswerSlot::new(station.clone())),
                    },
                );
            }
        }
        rx
    }

    /// Append an event to `station`'s current outbound queue.
    ///
    /// A push to an offline station is a failure for this call only, never
    /// a crash: the caller gets [`BrokerError::StationOffline`] and decides
    /// what to do with it.
    pub fn push(&self, station: &StationId, event: StationEvent) -> Result<(), BrokerError> {
        self.push_frame(station, StreamFrame::Event(event))
    }

    /// Append a raw frame to `station`'s current outbound queue.
    pub fn push_frame(&self, station: &StationId, frame: StreamFrame) -> Result<(), BrokerError> {
        let stations = self.stations.lock();
        let Some(entry) = stations.get(station) else {
            warn!(station = %station, "push to unknown station");
            return Err(BrokerError::StationOffline(station.clone()));
        };
        if entry.sender.send(frame).is_err() {
            warn!(station = %station, "push to disconnected station");
            return Err(BrokerError::StationOffline(station.clone()));
        }
        Ok(())
    }

    /// Append `event` to every currently connected station's queue.
    ///
    /// Stations whose stream has gone away are skipped. Returns the number
    /// of queues the event actually reached.
    pub fn broadcast(&self, event: &StationEvent) -> usize {
        let stations = self.stations.lock();
        let mut recipients = 0;
        for (station, entry) in stations.iter() {
            if entry
                .sender
                .send(StreamFrame::Event(event.clone()))
                .is_ok()
            {
                recipients += 1;
            } else {
                debug!(station = %station, "skipping disconnected station in broadcast");
            }
        }
        debug!(event_type = %event.event_type, recipients, "broadcast event");
        recipients
    }

    /// The answer slot for `station`, if it has ever registered.
    #[must_use]
    pub fn answer_slot(&self, station: &StationId) -> Option<Arc<AnswerSlot>> {
        self.stations.lock().get(station).map(|e| e.slot.clone())
    }

    /// Number of stations whose current queue still has a live consumer.
    #[must_use]
    pub fn stations_online(&self) -> usize {
        self.stations
            .lock()
            .values()
            .filter(|e| !e.sender.is_closed())
            .count()
    }
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn station(name: &str) -> StationId {
        StationId::from(name)
    }

    #[tokio::test]
    async fn push_after_register_delivers_in_order() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let mut rx = registry.register(&s1);

        registry.push(&s1, StationEvent::clear_sale()).unwrap();
        registry
            .push(&s1, StationEvent::warning_message("paper low"))
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event_type(), Some("CLEAR_SALE"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.event_type(), Some("TEF_WARNING_MESSAGE"));
    }

    #[test]
    fn push_to_unknown_station_fails() {
        let registry = StationRegistry::new();
        let result = registry.push(&station("ghost"), StationEvent::clear_sale());
        assert_matches!(result, Err(BrokerError::StationOffline(_)));
    }

    #[test]
    fn push_to_disconnected_station_fails() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let rx = registry.register(&s1);
        drop(rx);
        let result = registry.push(&s1, StationEvent::clear_sale());
        assert_matches!(result, Err(BrokerError::StationOffline(_)));
    }

    #[tokio::test]
    async fn reregister_replaces_queue() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let mut old_rx = registry.register(&s1);
        let mut new_rx = registry.register(&s1);

        registry.push(&s1, StationEvent::clear_sale()).unwrap();

        // Only the current queue receives further pushes
        assert!(new_rx.recv().await.is_some());
        assert!(old_rx.try_recv().is_err());
    }

    #[test]
    fn answer_slot_survives_reregister() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let _rx = registry.register(&s1);
        let slot_before = registry.answer_slot(&s1).unwrap();
        let _rx2 = registry.register(&s1);
        let slot_after = registry.answer_slot(&s1).unwrap();
        assert!(Arc::ptr_eq(&slot_before, &slot_after));
    }

    #[test]
    fn answer_slot_absent_for_unknown_station() {
        let registry = StationRegistry::new();
        assert!(registry.answer_slot(&station("ghost")).is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_all_registered() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let s2 = station("s2");
        let mut rx1 = registry.register(&s1);
        let mut rx2 = registry.register(&s2);

        let event = StationEvent::warning_message("closing soon");
        assert_eq!(registry.broadcast(&event), 2);

        assert_eq!(rx1.recv().await.unwrap().event_type(), Some("TEF_WARNING_MESSAGE"));
        assert_eq!(rx2.recv().await.unwrap().event_type(), Some("TEF_WARNING_MESSAGE"));
    }

    #[tokio::test]
    async fn broadcast_misses_late_registration() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let mut rx1 = registry.register(&s1);

        assert_eq!(registry.broadcast(&StationEvent::clear_sale()), 1);

        // A station registered only afterward receives nothing
        let s2 = station("s2");
        let mut rx2 = registry.register(&s2);
        assert!(rx1.recv().await.is_some());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn broadcast_skips_disconnected() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let s2 = station("s2");
        let rx1 = registry.register(&s1);
        let _rx2 = registry.register(&s2);
        drop(rx1);

        assert_eq!(registry.broadcast(&StationEvent::clear_sale()), 1);
    }

    #[test]
    fn stations_online_counts_live_consumers() {
        let registry = StationRegistry::new();
        assert_eq!(registry.stations_online(), 0);

        let s1 = station("s1");
        let s2 = station("s2");
        let _rx1 = registry.register(&s1);
        let rx2 = registry.register(&s2);
        assert_eq!(registry.stations_online(), 2);

        drop(rx2);
        assert_eq!(registry.stations_online(), 1);
    }

    #[test]
    fn push_arbitrary_business_event() {
        let registry = StationRegistry::new();
        let s1 = station("s1");
        let mut rx = registry.register(&s1);
        let event = StationEvent::new("SALE_CREATED").with_field("sale_id", json!(42));
        registry.push(&s1, event).unwrap();
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.event_type(), Some("SALE_CREATED"));
    }
}

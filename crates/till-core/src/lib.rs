//! # till-core
//!
//! Foundation types shared across the tillstream workspace:
//!
//! - [`StationId`]: branded identifier for a physical point-of-sale station
//! - [`StationEvent`] / [`StreamFrame`]: the JSON payloads carried on a
//!   station's server-push stream
//! - [`logging`]: `tracing` subscriber bootstrap for binaries

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod logging;

pub use events::{StationEvent, StreamFrame};
pub use ids::StationId;

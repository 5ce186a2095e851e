//! # till-broker
//!
//! The server-to-station event-streaming broker:
//!
//! - [`StationRegistry`]: per-station outbound queues plus the shared
//!   answer slot for each station
//! - [`StreamSession`]: lifecycle of one established push connection,
//!   including reconnect reconciliation
//! - [`QuestionCoordinator`]: synchronous ask-and-wait protocol used by
//!   payment flows, with timeout and reconnect recovery
//! - [`PendingTransactionCheck`]: hook consulted once per new stream
//!
//! Concurrency: the registry maps and each answer slot's reply/flag pair
//! are mutex-guarded and never held across an await. The only suspension
//! points are the session's frame pull and the coordinator's answer wait.

#![deny(unsafe_code)]

pub mod coordinator;
pub mod errors;
pub mod reconcile;
pub mod registry;
pub mod session;
pub mod slot;

pub use coordinator::{DEFAULT_ANSWER_TIMEOUT, QuestionCoordinator};
pub use errors::BrokerError;
pub use reconcile::{NoPendingTransactions, PendingTransactionCheck, SubscriberReport};
pub use registry::StationRegistry;
pub use session::{PENDING_TRANSACTION_WARNING, StreamSession};
pub use slot::{AnswerSlot, Reply};

//! Event Store Module
//!
//! This module provides the in-memory event log and its read modes:
//! - `AppendLog`: ordered, append-only backing sequence
//! - `LiveBroadcaster`: per-subscriber fan-out of new events
//! - `MemoryEventStore`: façade combining both behind one lock
//! - `EventStoreStats`: point-in-time counters
//!
//! # Architecture
//!
//! ```text
//! Write Path (one write-locked step):
//! ┌────────┐    ┌──────────────────┐    ┌───────────────────────┐
//! │ append │───►│ AppendLog::append│───►│ LiveBroadcaster::     │
//! │ (event)│    │ (push to Vec)    │    │ publish (fan-out)     │
//! └────────┘    └──────────────────┘    └───────────────────────┘
//!
//! Combined Read (cut under a read lock, then lock-free delivery):
//! ┌──────────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │ snapshot() +     │───►│ yield backlog│───►│ yield live queue │───► ...
//! │ subscribe()      │    │ (replay)     │    │ (unbounded mpsc) │
//! └──────────────────┘    └──────────────┘    └──────────────────┘
//! ```

mod broadcaster;
mod log;
mod stats;
mod store;
mod subscription;

pub use broadcaster::{LiveBroadcaster, SubscriberId};
pub use log::AppendLog;
pub use stats::EventStoreStats;
pub use store::{
    EventStore, EventStoreConfig, MemoryEventStore, ENV_INITIAL_CAPACITY, ENV_STORE_NAME,
};
pub use subscription::{EventStream, Subscription, TryRecvError};

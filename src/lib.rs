//! Memory Event Store
//!
//! An in-memory, append-only event log with three ways to read it:
//!
//! - **Replay**: point-in-time copies of everything stored, optionally
//!   filtered by time, type or id
//! - **Live**: a subscription to events appended from now on
//! - **Combined**: replay followed seamlessly by live delivery, with every
//!   event seen exactly once
//!
//! # Modules
//!
//! - `types`: The immutable `Event` value and predicate factories
//! - `event_store`: Append log, live broadcaster and the store façade
//! - `utils`: Timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use memory_event_store::{Event, EventData, EventStore, EventType, MemoryEventStore};
//!
//! let store = MemoryEventStore::new();
//! let opened = EventType::new("account_opened").unwrap();
//! store.append(Event::now(opened.clone(), EventData::empty()));
//!
//! let mut stream = store.get_all_events();
//! store.append(Event::now(opened, EventData::empty()));
//!
//! // First the replayed event, then the live one
//! let first = stream.blocking_next().unwrap();
//! let second = stream.blocking_next().unwrap();
//! assert_ne!(first.id(), second.id());
//! ```

pub mod event_store;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use event_store::{
    AppendLog, EventStore, EventStoreConfig, EventStoreStats, EventStream, LiveBroadcaster,
    MemoryEventStore, SubscriberId, Subscription, TryRecvError,
};
pub use types::{Event, EventData, EventError, EventId, EventResult, EventType, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

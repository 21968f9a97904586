//! Event Store - the public façade over the append log and live broadcaster
//!
//! `MemoryEventStore` owns one [`AppendLog`] and one [`LiveBroadcaster`] and
//! serializes the two operations that must never interleave:
//!
//! - **append**: push onto the log and publish to subscribers
//! - **cut**: snapshot the log and register a live subscription
//!
//! Both run under the same `RwLock` (append under the write guard, cut under a
//! read guard), so every appended event is either in a combined reader's
//! snapshot or on its live channel, never both and never neither.

use std::env;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::broadcaster::LiveBroadcaster;
use super::log::AppendLog;
use super::stats::EventStoreStats;
use super::subscription::{EventStream, Subscription};
use crate::types::{created_at_or_after, has_id, is_of_type, Event, EventId, EventType, Timestamp};

/// Environment variable overriding the store name
pub const ENV_STORE_NAME: &str = "EVENT_STORE_NAME";

/// Environment variable overriding the initial log capacity
pub const ENV_INITIAL_CAPACITY: &str = "EVENT_STORE_INITIAL_CAPACITY";

/// Configuration for the MemoryEventStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStoreConfig {
    /// Name used to tell stores apart in logs
    pub name: String,
    /// Number of events the log reserves room for up front
    pub initial_capacity: usize,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            name: "memory".to_string(),
            initial_capacity: 1024,
        }
    }
}

impl EventStoreConfig {
    /// Create config with a custom store name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Build config from `EVENT_STORE_NAME` / `EVENT_STORE_INITIAL_CAPACITY`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup
    ///
    /// Missing, blank or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let name = lookup(ENV_STORE_NAME)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.name);

        let initial_capacity = lookup(ENV_INITIAL_CAPACITY)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.initial_capacity);

        Self {
            name,
            initial_capacity,
        }
    }
}

/// Read/write interface of an event store
///
/// `get_*` queries return point-in-time copies. `get_events` and
/// `get_all_events*` return unbounded, non-terminating sequences.
pub trait EventStore: Send + Sync {
    /// Append an event, recording and publishing it as one atomic step
    fn append(&self, event: Event);

    /// Live feed of events appended from now on, no backlog
    fn get_events(&self) -> Subscription;

    /// Every stored event followed by every event appended later
    fn get_all_events(&self) -> EventStream;

    /// Like [`get_all_events`](Self::get_all_events), keeping only events
    /// with `timestamp >= from`
    fn get_all_events_from(&self, from: Timestamp) -> EventStream {
        self.get_all_events().with_filter(created_at_or_after(from))
    }

    /// Snapshot of every stored event, in append order
    fn get_all(&self) -> Vec<Event>;

    /// Stored events with `timestamp >= from`, in append order
    fn get_from(&self, from: Timestamp) -> Vec<Event>;

    /// Stored event with the given id
    fn get_by_id(&self, id: EventId) -> Option<Event>;

    /// Stored events of the given type, in append order
    fn get_by_type(&self, event_type: &EventType) -> Vec<Event> {
        self.get_all()
            .into_iter()
            .filter(is_of_type(event_type.clone()))
            .collect()
    }
}

/// In-memory event store
pub struct MemoryEventStore {
    config: EventStoreConfig,
    log: RwLock<AppendLog>,
    broadcaster: LiveBroadcaster,
}

impl MemoryEventStore {
    /// Create a new store with default config
    pub fn new() -> Self {
        Self::with_config(EventStoreConfig::default())
    }

    /// Create a new store with custom config
    pub fn with_config(config: EventStoreConfig) -> Self {
        info!(
            store = %config.name,
            initial_capacity = config.initial_capacity,
            "MemoryEventStore: created"
        );
        Self {
            log: RwLock::new(AppendLog::with_capacity(config.initial_capacity)),
            broadcaster: LiveBroadcaster::new(),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }

    /// Number of registered live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    /// Point-in-time statistics over the log
    pub fn stats(&self) -> EventStoreStats {
        let log = self.log.read();
        EventStoreStats::collect(log.iter(), self.broadcaster.subscriber_count())
    }

    /// Snapshot the log and register a live subscription at one cut point
    fn cut(&self) -> (Vec<Event>, Subscription) {
        // The read guard excludes `append`, so no event can land between the
        // snapshot and the registration.
        let log = self.log.read();
        let backlog = log.snapshot();
        let live = self.broadcaster.subscribe();
        drop(log);

        debug!(
            store = %self.config.name,
            subscriber_id = live.id(),
            backlog = backlog.len(),
            "MemoryEventStore: combined read cut"
        );
        (backlog, live)
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore for MemoryEventStore {
    fn append(&self, event: Event) {
        let mut log = self.log.write();
        log.append(event.clone());
        let delivered = self.broadcaster.publish(&event);
        drop(log);

        debug!(
            store = %self.config.name,
            event_id = %event.id(),
            event_type = %event.event_type(),
            delivered,
            "MemoryEventStore::append"
        );
    }

    fn get_events(&self) -> Subscription {
        self.broadcaster.subscribe()
    }

    fn get_all_events(&self) -> EventStream {
        let (backlog, live) = self.cut();
        EventStream::new(backlog, live)
    }

    fn get_all(&self) -> Vec<Event> {
        self.log.read().snapshot()
    }

    fn get_from(&self, from: Timestamp) -> Vec<Event> {
        self.log.read().filter(created_at_or_after(from))
    }

    fn get_by_id(&self, id: EventId) -> Option<Event> {
        self.log.read().find(has_id(id))
    }

    fn get_by_type(&self, event_type: &EventType) -> Vec<Event> {
        self.log.read().filter(is_of_type(event_type.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::TryRecvError;
    use crate::types::EventData;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn event_at(secs: i64, kind: &str) -> Event {
        Event::new(
            at(secs),
            EventType::new(kind).unwrap(),
            EventData::new(json!({ "at": secs })).unwrap(),
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = EventStoreConfig::default();
        assert_eq!(config.name, "memory");
        assert_eq!(config.initial_capacity, 1024);

        let custom = EventStoreConfig::new("orders").with_initial_capacity(8);
        assert_eq!(custom.name, "orders");
        assert_eq!(custom.initial_capacity, 8);
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_STORE_NAME, " billing "),
            (ENV_INITIAL_CAPACITY, "64"),
        ]
        .into_iter()
        .collect();
        let config = EventStoreConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config, EventStoreConfig::new("billing").with_initial_capacity(64));

        let broken: HashMap<&str, &str> =
            [(ENV_STORE_NAME, "  "), (ENV_INITIAL_CAPACITY, "lots")].into_iter().collect();
        let config = EventStoreConfig::from_lookup(|k| broken.get(k).map(|v| v.to_string()));
        assert_eq!(config, EventStoreConfig::default());

        assert_eq!(EventStoreConfig::from_lookup(|_| None), EventStoreConfig::default());
    }

    #[test]
    fn test_append_and_query() {
        let store = MemoryEventStore::with_config(EventStoreConfig::new("test"));
        let a = event_at(10, "a");
        let b = event_at(20, "b");
        let c = event_at(5, "a");
        store.append(a.clone());
        store.append(b.clone());
        store.append(c.clone());

        assert_eq!(store.len(), 3);
        assert_eq!(store.get_all(), vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(store.get_from(at(10)), vec![a.clone(), b]);
        assert_eq!(store.get_by_id(c.id()), Some(c.clone()));
        assert_eq!(store.get_by_id(EventId::new()), None);
        assert_eq!(store.get_by_type(&EventType::new("a").unwrap()), vec![a, c]);
    }

    #[test]
    fn test_live_feed_has_no_backlog() {
        let store = MemoryEventStore::new();
        store.append(event_at(1, "old"));

        let mut live = store.get_events();
        assert_eq!(live.try_recv(), Err(TryRecvError::Empty));

        let fresh = event_at(2, "new");
        store.append(fresh.clone());
        assert_eq!(live.try_recv(), Ok(fresh));
    }

    #[test]
    fn test_combined_read_stitches_backlog_and_live() {
        let store = MemoryEventStore::new();
        let a = event_at(1, "a");
        store.append(a.clone());

        let mut stream = store.get_all_events();
        assert_eq!(stream.backlog_len(), 1);

        let b = event_at(2, "b");
        store.append(b.clone());

        assert_eq!(stream.try_next(), Ok(a));
        assert_eq!(stream.try_next(), Ok(b));
        assert_eq!(stream.try_next(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_combined_read_from_filters_both_phases() {
        let store = MemoryEventStore::new();
        let early = event_at(5, "x");
        let late = event_at(15, "x");
        store.append(early);
        store.append(late.clone());

        let mut stream = store.get_all_events_from(at(10));
        let live_early = event_at(1, "x");
        let live_late = event_at(30, "x");
        store.append(live_early);
        store.append(live_late.clone());

        assert_eq!(stream.try_next(), Ok(late));
        assert_eq!(stream.try_next(), Ok(live_late));
        assert_eq!(stream.try_next(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_subscriber_count_tracks_handles() {
        let store = MemoryEventStore::new();
        let live = store.get_events();
        let stream = store.get_all_events();
        assert_eq!(store.subscriber_count(), 2);

        live.unsubscribe();
        assert_eq!(store.subscriber_count(), 1);
        stream.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_stats() {
        let store = MemoryEventStore::new();
        store.append(event_at(30, "a"));
        store.append(event_at(10, "b"));
        store.append(event_at(20, "a"));
        let _live = store.get_events();

        let stats = store.stats();
        assert_eq!(stats.event_count, 3);
        assert_eq!(stats.subscriber_count, 1);
        assert_eq!(stats.count_for(&EventType::new("a").unwrap()), 2);
        assert_eq!(stats.earliest_timestamp, Some(at(10)));
        assert_eq!(stats.latest_timestamp, Some(at(30)));
    }
}

//! Event Store Statistics
//!
//! Point-in-time counters over the log:
//! - Event counts, overall and by type
//! - Earliest / latest event time
//! - Live subscriber count

use std::collections::HashMap;

use crate::types::{Event, EventType, Timestamp};

/// Statistics about a MemoryEventStore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStoreStats {
    /// Total number of stored events
    pub event_count: usize,
    /// Registered live subscribers (plain and combined)
    pub subscriber_count: usize,
    /// Events by type
    pub events_by_type: HashMap<EventType, usize>,
    /// Smallest event timestamp, not necessarily the first appended
    pub earliest_timestamp: Option<Timestamp>,
    /// Largest event timestamp
    pub latest_timestamp: Option<Timestamp>,
}

impl EventStoreStats {
    /// Gather statistics from a sequence of events
    pub fn collect<'a, I>(events: I, subscriber_count: usize) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut stats = Self {
            subscriber_count,
            ..Default::default()
        };

        for event in events {
            stats.event_count += 1;
            *stats
                .events_by_type
                .entry(event.event_type().clone())
                .or_insert(0) += 1;

            let ts = event.timestamp();
            stats.earliest_timestamp = Some(stats.earliest_timestamp.map_or(ts, |t| t.min(ts)));
            stats.latest_timestamp = Some(stats.latest_timestamp.map_or(ts, |t| t.max(ts)));
        }

        stats
    }

    /// Number of stored events of the given type
    pub fn count_for(&self, event_type: &EventType) -> usize {
        self.events_by_type.get(event_type).copied().unwrap_or(0)
    }

    /// Number of distinct event types
    pub fn type_count(&self) -> usize {
        self.events_by_type.len()
    }
}

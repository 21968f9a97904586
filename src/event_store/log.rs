//! Append Log - the ordered backing sequence of all stored events
//!
//! The log is a plain append-only `Vec`. It carries no locking of its own:
//! [`MemoryEventStore`](super::MemoryEventStore) wraps it in a lock so that a
//! snapshot always reflects the log at a single instant.

use crate::types::Event;

/// Ordered, append-only sequence of events
#[derive(Debug, Clone, Default)]
pub struct AppendLog {
    events: Vec<Event>,
}

impl AppendLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log with room for `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Add an event to the end of the log
    ///
    /// Ids are not checked for uniqueness.
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Copy of every event appended so far, in append order
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// First event matching `predicate`, in append order
    pub fn find<P>(&self, predicate: P) -> Option<Event>
    where
        P: Fn(&Event) -> bool,
    {
        self.events.iter().find(|e| predicate(e)).cloned()
    }

    /// Every event matching `predicate`, in append order
    pub fn filter<P>(&self, predicate: P) -> Vec<Event>
    where
        P: Fn(&Event) -> bool,
    {
        self.events.iter().filter(|e| predicate(e)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{created_at_or_after, has_id, is_of_type, EventData, EventId, EventType};
    use chrono::{TimeZone, Utc};

    fn event_at(secs: i64, kind: &str) -> Event {
        Event::new(
            Utc.timestamp_opt(secs, 0).unwrap(),
            EventType::new(kind).unwrap(),
            EventData::empty(),
        )
    }

    #[test]
    fn test_append_preserves_call_order() {
        let mut log = AppendLog::new();
        let a = event_at(30, "a");
        let b = event_at(10, "b");
        let c = event_at(20, "c");

        log.append(a.clone());
        log.append(b.clone());
        log.append(c.clone());

        assert_eq!(log.len(), 3);
        assert_eq!(log.snapshot(), vec![a, b, c]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut log = AppendLog::with_capacity(4);
        log.append(event_at(1, "a"));

        let snapshot = log.snapshot();
        log.append(event_at(2, "b"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_find_and_filter() {
        let mut log = AppendLog::new();
        let a = event_at(5, "deposit");
        let b = event_at(15, "withdrawal");
        let c = event_at(25, "deposit");
        for e in [&a, &b, &c] {
            log.append(e.clone());
        }

        assert_eq!(log.find(has_id(b.id())), Some(b.clone()));
        assert_eq!(log.find(has_id(EventId::new())), None);

        let deposits = log.filter(is_of_type(EventType::new("deposit").unwrap()));
        assert_eq!(deposits, vec![a.clone(), c.clone()]);

        let recent = log.filter(created_at_or_after(Utc.timestamp_opt(15, 0).unwrap()));
        assert_eq!(recent, vec![b, c]);
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let mut log = AppendLog::new();
        let a = event_at(1, "a");
        log.append(a.clone());
        log.append(a.clone());

        assert_eq!(log.len(), 2);
        assert_eq!(log.find(has_id(a.id())), Some(a));
    }

    #[test]
    fn test_empty_log() {
        let log = AppendLog::new();
        assert!(log.is_empty());
        assert!(log.snapshot().is_empty());
        assert!(log.filter(|_| true).is_empty());
    }
}

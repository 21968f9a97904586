//! Predicate factories over events
//!
//! Used with [`AppendLog::find`](crate::event_store::AppendLog::find) and
//! [`AppendLog::filter`](crate::event_store::AppendLog::filter), and to narrow
//! combined streams.

use super::event::{Event, EventId, EventType, Timestamp};

/// Matches the event with the given id
pub fn has_id(id: EventId) -> impl Fn(&Event) -> bool + Clone + Send + Sync + 'static {
    move |event| event.id() == id
}

/// Matches events of the given type
pub fn is_of_type(
    event_type: EventType,
) -> impl Fn(&Event) -> bool + Clone + Send + Sync + 'static {
    move |event| *event.event_type() == event_type
}

/// Matches events whose timestamp is `>= t`
pub fn created_at_or_after(
    t: Timestamp,
) -> impl Fn(&Event) -> bool + Clone + Send + Sync + 'static {
    move |event| event.timestamp() >= t
}

/// Alias of [`created_at_or_after`], reads better on stream filters
pub fn created_from(t: Timestamp) -> impl Fn(&Event) -> bool + Clone + Send + Sync + 'static {
    created_at_or_after(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventData;
    use chrono::{TimeZone, Utc};

    fn event_at(secs: i64, kind: &str) -> Event {
        Event::new(
            Utc.timestamp_opt(secs, 0).unwrap(),
            EventType::new(kind).unwrap(),
            EventData::empty(),
        )
    }

    #[test]
    fn test_has_id() {
        let a = event_at(1, "a");
        let b = event_at(1, "a");
        let pred = has_id(a.id());
        assert!(pred(&a));
        assert!(!pred(&b));
    }

    #[test]
    fn test_is_of_type() {
        let pred = is_of_type(EventType::new("deposit").unwrap());
        assert!(pred(&event_at(1, "deposit")));
        assert!(!pred(&event_at(1, "withdrawal")));
    }

    #[test]
    fn test_created_at_or_after_is_inclusive() {
        let t = Utc.timestamp_opt(10, 0).unwrap();
        let pred = created_at_or_after(t);
        assert!(!pred(&event_at(9, "x")));
        assert!(pred(&event_at(10, "x")));
        assert!(pred(&event_at(11, "x")));

        let alias = created_from(t);
        assert!(alias(&event_at(10, "x")));
        assert!(!alias(&event_at(9, "x")));
    }
}

//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use memory_event_store::utils::parse_timestamp;
use memory_event_store::{Event, EventData, EventType, Timestamp};

/// Install a test-friendly tracing subscriber (honours `RUST_LOG`)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Timestamp from an RFC 3339 literal
pub fn ts(rfc3339: &str) -> Timestamp {
    parse_timestamp(rfc3339).unwrap()
}

/// Event of type `kind` stamped at `secs`, carrying a tag in its payload
pub fn tagged(secs: i64, kind: &str, tag: &str) -> Event {
    Event::new(
        at(secs),
        EventType::new(kind).unwrap(),
        EventData::new(json!({ "tag": tag })).unwrap(),
    )
}

pub fn event_at(secs: i64) -> Event {
    tagged(secs, "test", "")
}

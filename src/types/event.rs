//! Event types for the append-only log
//!
//! An [`Event`] is an immutable record of something that happened: a unique id,
//! the time it happened, a type tag and an opaque payload. Events are built once
//! and never mutated; cloning is cheap because the tag and payload are shared.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Logical creation time of an event
pub type Timestamp = DateTime<Utc>;

/// Result type for event construction
pub type EventResult<T> = Result<T, EventError>;

/// Errors raised while constructing an event
///
/// These are precondition violations. They surface at construction time, so a
/// malformed event can never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event type must not be empty")]
    EmptyType,
    #[error("event payload must not be null")]
    NullPayload,
}

/// Globally unique event identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type tag of an event
///
/// The set of types is open: any non-empty name is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventType(Arc<str>);

impl EventType {
    /// Create a type tag, rejecting empty or whitespace-only names
    pub fn new(name: impl Into<String>) -> EventResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EventError::EmptyType);
        }
        Ok(Self(Arc::from(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventType {
    type Error = EventError;

    fn try_from(name: String) -> EventResult<Self> {
        Self::new(name)
    }
}

impl TryFrom<&str> for EventType {
    type Error = EventError;

    fn try_from(name: &str) -> EventResult<Self> {
        Self::new(name)
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.0.to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, immutable event payload
///
/// The store never looks inside the payload. JSON `null` is rejected so that
/// every event carries some data, even if it is just `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct EventData(Arc<serde_json::Value>);

impl EventData {
    pub fn new(value: serde_json::Value) -> EventResult<Self> {
        if value.is_null() {
            return Err(EventError::NullPayload);
        }
        Ok(Self(Arc::new(value)))
    }

    /// An empty JSON object payload
    pub fn empty() -> Self {
        Self(Arc::new(serde_json::Value::Object(Default::default())))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Parse the payload as a specific type
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.0.as_ref())
    }
}

impl Hash for EventData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

/// Hash a JSON value consistently with its `PartialEq`
///
/// Object keys are hashed in sorted order so that maps which compare equal
/// hash equally whatever their insertion order.
fn hash_value<H: Hasher>(value: &serde_json::Value, state: &mut H) {
    use serde_json::Value;

    match value {
        Value::Null => 0u8.hash(state),
        Value::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        Value::Number(n) => {
            2u8.hash(state);
            n.to_string().hash(state);
        }
        Value::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        Value::Array(items) => {
            4u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            5u8.hash(state);
            map.len().hash(state);
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                key.hash(state);
                hash_value(item, state);
            }
        }
    }
}

impl TryFrom<serde_json::Value> for EventData {
    type Error = EventError;

    fn try_from(value: serde_json::Value) -> EventResult<Self> {
        Self::new(value)
    }
}

impl From<EventData> for serde_json::Value {
    fn from(data: EventData) -> Self {
        Arc::try_unwrap(data.0).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl fmt::Display for EventData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable event in the log
///
/// Two events are equal iff all four fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Unique id, assigned at construction
    id: EventId,

    #[serde(rename = "ts")]
    timestamp: Timestamp,

    #[serde(rename = "eventType")]
    event_type: EventType,

    data: EventData,
}

impl Event {
    /// Create an event with a freshly generated id
    pub fn new(timestamp: Timestamp, event_type: EventType, data: EventData) -> Self {
        Self::with_id(EventId::new(), timestamp, event_type, data)
    }

    /// Create an event with a caller-supplied id
    ///
    /// The caller is responsible for id uniqueness; the store does not
    /// deduplicate.
    pub fn with_id(
        id: EventId,
        timestamp: Timestamp,
        event_type: EventType,
        data: EventData,
    ) -> Self {
        Self {
            id,
            timestamp,
            event_type,
            data,
        }
    }

    /// Create an event stamped with the current time
    pub fn now(event_type: EventType, data: EventData) -> Self {
        Self::new(crate::utils::now(), event_type, data)
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Serialize event to a single JSON line
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize event from a JSON line
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event{{id={}, timestamp={}, type={}, data={}}}",
            self.id,
            self.timestamp.to_rfc3339(),
            self.event_type,
            self.data
        )
    }
}

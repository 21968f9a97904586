//! Data types for the event store
//!
//! This module contains the immutable event value and the predicates used to
//! query it.

mod event;
pub mod predicate;

pub use event::{Event, EventData, EventError, EventId, EventResult, EventType, Timestamp};
pub use predicate::{created_at_or_after, created_from, has_id, is_of_type};

//! Time and timestamp utilities

use chrono::Utc;

use crate::types::Timestamp;

/// Current wall-clock time, used as the default event timestamp
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an RFC 3339 timestamp such as `2024-01-01T00:00:00Z`
pub fn parse_timestamp(s: &str) -> Result<Timestamp, chrono::ParseError> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

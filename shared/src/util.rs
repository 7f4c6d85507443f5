//! Time helpers

use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 timestamp with millisecond precision, matching `Date.toISOString()`
/// on the browser side (`2025-01-31T12:00:00.000Z`).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

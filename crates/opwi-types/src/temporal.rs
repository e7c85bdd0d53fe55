use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An ISO-8601 timestamp kept exactly as written.
///
/// Stored documents carry timestamps produced by different writers (RFC 3339
/// with an offset, or naive local times without one). The string as written
/// is never reformatted, so a decoded document re-encodes byte-for-byte.
/// Comparison goes through [`Timestamp::instant`] when both sides parse.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// The current UTC time with microsecond precision.
    pub fn now() -> Self {
        Self::from_instant(Utc::now())
    }

    /// The current time, bumped so that it is strictly after `previous`.
    pub fn now_after(previous: &Timestamp) -> Self {
        let now = Utc::now();
        match previous.instant() {
            Some(prev) if now <= prev => Self::from_instant(prev + Duration::microseconds(1)),
            _ => Self::from_instant(now),
        }
    }

    /// Wrap a string without validating it.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Wrap a string, rejecting anything that is not a recognizable ISO-8601 time.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let ts = Self(value.to_string());
        ts.instant()
            .map(|_| ts)
            .ok_or_else(|| TypeError::InvalidTimestamp(value.to_string()))
    }

    fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interpret the string as an instant. Naive strings are read as UTC.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(dt.with_timezone(&Utc));
        }
        // Naive strings are wall-clock times in the writer's zone, which the
        // file does not record. Reading them as UTC can shift them by the
        // writer's offset; ordering against them is approximate, and
        // `now_after` may place a new revision just past a naive time that
        // lies ahead of the real clock.
        NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Chronological comparison, falling back to string order when either
    /// side does not parse.
    pub fn cmp_instant(&self, other: &Self) -> Ordering {
        match (self.instant(), other.instant()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.0.cmp(&other.0),
        }
    }

    /// Returns `true` if this timestamp is strictly before `other`.
    pub fn is_before(&self, other: &Self) -> bool {
        self.cmp_instant(other) == Ordering::Less
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

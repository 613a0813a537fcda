use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// TimestampError
///

#[derive(Debug, ThisError)]
pub enum TimestampError {
    #[error("'{0}' is not a recognized timestamp")]
    Unparseable(String),
}

///
/// Timestamp
/// (seconds since the Unix epoch; sub-second precision is truncated)
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    /// Construct from seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Construct from milliseconds (truncate to seconds).
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms / 1_000)
    }

    /// Current wall-clock time at seconds precision.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// ISO-8601 rendering with seconds precision.
    ///
    /// Values outside chrono's representable range fall back to the raw
    /// second count so Display never panics.
    #[must_use]
    pub fn to_iso8601(self) -> String {
        DateTime::<Utc>::from_timestamp(self.0, 0).map_or_else(
            || format!("{}s", self.0),
            |dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }

    /// Parse a textual timestamp, accepting RFC 3339, a naive datetime,
    /// or a bare date. Sub-second precision is truncated.
    pub fn parse(text: &str) -> Result<Self, TimestampError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self(dt.timestamp()));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Self(dt.and_utc().timestamp()));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self(dt.and_utc().timestamp()));
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            && let Some(dt) = date.and_hms_opt(0, 0, 0)
        {
            return Ok(Self(dt.and_utc().timestamp()));
        }

        Err(TimestampError::Unparseable(text.to_string()))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

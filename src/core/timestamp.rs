//! Timestamp normalization
//!
//! Clients send timestamps in several shapes. Parsing tags each value with its
//! origin ([`IncomingTimestamp`]) and [`TimestampNormalizer`] turns every tag
//! into an absolute UTC instant. Storage and comparisons only ever see the
//! normalized value.
//!
//! | shape                         | tag            | normalized to                        |
//! |-------------------------------|----------------|--------------------------------------|
//! | `2025-10-19T14:30:00Z`        | `Absolute`     | unchanged                            |
//! | `2025-10-19T14:30:00+03:00`   | `Zoned`        | converted with the carried offset    |
//! | `2025-10-19`                  | `DateOnly`     | UTC midnight of that date            |
//! | `2025-10-19T14:30:00`         | `LocalWallClock` | shifted by the configured local offset |
//! | missing / `null` / `""`       | `Missing`      | now                                  |

use crate::core::error::ConfigError;
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Clients are assumed to live at UTC+3 unless configured otherwise
pub const DEFAULT_LOCAL_OFFSET_HOURS: i32 = 3;

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A timestamp as received, tagged with its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncomingTimestamp {
    /// UTC designator present
    Absolute(DateTime<Utc>),
    /// Explicit numeric offset present
    Zoned(DateTime<FixedOffset>),
    /// Calendar date without a time of day
    DateOnly(NaiveDate),
    /// Wall-clock time without any zone information
    LocalWallClock(NaiveDateTime),
    /// No value supplied
    #[default]
    Missing,
}

/// Raised when a string matches none of the accepted timestamp shapes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized timestamp '{0}'")]
pub struct InvalidTimestamp(pub String);

impl IncomingTimestamp {
    pub fn is_missing(&self) -> bool {
        matches!(self, IncomingTimestamp::Missing)
    }
}

impl FromStr for IncomingTimestamp {
    type Err = InvalidTimestamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(IncomingTimestamp::Missing);
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
            return Ok(if s.ends_with('Z') || s.ends_with('z') {
                IncomingTimestamp::Absolute(parsed.with_timezone(&Utc))
            } else {
                IncomingTimestamp::Zoned(parsed)
            });
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(IncomingTimestamp::DateOnly(date));
        }

        LOCAL_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .map(IncomingTimestamp::LocalWallClock)
            .ok_or_else(|| InvalidTimestamp(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for IncomingTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(IncomingTimestamp::Missing),
            Some(raw) => raw.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl From<DateTime<Utc>> for IncomingTimestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        IncomingTimestamp::Absolute(instant)
    }
}

impl From<NaiveDate> for IncomingTimestamp {
    fn from(date: NaiveDate) -> Self {
        IncomingTimestamp::DateOnly(date)
    }
}

/// Converts tagged timestamps into absolute instants
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TimestampNormalizer {
    local_offset: FixedOffset,
}

impl fmt::Debug for TimestampNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampNormalizer")
            .field("local_offset", &self.local_offset.to_string())
            .finish()
    }
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::with_offset_hours(DEFAULT_LOCAL_OFFSET_HOURS).unwrap_or(Self {
            local_offset: Utc.fix(),
        })
    }
}

impl TimestampNormalizer {
    /// Build a normalizer for clients living at a fixed `UTC+hours` offset
    pub fn with_offset_hours(hours: i32) -> Result<Self, ConfigError> {
        let local_offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "time.local_offset_hours".to_string(),
                value: hours.to_string(),
                message: "offset must lie strictly between -24 and 24 hours".to_string(),
            })?;
        Ok(Self { local_offset })
    }

    pub fn local_offset(&self) -> FixedOffset {
        self.local_offset
    }

    /// Absolute clock used for every server-side "now" stamp
    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    pub fn normalize(&self, timestamp: IncomingTimestamp) -> DateTime<Utc> {
        match timestamp {
            IncomingTimestamp::Absolute(instant) => instant,
            IncomingTimestamp::Zoned(zoned) => zoned.with_timezone(&Utc),
            IncomingTimestamp::DateOnly(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            IncomingTimestamp::LocalWallClock(wall) => {
                let shift = TimeDelta::seconds(i64::from(self.local_offset.local_minus_utc()));
                Utc.from_utc_datetime(&(wall - shift))
            }
            IncomingTimestamp::Missing => self.now(),
        }
    }

    /// Normalize, treating a missing value as absent rather than "now"
    pub fn normalize_required(&self, timestamp: IncomingTimestamp) -> Option<DateTime<Utc>> {
        if timestamp.is_missing() {
            None
        } else {
            Some(self.normalize(timestamp))
        }
    }
}

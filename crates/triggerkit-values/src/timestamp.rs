use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validation::ValidationError;

const NANOS_DIGITS: usize = 9;

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.(\d{1,9}))?(?:Z|[+-]\d{2}:\d{2})$")
            .expect("invalid regex")
    })
}

/// Point in time as seconds since the Unix epoch plus a nanosecond remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Whole seconds since 1970-01-01T00:00:00Z.
    pub seconds: i64,
    /// Sub-second remainder, always below one billion.
    pub nanos: u32,
}

impl Timestamp {
    /// Builds a timestamp from its parts.
    pub fn new(seconds: i64, nanos: u32) -> Result<Self, ValidationError> {
        if nanos >= 1_000_000_000 {
            return Err(ValidationError::OutOfBounds {
                field: "nanos",
                value: nanos.to_string(),
            });
        }
        Ok(Self { seconds, nanos })
    }

    /// Parses an RFC 3339 string such as `2017-06-13T00:58:40.349Z`.
    ///
    /// The fractional part is optional and may carry one to nine digits; it is
    /// right-padded to nine digits to form the nanosecond component.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let captures =
            timestamp_pattern()
                .captures(value)
                .ok_or_else(|| ValidationError::PatternMismatch {
                    field: "timestamp",
                    value: value.to_string(),
                })?;

        let parsed =
            DateTime::parse_from_rfc3339(value).map_err(|err| ValidationError::InvalidEncoding {
                field: "timestamp",
                reason: err.to_string(),
            })?;

        let nanos = match captures.get(1) {
            Some(fraction) => {
                let digits = format!("{:0<width$}", fraction.as_str(), width = NANOS_DIGITS);
                digits
                    .parse::<u32>()
                    .map_err(|err| ValidationError::InvalidEncoding {
                        field: "timestamp",
                        reason: err.to_string(),
                    })?
            }
            None => 0,
        };

        Ok(Self {
            seconds: parsed.timestamp(),
            nanos,
        })
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }

    /// Renders the timestamp as a UTC RFC 3339 string with a `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        match DateTime::<Utc>::from_timestamp(self.seconds, self.nanos) {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            None => format!("{}.{:09}", self.seconds, self.nanos),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

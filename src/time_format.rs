//! Timestamp and duration formatting for flight offers
//!
//! Upstream timestamps are rendered as `"Oct 20, 2026, 08:05 AM"`. Anything
//! that does not parse is passed through unchanged, and the `"N/A"`
//! sentinel stays `"N/A"`.

use crate::{FlightError, NOT_AVAILABLE};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const DISPLAY_FORMAT: &str = "%b %-d, %Y, %I:%M %p";
const TIME_OF_DAY_FORMAT: &str = "%I:%M %p";

// Tried in order after RFC 3339. The display format is last so that
// offers read back from JSON keep a sortable departure time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    DISPLAY_FORMAT,
];

/// Parse an upstream timestamp.
///
/// Offset-bearing timestamps keep their wall-clock time plus the offset;
/// naive ones are taken as wall-clock time at the airport.
pub fn parse_timestamp(input: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some((dt.naive_local(), Some(*dt.offset())));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some((dt, None));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| (dt, None))
}

/// Render a timestamp for display, passing `"N/A"` and unparsable input through.
pub fn format_for_display(timestamp: &str) -> String {
    FlightTime::parse(Some(timestamp)).to_string()
}

/// Render only the time of day (`"08:05 AM"`) of a timestamp.
pub fn format_time_of_day(timestamp: &str) -> String {
    FlightTime::parse(Some(timestamp)).time_of_day()
}

/// A departure or arrival time as carried by a flight offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightTime {
    /// No timestamp field was present upstream
    Missing,
    Parsed {
        local: NaiveDateTime,
        offset: Option<FixedOffset>,
    },
    /// Present but unparsable; displayed verbatim
    Raw(String),
}

impl FlightTime {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return FlightTime::Missing;
        };
        match raw.trim() {
            "" | NOT_AVAILABLE => FlightTime::Missing,
            text => match parse_timestamp(text) {
                Some((local, offset)) => FlightTime::Parsed { local, offset },
                None => FlightTime::Raw(raw.to_string()),
            },
        }
    }

    /// Compact `hh:mm AM/PM` rendering.
    pub fn time_of_day(&self) -> String {
        match self {
            FlightTime::Missing => NOT_AVAILABLE.to_string(),
            FlightTime::Parsed { local, .. } => local.format(TIME_OF_DAY_FORMAT).to_string(),
            FlightTime::Raw(raw) => raw.clone(),
        }
    }

    /// Point in time used for chronological ordering. Offset-bearing
    /// values are normalized to UTC.
    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            FlightTime::Parsed { local, offset } => Some(match offset {
                Some(offset) => *local - *offset,
                None => *local,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for FlightTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightTime::Missing => f.write_str(NOT_AVAILABLE),
            FlightTime::Parsed { local, .. } => write!(f, "{}", local.format(DISPLAY_FORMAT)),
            FlightTime::Raw(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for FlightTime {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FlightTime::parse(Some(s)))
    }
}

impl Serialize for FlightTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlightTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(FlightTime::parse(Some(&text)))
    }
}

/// Flight duration, always at least one minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlightDuration {
    minutes: u32,
}

impl FlightDuration {
    /// `None` for zero, negative or absurdly large values.
    pub fn from_minutes(minutes: i64) -> Option<Self> {
        if minutes <= 0 {
            return None;
        }
        u32::try_from(minutes).ok().map(|minutes| Self { minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

impl fmt::Display for FlightDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.minutes / 60, self.minutes % 60)
    }
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d+)h\s+(\d+)m\s*$").expect("duration pattern is valid"))
}

impl FromStr for FlightDuration {
    type Err = FlightError;

    /// Parse the `"<h>h <m>m"` display form back into a duration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FlightError::ParseError(format!("Invalid duration: {}", s));
        let captures = duration_pattern().captures(s).ok_or_else(invalid)?;

        let hours: i64 = captures[1].parse().map_err(|_| invalid())?;
        let minutes: i64 = captures[2].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }

        hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(minutes))
            .and_then(Self::from_minutes)
            .ok_or_else(invalid)
    }
}

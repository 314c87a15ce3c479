//! Localized rendering of shift times.
//!
//! Shift timestamps are facility-local wall-clock values, so rendering them
//! is a pure formatting step with no timezone conversion.

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Error returned when a strftime pattern cannot be parsed or asks for
/// fields the rendered value does not carry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid display format '{0}'")]
pub struct InvalidFormat(pub String);

/// strftime patterns used to render times and date-times.
///
/// Patterns are checked on construction, so rendering never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDisplayFormat")]
pub struct DisplayFormat {
    time: String,
    datetime: String,
}

#[derive(Deserialize)]
struct RawDisplayFormat {
    #[serde(default = "default_time_format")]
    time: String,
    #[serde(default = "default_datetime_format")]
    datetime: String,
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

fn default_datetime_format() -> String {
    DEFAULT_DATETIME_FORMAT.to_string()
}

impl TryFrom<RawDisplayFormat> for DisplayFormat {
    type Error = InvalidFormat;

    fn try_from(raw: RawDisplayFormat) -> Result<Self, Self::Error> {
        DisplayFormat::new(raw.time, raw.datetime)
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            time: default_time_format(),
            datetime: default_datetime_format(),
        }
    }
}

impl DisplayFormat {
    /// Create a format from strftime patterns for times and date-times.
    pub fn new(
        time: impl Into<String>,
        datetime: impl Into<String>,
    ) -> Result<Self, InvalidFormat> {
        let time = time.into();
        let datetime = datetime.into();
        for pattern in [&time, &datetime] {
            if StrftimeItems::new(pattern).any(|item| item == Item::Error) {
                return Err(InvalidFormat(pattern.clone()));
            }
        }

        // Date fields on a time, or an offset on a naive timestamp, only fail
        // when rendered.
        let sample = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .ok_or_else(|| InvalidFormat(datetime.clone()))?;
        let mut rendered = String::new();
        if write!(rendered, "{}", sample.time().format(&time)).is_err() {
            return Err(InvalidFormat(time));
        }
        if write!(rendered, "{}", sample.format(&datetime)).is_err() {
            return Err(InvalidFormat(datetime));
        }

        Ok(Self { time, datetime })
    }

    pub fn time_pattern(&self) -> &str {
        &self.time
    }

    pub fn datetime_pattern(&self) -> &str {
        &self.datetime
    }

    /// Render the clock component of a timestamp.
    pub fn localize_time(&self, time: NaiveTime) -> String {
        time.format(&self.time).to_string()
    }

    /// Render a full timestamp.
    pub fn localize_datetime(&self, datetime: NaiveDateTime) -> String {
        datetime.format(&self.datetime).to_string()
    }
}

/// Qualifier appended to an ending time that lies `days` calendar days
/// after the start. `None` when the shift ends on its starting day.
pub fn day_qualifier(days: i64) -> Option<String> {
    match days {
        d if d <= 0 => None,
        1 => Some("the next day".to_string()),
        n => Some(format!("after {} days", n)),
    }
}

//! Time windows selecting which listing items belong to a run

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("invalid date '{input}' (expected YYYY-MM-DD): {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: time::error::Parse,
    },
}

/// Where a timestamp falls relative to a [`PageWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    Before,
    Within,
    After,
}

/// Half-open `[start, end)` range of UTC epoch seconds covering one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    start: i64,
    end: i64,
}

impl PageWindow {
    /// Window for a `YYYY-MM-DD` date, interpreted as UTC
    pub fn for_date(input: &str) -> Result<Self, WindowError> {
        Ok(Self::from_date(parse_date(input)?))
    }

    pub fn from_date(date: Date) -> Self {
        let start = date.midnight().assume_utc();
        let end = start + Duration::DAY;

        Self {
            start: start.unix_timestamp(),
            end: end.unix_timestamp(),
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn position(&self, timestamp: i64) -> WindowPosition {
        if timestamp < self.start {
            WindowPosition::Before
        } else if timestamp >= self.end {
            WindowPosition::After
        } else {
            WindowPosition::Within
        }
    }
}

pub fn parse_date(input: &str) -> Result<Date, WindowError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(input.trim(), &format).map_err(|source| WindowError::InvalidDate {
        input: input.to_string(),
        source,
    })
}

/// Epoch seconds of an RFC 3339 timestamp; a bare leading date counts as
/// midnight UTC
pub fn parse_timestamp(input: &str) -> Option<i64> {
    let input = input.trim();

    if let Ok(parsed) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(parsed.unix_timestamp());
    }

    let date_part = input.split(['T', ' ']).next()?;
    parse_date(date_part)
        .ok()
        .map(|date| date.midnight().assume_utc().unix_timestamp())
}

/// Date processed when a run is started without one: two days before `now`
pub fn default_run_date(now: OffsetDateTime) -> Date {
    (now - Duration::days(2)).date()
}

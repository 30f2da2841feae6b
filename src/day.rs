use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{format_description::FormatItem, macros::format_description, Date, Duration};

use crate::error::AppError;

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A calendar day with no time-of-day and no offset attached.
///
/// Built from the year/month/day components of the input, so the stored
/// value reads back as the same `YYYY-MM-DD` string wherever it is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct CanonicalDay(Date);

impl CanonicalDay {
    /// Parses a strict `YYYY-MM-DD` string (years 0001 to 9999).
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidDateFormat(input.to_string());

        // four digit year only: no sign, no expanded years
        let bytes = input.as_bytes();
        if bytes.len() != 10 || !bytes[..4].iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        let date = Date::parse(input, DAY_FORMAT).map_err(|_| invalid())?;
        if date.year() < 1 {
            return Err(invalid());
        }
        Ok(Self(date))
    }

    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn date(self) -> Date {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u8 {
        self.0.month() as u8
    }

    /// The Sunday starting the week this day belongs to.
    pub fn week_start(self) -> Self {
        let back = self.0.weekday().number_days_from_sunday();
        Self(self.0 - Duration::days(i64::from(back)))
    }
}

impl fmt::Display for CanonicalDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // month/day padding is fixed, and the year is always 1..=9999
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month() as u8,
            self.0.day()
        )
    }
}

impl FromStr for CanonicalDay {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CanonicalDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{day::CanonicalDay, error::AppError};

/// Time log record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TimeLogEntry {
    pub id: Uuid,
    pub owner: String,
    pub day: CanonicalDay,
    pub hours: f64,
    pub activity: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated values for a create or an update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeLog {
    pub day: CanonicalDay,
    pub hours: f64,
    pub activity: Option<String>,
}

impl NewTimeLog {
    /// Rejects non-positive or non-finite hours and malformed days. A blank
    /// activity becomes `None`; any other label is kept as given.
    pub fn new(day: &str, hours: f64, activity: Option<String>) -> Result<Self, AppError> {
        if !hours.is_finite() {
            return Err(AppError::validation("hours must be a number"));
        }
        if hours <= 0.0 {
            return Err(AppError::validation("hours must be greater than 0"));
        }
        let day = CanonicalDay::parse(day)?;
        let activity = activity.filter(|a| !a.trim().is_empty());
        Ok(Self { day, hours, activity })
    }

    pub fn into_entry(self, owner: &str, now: OffsetDateTime) -> TimeLogEntry {
        TimeLogEntry {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            day: self.day,
            hours: self.hours,
            activity: self.activity,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Inclusive day bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayRange {
    pub start: Option<CanonicalDay>,
    pub end: Option<CanonicalDay>,
}

impl DayRange {
    pub fn new(start: Option<CanonicalDay>, end: Option<CanonicalDay>) -> Result<Self, AppError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(AppError::validation("startDate must not be after endDate"));
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, day: CanonicalDay) -> bool {
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }
}

/// Which entries a query returns. Always scoped to one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLogFilter {
    pub owner: String,
    pub range: DayRange,
}

impl TimeLogFilter {
    pub fn for_owner(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            range: DayRange::default(),
        }
    }

    /// Builds the filter from raw query bounds; blank bounds are open.
    pub fn from_bounds(owner: &str, start: Option<&str>, end: Option<&str>) -> Result<Self, AppError> {
        let parse = |raw: Option<&str>| -> Result<Option<CanonicalDay>, AppError> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                Some(s) => CanonicalDay::parse(s).map(Some),
                None => Ok(None),
            }
        };
        Ok(Self {
            owner: owner.to_string(),
            range: DayRange::new(parse(start)?, parse(end)?)?,
        })
    }

    pub fn matches(&self, entry: &TimeLogEntry) -> bool {
        entry.owner == self.owner && self.range.contains(entry.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_time_log_rejects_bad_hours() {
        for hours in [0.0, -1.0, -0.25, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(NewTimeLog::new("2024-03-10", hours, None), Err(AppError::Validation(_))),
                "{hours}"
            );
        }
        let ok = NewTimeLog::new("2024-03-10", 0.25, None).unwrap();
        assert_eq!(ok.hours, 0.25);
    }

    #[test]
    fn new_time_log_rejects_bad_day() {
        let err = NewTimeLog::new("2024-02-30", 1.0, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateFormat(_)));
    }

    #[test]
    fn blank_activity_is_none() {
        assert_eq!(NewTimeLog::new("2024-03-10", 1.0, Some("   ".into())).unwrap().activity, None);
        assert_eq!(NewTimeLog::new("2024-03-10", 1.0, Some("".into())).unwrap().activity, None);
        assert_eq!(
            NewTimeLog::new("2024-03-10", 1.0, Some(" tkd ".into())).unwrap().activity.as_deref(),
            Some(" tkd ")
        );
    }

    #[test]
    fn filter_bounds_are_inclusive_and_optional() {
        let f = TimeLogFilter::from_bounds("alice", Some("2024-03-01"), Some("2024-03-31")).unwrap();
        let d = |s: &str| CanonicalDay::parse(s).unwrap();
        assert!(f.range.contains(d("2024-03-01")));
        assert!(f.range.contains(d("2024-03-31")));
        assert!(!f.range.contains(d("2024-02-29")));
        assert!(!f.range.contains(d("2024-04-01")));

        let open = TimeLogFilter::from_bounds("alice", Some(""), None).unwrap();
        assert_eq!(open, TimeLogFilter::for_owner("alice"));

        let from = TimeLogFilter::from_bounds("alice", Some("2024-03-10"), None).unwrap();
        assert!(from.range.contains(d("9999-12-31")));
        assert!(!from.range.contains(d("2024-03-09")));
    }

    #[test]
    fn filter_rejects_inverted_or_malformed_bounds() {
        assert!(matches!(
            TimeLogFilter::from_bounds("alice", Some("2024-03-31"), Some("2024-03-01")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            TimeLogFilter::from_bounds("alice", Some("2024-3-1"), None),
            Err(AppError::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn filter_matches_owner() {
        let now = OffsetDateTime::now_utc();
        let entry = NewTimeLog::new("2024-03-10", 1.0, None).unwrap().into_entry("alice", now);
        assert!(TimeLogFilter::for_owner("alice").matches(&entry));
        assert!(!TimeLogFilter::for_owner("bob").matches(&entry));
    }
}

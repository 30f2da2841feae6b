//! Rollups over a snapshot of entries. Nothing here touches storage.

use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer};
use time::OffsetDateTime;

use crate::{day::CanonicalDay, timelogs::repo_types::TimeLogEntry};

/// Grouping key for `by_activity`. Entries without an activity land in
/// `Uncategorized`, which is not a label and cannot equal one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivityBucket {
    Uncategorized,
    Named(String),
}

impl ActivityBucket {
    pub fn label(&self) -> Option<&str> {
        match self {
            ActivityBucket::Uncategorized => None,
            ActivityBucket::Named(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u8,
}

impl From<CanonicalDay> for MonthKey {
    fn from(day: CanonicalDay) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn total_hours(entries: &[TimeLogEntry]) -> f64 {
    entries.iter().map(|e| e.hours).sum()
}

/// Hours logged from the Sunday starting `now`'s week through `now`'s day,
/// both inclusive. The day of `now` is read in `now`'s own offset.
pub fn week_to_date_hours(entries: &[TimeLogEntry], now: OffsetDateTime) -> f64 {
    let today = CanonicalDay::from_date(now.date());
    let week_start = today.week_start();
    entries
        .iter()
        .filter(|e| e.day >= week_start && e.day <= today)
        .map(|e| e.hours)
        .sum()
}

pub fn by_activity(entries: &[TimeLogEntry]) -> BTreeMap<ActivityBucket, f64> {
    let mut out = BTreeMap::new();
    for e in entries {
        let key = match &e.activity {
            Some(name) => ActivityBucket::Named(name.clone()),
            None => ActivityBucket::Uncategorized,
        };
        *out.entry(key).or_insert(0.0) += e.hours;
    }
    out
}

pub fn by_day(entries: &[TimeLogEntry]) -> BTreeMap<CanonicalDay, f64> {
    let mut out = BTreeMap::new();
    for e in entries {
        *out.entry(e.day).or_insert(0.0) += e.hours;
    }
    out
}

pub fn by_month(entries: &[TimeLogEntry]) -> BTreeMap<MonthKey, f64> {
    let mut out = BTreeMap::new();
    for e in entries {
        *out.entry(MonthKey::from(e.day)).or_insert(0.0) += e.hours;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timelogs::repo_types::NewTimeLog;
    use time::macros::datetime;

    const EPS: f64 = 1e-9;

    fn entry(day: &str, hours: f64, activity: Option<&str>) -> TimeLogEntry {
        NewTimeLog::new(day, hours, activity.map(str::to_string))
            .unwrap()
            .into_entry("alice", OffsetDateTime::UNIX_EPOCH)
    }

    #[test]
    fn empty_input_is_zero_everywhere() {
        let now = datetime!(2024-03-13 12:00 UTC);
        assert_eq!(total_hours(&[]), 0.0);
        assert_eq!(week_to_date_hours(&[], now), 0.0);
        assert!(by_activity(&[]).is_empty());
        assert!(by_day(&[]).is_empty());
        assert!(by_month(&[]).is_empty());
    }

    #[test]
    fn total_grows_by_appended_hours() {
        let mut entries = vec![entry("2024-03-10", 2.0, None), entry("2024-03-11", 0.1, None)];
        for h in [0.25, 1.7, 3.0, 0.05] {
            let before = total_hours(&entries);
            entries.push(entry("2024-03-12", h, None));
            assert!((total_hours(&entries) - (before + h)).abs() <= EPS);
        }
    }

    #[test]
    fn week_to_date_starts_on_sunday() {
        // Wednesday 2024-03-13
        let now = datetime!(2024-03-13 15:30 UTC);
        let entries = vec![
            entry("2024-03-10", 2.0, None), // Sunday
            entry("2024-03-11", 1.5, None), // Monday
            entry("2024-02-26", 4.0, None), // two weeks earlier
            entry("2024-03-09", 8.0, None), // Saturday before
        ];
        assert!((week_to_date_hours(&entries, now) - 3.5).abs() <= EPS);
    }

    #[test]
    fn week_to_date_stops_at_today() {
        let now = datetime!(2024-03-13 00:00 UTC);
        let entries = vec![entry("2024-03-13", 1.0, None), entry("2024-03-14", 5.0, None)];
        assert!((week_to_date_hours(&entries, now) - 1.0).abs() <= EPS);
    }

    #[test]
    fn week_to_date_on_sunday_only_counts_today() {
        let now = datetime!(2024-03-10 08:00 UTC);
        let entries = vec![entry("2024-03-10", 1.0, None), entry("2024-03-09", 2.0, None)];
        assert!((week_to_date_hours(&entries, now) - 1.0).abs() <= EPS);
    }

    #[test]
    fn week_to_date_uses_local_day_of_now() {
        // 2024-03-10 23:00 at -05:00 is already Monday in UTC, still Sunday locally
        let now = datetime!(2024-03-10 23:00 -5);
        let entries = vec![entry("2024-03-10", 1.0, None), entry("2024-03-11", 2.0, None)];
        assert!((week_to_date_hours(&entries, now) - 1.0).abs() <= EPS);
    }

    #[test]
    fn by_day_adds_same_day_entries() {
        let entries = vec![
            entry("2024-03-10", 2.0, None),
            entry("2024-03-10", 1.5, None),
            entry("2024-03-11", 3.0, None),
        ];
        let days = by_day(&entries);
        assert_eq!(days.len(), 2);
        assert!((days[&CanonicalDay::parse("2024-03-10").unwrap()] - 3.5).abs() <= EPS);
        assert!((days[&CanonicalDay::parse("2024-03-11").unwrap()] - 3.0).abs() <= EPS);
        assert!((total_hours(&entries) - 6.5).abs() <= EPS);

        let json = serde_json::to_value(&days).unwrap();
        assert_eq!(json, serde_json::json!({"2024-03-10": 3.5, "2024-03-11": 3.0}));
    }

    #[test]
    fn by_activity_keeps_uncategorized_apart() {
        let entries = vec![
            entry("2024-03-10", 1.0, Some("tkd")),
            entry("2024-03-11", 2.0, Some("tkd")),
            entry("2024-03-11", 0.5, None),
            entry("2024-03-12", 4.0, Some("uncategorized")),
        ];
        let acts = by_activity(&entries);
        assert_eq!(acts.len(), 3);
        assert!((acts[&ActivityBucket::Named("tkd".into())] - 3.0).abs() <= EPS);
        assert!((acts[&ActivityBucket::Uncategorized] - 0.5).abs() <= EPS);
        assert!((acts[&ActivityBucket::Named("uncategorized".into())] - 4.0).abs() <= EPS);
        assert_eq!(ActivityBucket::Uncategorized.label(), None);
    }

    #[test]
    fn by_month_groups_calendar_months() {
        let entries = vec![
            entry("2024-02-29", 1.0, None),
            entry("2024-03-01", 2.0, None),
            entry("2024-03-31", 3.0, None),
        ];
        let months = by_month(&entries);
        let json = serde_json::to_value(&months).unwrap();
        assert_eq!(json, serde_json::json!({"2024-02": 1.0, "2024-03": 5.0}));
    }

    #[test]
    fn aggregates_ignore_order() {
        let mut entries = vec![
            entry("2024-03-10", 2.0, Some("a")),
            entry("2024-03-11", 1.5, None),
            entry("2024-03-10", 0.75, Some("b")),
            entry("2024-03-12", 3.25, Some("a")),
        ];
        let now = datetime!(2024-03-13 12:00 UTC);
        let total = total_hours(&entries);
        let week = week_to_date_hours(&entries, now);
        let days = by_day(&entries);
        let acts = by_activity(&entries);

        entries.reverse();
        assert!((total_hours(&entries) - total).abs() <= EPS);
        assert!((week_to_date_hours(&entries, now) - week).abs() <= EPS);
        assert_eq!(by_day(&entries), days);
        assert_eq!(by_activity(&entries), acts);
    }
}

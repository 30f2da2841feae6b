use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    day::CanonicalDay,
    error::AppError,
    timelogs::{aggregate::MonthKey, repo_types::TimeLogEntry},
};

/// Hours as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HoursInput {
    Number(f64),
    Text(String),
}

impl HoursInput {
    /// An empty or whitespace string counts as not sent.
    pub fn is_blank(&self) -> bool {
        matches!(self, HoursInput::Text(s) if s.trim().is_empty())
    }

    pub fn value(&self) -> Result<f64, AppError> {
        match self {
            HoursInput::Number(n) => Ok(*n),
            HoursInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::validation("hours must be a number")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogTimeRequest {
    pub hours: Option<HoursInput>,
    pub date: Option<String>,
    pub activity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTimeRequest {
    pub id: Option<String>,
    pub hours: Option<HoursInput>,
    pub date: Option<String>,
    pub activity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteTimeRequest {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalsQuery {
    /// The client's own calendar day, overriding the server's.
    pub today: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: Uuid,
}

/// One entry as the client sees it.
#[derive(Debug, Serialize)]
pub struct TimeLogItem {
    pub id: Uuid,
    pub date: CanonicalDay,
    pub hours: f64,
    pub activity: Option<String>,
}

impl From<TimeLogEntry> for TimeLogItem {
    fn from(e: TimeLogEntry) -> Self {
        Self {
            id: e.id,
            date: e.day,
            hours: e.hours,
            activity: e.activity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub logs: Vec<TimeLogItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    pub total: f64,
    pub week_to_date: f64,
}

#[derive(Debug, Serialize)]
pub struct ActivityTotal {
    /// `null` for entries logged without an activity.
    pub activity: Option<String>,
    pub hours: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total: f64,
    pub by_day: BTreeMap<CanonicalDay, f64>,
    pub by_month: BTreeMap<MonthKey, f64>,
    pub by_activity: Vec<ActivityTotal>,
}

use time::{macros::time, OffsetDateTime, UtcOffset};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    day::CanonicalDay,
    error::AppError,
    timelogs::{
        aggregate::{by_activity, by_day, by_month, total_hours, week_to_date_hours},
        dto::{ActivityTotal, SummaryResponse, TotalsResponse},
        repo::TimeLogRepo,
        repo_types::{NewTimeLog, TimeLogEntry, TimeLogFilter},
    },
};

/// The current instant in the configured local offset.
pub fn local_now(offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(offset)
}

/// Last instant of `day` in `offset`, used when a client names its own today.
pub fn end_of_day(day: CanonicalDay, offset: UtcOffset) -> OffsetDateTime {
    day.date()
        .with_time(time!(23:59:59.999_999_999))
        .assume_offset(offset)
}

pub async fn log_time(
    logs: &dyn TimeLogRepo,
    owner: &str,
    fields: NewTimeLog,
) -> Result<Uuid, AppError> {
    let entry = fields.into_entry(owner, OffsetDateTime::now_utc());
    logs.insert(&entry).await?;
    info!(%owner, id = %entry.id, day = %entry.day, hours = entry.hours, "time logged");
    Ok(entry.id)
}

pub async fn update_time(
    logs: &dyn TimeLogRepo,
    owner: &str,
    id: Uuid,
    fields: NewTimeLog,
) -> Result<(), AppError> {
    if !logs.update(id, owner, &fields, OffsetDateTime::now_utc()).await? {
        // missing and not-owned are reported the same way
        warn!(%owner, %id, "update matched no entry");
        return Err(AppError::NotFound);
    }
    info!(%owner, %id, day = %fields.day, hours = fields.hours, "time log updated");
    Ok(())
}

pub async fn delete_time(logs: &dyn TimeLogRepo, owner: &str, id: Uuid) -> Result<(), AppError> {
    if !logs.delete(id, owner).await? {
        warn!(%owner, %id, "delete matched no entry");
        return Err(AppError::NotFound);
    }
    info!(%owner, %id, "time log deleted");
    Ok(())
}

pub async fn list_time(
    logs: &dyn TimeLogRepo,
    filter: &TimeLogFilter,
) -> Result<Vec<TimeLogEntry>, AppError> {
    logs.query(filter).await
}

pub async fn totals(
    logs: &dyn TimeLogRepo,
    owner: &str,
    now: OffsetDateTime,
) -> Result<TotalsResponse, AppError> {
    let entries = logs.query(&TimeLogFilter::for_owner(owner)).await?;
    Ok(TotalsResponse {
        total: total_hours(&entries),
        week_to_date: week_to_date_hours(&entries, now),
    })
}

pub async fn summary(
    logs: &dyn TimeLogRepo,
    filter: &TimeLogFilter,
) -> Result<SummaryResponse, AppError> {
    let entries = logs.query(filter).await?;
    let by_activity = by_activity(&entries)
        .into_iter()
        .map(|(bucket, hours)| ActivityTotal {
            activity: bucket.label().map(str::to_string),
            hours,
        })
        .collect();
    Ok(SummaryResponse {
        total: total_hours(&entries),
        by_day: by_day(&entries),
        by_month: by_month(&entries),
        by_activity,
    })
}

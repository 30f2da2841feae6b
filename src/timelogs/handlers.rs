use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    day::CanonicalDay,
    error::AppError,
    state::AppState,
    timelogs::{
        dto::{
            CreatedResponse, DeleteTimeRequest, ListResponse, LogTimeRequest, RangeQuery,
            SuccessResponse, SummaryResponse, TotalsQuery, TotalsResponse, UpdateTimeRequest,
        },
        repo_types::{NewTimeLog, TimeLogFilter},
        services,
    },
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/time/get", get(list_time))
        .route("/api/time/total", get(get_totals))
        .route("/api/time/summary", get(get_summary))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/api/time/log", post(log_time))
        .route("/api/time/update", put(update_time))
        .route("/api/time/delete", delete(delete_time))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::validation(e.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| AppError::validation(e.body_text()))
}

/// An id that does not parse cannot name an entry, so it is simply not found.
fn entry_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound)
}

#[instrument(skip(state, payload))]
pub async fn log_time(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    payload: Result<Json<LogTimeRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let body = json_body(payload)?;
    let (Some(hours), Some(date)) = (
        body.hours.filter(|h| !h.is_blank()),
        body.date.filter(|d| !d.is_empty()),
    ) else {
        warn!(%owner, "log time without hours or date");
        return Err(AppError::validation("hours and date are required"));
    };

    let fields = NewTimeLog::new(&date, hours.value()?, body.activity)?;
    let id = services::log_time(state.logs.as_ref(), &owner, fields).await?;
    Ok(Json(CreatedResponse { success: true, id }))
}

#[instrument(skip(state, payload))]
pub async fn update_time(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    payload: Result<Json<UpdateTimeRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let body = json_body(payload)?;
    let (Some(id), Some(hours), Some(date)) = (
        body.id.filter(|i| !i.is_empty()),
        body.hours.filter(|h| !h.is_blank()),
        body.date.filter(|d| !d.is_empty()),
    ) else {
        return Err(AppError::validation("id, hours, and date are required"));
    };

    let fields = NewTimeLog::new(&date, hours.value()?, body.activity)?;
    services::update_time(state.logs.as_ref(), &owner, entry_id(&id)?, fields).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[instrument(skip(state, payload))]
pub async fn delete_time(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    payload: Result<Json<DeleteTimeRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let body = json_body(payload)?;
    let Some(id) = body.id.filter(|i| !i.is_empty()) else {
        return Err(AppError::validation("id is required"));
    };

    services::delete_time(state.logs.as_ref(), &owner, entry_id(&id)?).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[instrument(skip(state, query))]
pub async fn list_time(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let range = query_params(query)?;
    let filter =
        TimeLogFilter::from_bounds(&owner, range.start_date.as_deref(), range.end_date.as_deref())?;
    let logs = services::list_time(state.logs.as_ref(), &filter).await?;
    Ok(Json(ListResponse {
        logs: logs.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, query))]
pub async fn get_totals(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    query: Result<Query<TotalsQuery>, QueryRejection>,
) -> Result<Json<TotalsResponse>, AppError> {
    let offset = state.config.local_offset;
    let now = match query_params(query)?.today.filter(|t| !t.is_empty()) {
        Some(today) => services::end_of_day(CanonicalDay::parse(&today)?, offset),
        None => services::local_now(offset),
    };
    let totals = services::totals(state.logs.as_ref(), &owner, now).await?;
    Ok(Json(totals))
}

#[instrument(skip(state, query))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let range = query_params(query)?;
    let filter =
        TimeLogFilter::from_bounds(&owner, range.start_date.as_deref(), range.end_date.as_deref())?;
    let summary = services::summary(state.logs.as_ref(), &filter).await?;
    Ok(Json(summary))
}

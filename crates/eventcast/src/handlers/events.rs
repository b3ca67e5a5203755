//! Event listing handlers.
//!
//! Plain routes return summaries; routes under `/events/full` return detail
//! records with descriptions. Every list route accepts a `keyword` query.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use eventcast_core::event::{Event, EventDetail, EventFilter};
use eventcast_core::source::Aggregate;

use super::response::{first_or_not_found, list_response};
use crate::{handlers::AppError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
}

impl KeywordQuery {
    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}

fn recent(state: &AppState) -> EventFilter {
    let today = Utc::now().with_timezone(&state.timezone).date_naive();
    EventFilter::recent(today, state.recent_days)
}

fn today(state: &AppState) -> Result<EventFilter, AppError> {
    let date = Utc::now().with_timezone(&state.timezone).date_naive();
    Ok(EventFilter::day(date.year(), date.month(), date.day())?)
}

async fn read(state: &AppState, filter: EventFilter) -> Result<Aggregate<EventDetail>, AppError> {
    let outcome = state.events.read(&filter).await?;
    tracing::debug!(
        from_cache = outcome.from_cache,
        refreshing = outcome.refresh.is_some(),
        count = outcome.aggregate.items.len(),
        "Served events"
    );
    Ok(outcome.aggregate)
}

async fn summaries(state: &AppState, filter: EventFilter) -> Result<Response, AppError> {
    let aggregate = read(state, filter).await?;
    let items: Vec<Event> = aggregate
        .items
        .into_iter()
        .map(EventDetail::into_summary)
        .collect();
    Ok(list_response(Aggregate::new(items, aggregate.last_modified)))
}

async fn details(state: &AppState, filter: EventFilter) -> Result<Response, AppError> {
    Ok(list_response(read(state, filter).await?))
}

// ============================================================================
// Summaries
// ============================================================================

/// GET /events - the window of `recent_days` around today.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    summaries(&state, recent(&state).with_keyword(query.keyword())).await
}

/// GET /events/today
pub async fn events_today(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    summaries(&state, today(&state)?.with_keyword(query.keyword())).await
}

/// GET /events/in/{year}
pub async fn events_in_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    summaries(&state, EventFilter::year(year)?.with_keyword(query.keyword())).await
}

/// GET /events/in/{year}/{month}
pub async fn events_in_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    summaries(&state, EventFilter::month(year, month)?.with_keyword(query.keyword())).await
}

/// GET /events/in/{year}/{month}/{day}
pub async fn events_on_day(
    State(state): State<AppState>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    summaries(&state, EventFilter::day(year, month, day)?.with_keyword(query.keyword())).await
}

/// GET /events/from/{from_year}/{from_month}/to/{to_year}/{to_month}
pub async fn events_between(
    State(state): State<AppState>,
    Path((from_year, from_month, to_year, to_month)): Path<(i32, u32, i32, u32)>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    let filter = EventFilter::month_range(from_year, from_month, to_year, to_month)?;
    summaries(&state, filter.with_keyword(query.keyword())).await
}

// ============================================================================
// Details
// ============================================================================

/// GET /events/full
pub async fn list_full_events(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    details(&state, recent(&state).with_keyword(query.keyword())).await
}

/// GET /events/full/today
pub async fn full_events_today(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    details(&state, today(&state)?.with_keyword(query.keyword())).await
}

/// GET /events/full/in/{year}
pub async fn full_events_in_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    details(&state, EventFilter::year(year)?.with_keyword(query.keyword())).await
}

/// GET /events/full/in/{year}/{month}
pub async fn full_events_in_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    details(&state, EventFilter::month(year, month)?.with_keyword(query.keyword())).await
}

/// GET /events/full/in/{year}/{month}/{day}
pub async fn full_events_on_day(
    State(state): State<AppState>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    details(&state, EventFilter::day(year, month, day)?.with_keyword(query.keyword())).await
}

/// GET /events/full/from/{from_year}/{from_month}/to/{to_year}/{to_month}
pub async fn full_events_between(
    State(state): State<AppState>,
    Path((from_year, from_month, to_year, to_month)): Path<(i32, u32, i32, u32)>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    let filter = EventFilter::month_range(from_year, from_month, to_year, to_month)?;
    details(&state, filter.with_keyword(query.keyword())).await
}

// ============================================================================
// Single event
// ============================================================================

/// GET /events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let aggregate = read(&state, EventFilter::by_id(id)).await?;
    let items: Vec<Event> = aggregate
        .items
        .into_iter()
        .map(EventDetail::into_summary)
        .collect();
    Ok(first_or_not_found(
        Aggregate::new(items, aggregate.last_modified),
        "Event not found",
    ))
}

/// GET /events/{id}/detail
pub async fn get_event_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let aggregate = read(&state, EventFilter::by_id(id)).await?;
    Ok(first_or_not_found(aggregate, "Event not found"))
}

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{
        events::{
            events_between, events_in_month, events_in_year, events_on_day, events_today,
            full_events_between, full_events_in_month, full_events_in_year, full_events_on_day,
            full_events_today, get_event, get_event_detail, list_events, list_full_events,
        },
        groups::{get_group, list_groups},
        health::{healthz, livez},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Event summaries
        .route("/events", get(list_events))
        .route("/events/today", get(events_today))
        .route("/events/in/{year}", get(events_in_year))
        .route("/events/in/{year}/{month}", get(events_in_month))
        .route("/events/in/{year}/{month}/{day}", get(events_on_day))
        .route(
            "/events/from/{from_year}/{from_month}/to/{to_year}/{to_month}",
            get(events_between),
        )
        // Event details
        .route("/events/full", get(list_full_events))
        .route("/events/full/today", get(full_events_today))
        .route("/events/full/in/{year}", get(full_events_in_year))
        .route("/events/full/in/{year}/{month}", get(full_events_in_month))
        .route("/events/full/in/{year}/{month}/{day}", get(full_events_on_day))
        .route(
            "/events/full/from/{from_year}/{from_month}/to/{to_year}/{to_month}",
            get(full_events_between),
        )
        // Single event
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/detail", get(get_event_detail))
        // Groups
        .route("/groups", get(list_groups))
        .route("/groups/{key}", get(get_group))
        // Probes
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

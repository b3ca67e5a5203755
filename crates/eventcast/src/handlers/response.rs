use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use eventcast_core::source::Aggregate;

const CACHE_CONTROL: &str = "public, max-age=3600";

/// Renders an aggregate's items as a JSON array with caching headers.
pub fn list_response<T: Serialize>(aggregate: Aggregate<T>) -> Response {
    let mut response = Json(&aggregate.items).into_response();
    set_cache_headers(&mut response, &aggregate);
    response
}

/// Renders the first item of an aggregate, or 404 with `not_found`.
pub fn first_or_not_found<T: Serialize>(aggregate: Aggregate<T>, not_found: &'static str) -> Response {
    let Some(item) = aggregate.items.first() else {
        return (StatusCode::NOT_FOUND, not_found).into_response();
    };
    let mut response = Json(item).into_response();
    set_cache_headers(&mut response, &aggregate);
    response
}

fn set_cache_headers<T>(response: &mut Response, aggregate: &Aggregate<T>) {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    if aggregate.has_provenance() {
        if let Ok(value) = HeaderValue::from_str(&http_date(aggregate.last_modified)) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }
}

/// IMF-fixdate, as used by `Last-Modified`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

use axum::{
    extract::{Path, Query, State},
    response::Response,
};

use eventcast_core::group::GroupFilter;

use super::events::KeywordQuery;
use super::response::{first_or_not_found, list_response};
use crate::{handlers::AppError, state::AppState};

/// GET /groups
pub async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, AppError> {
    let filter = GroupFilter::all().with_keyword(query.keyword.as_deref());
    let outcome = state.groups.read(&filter).await?;
    tracing::debug!(
        from_cache = outcome.from_cache,
        refreshing = outcome.refresh.is_some(),
        count = outcome.aggregate.items.len(),
        "Served groups"
    );
    Ok(list_response(outcome.aggregate))
}

/// GET /groups/{key}
pub async fn get_group(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let outcome = state.groups.read(&GroupFilter::by_key(key)).await?;
    Ok(first_or_not_found(outcome.aggregate, "Group not found"))
}

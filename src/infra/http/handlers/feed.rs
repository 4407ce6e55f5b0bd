//! Subscriber feed handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use super::{FeedListQuery, domain_to_api, feed_to_api, parse_page};
use crate::domain::error::DomainError;
use crate::domain::types::ReadFilter;
use crate::infra::http::auth::CurrentUser;
use crate::infra::http::error::ApiError;
use crate::infra::http::extract::ApiJson;
use crate::infra::http::models::ReadStateRequest;
use crate::infra::http::state::ApiState;

pub async fn list_feed(
    State(state): State<ApiState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<FeedListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = parse_page(query.page.as_deref())?;
    let read = ReadFilter::parse(query.is_read.as_deref()).map_err(domain_to_api)?;

    let feed = state
        .feed
        .feed_page(principal.user_id, read, page)
        .await
        .map_err(feed_to_api)?;

    Ok(Json(feed))
}

pub async fn get_feed_post(
    State(state): State<ApiState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .feed
        .feed_post(principal.user_id, id)
        .await
        .map_err(feed_to_api)?;

    Ok(Json(entry))
}

/// Serves both PUT and PATCH; the body must carry `is_read`.
pub async fn set_read_state(
    State(state): State<ApiState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<ReadStateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let value = payload
        .is_read
        .ok_or_else(|| DomainError::validation("is_read", "is required"))
        .and_then(|flag| flag.parse("is_read"))
        .map_err(domain_to_api)?;

    let entry = state
        .feed
        .set_read_state(principal.user_id, id, value)
        .await
        .map_err(feed_to_api)?;

    Ok(Json(entry))
}

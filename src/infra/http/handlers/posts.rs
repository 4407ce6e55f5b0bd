//! Posts handlers

use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::{PageQuery, listing_to_api, parse_page};
use crate::infra::http::auth::{CurrentUser, Viewer};
use crate::infra::http::error::ApiError;
use crate::infra::http::extract::ApiJson;
use crate::infra::http::models::PostCreateRequest;
use crate::infra::http::state::ApiState;

pub async fn list_posts(
    State(state): State<ApiState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = parse_page(query.page.as_deref())?;
    let posts = state
        .listing
        .list_posts(viewer.user_id(), page)
        .await
        .map_err(listing_to_api)?;

    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<ApiState>,
    CurrentUser(principal): CurrentUser,
    ApiJson(payload): ApiJson<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .listing
        .create_post(principal.user_id, &payload.title, &payload.content)
        .await
        .map_err(listing_to_api)?;

    Ok((StatusCode::CREATED, Json(post)))
}

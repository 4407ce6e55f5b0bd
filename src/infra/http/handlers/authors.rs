//! Author directory handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::{AuthorListQuery, listing_to_api, parse_page, subscription_to_api};
use crate::application::listing::AuthorQuery;
use crate::domain::types::AuthorOrdering;
use crate::infra::http::auth::CurrentUser;
use crate::infra::http::error::ApiError;
use crate::infra::http::extract::ApiJson;
use crate::infra::http::models::{AuthorResponse, SubscribeRequest, SubscriptionResponse};
use crate::infra::http::state::ApiState;

pub async fn list_authors(
    State(state): State<ApiState>,
    Query(query): Query<AuthorListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = parse_page(query.page.as_deref())?;

    let count_post = match query.count_post.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            ApiError::validation("Invalid count_post", Some(raw.to_string()))
        })?),
    };
    let ordering = match query.o.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<AuthorOrdering>()
                .map_err(|err| ApiError::validation("Invalid ordering", Some(err.to_string())))?,
        ),
    };

    let authors = state
        .listing
        .list_authors(
            AuthorQuery {
                count_post,
                ordering,
            },
            page,
        )
        .await
        .map_err(listing_to_api)?;

    Ok(Json(authors.map(AuthorResponse::from)))
}

/// Subscribe the caller to the author named in the body.
pub async fn subscribe_author(
    State(state): State<ApiState>,
    CurrentUser(principal): CurrentUser,
    ApiJson(payload): ApiJson<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let edge = state
        .subscriptions
        .subscribe(principal.user_id, &payload.author)
        .await
        .map_err(subscription_to_api)?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(edge))))
}

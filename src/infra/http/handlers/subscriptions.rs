//! Subscription handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::subscription_to_api;
use crate::infra::http::auth::CurrentUser;
use crate::infra::http::error::ApiError;
use crate::infra::http::extract::ApiJson;
use crate::infra::http::models::{SubscriptionResponse, UnsubscribeRequest};
use crate::infra::http::state::ApiState;

pub async fn list_subscriptions(
    State(state): State<ApiState>,
    CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let edges = state
        .subscriptions
        .list_subscriptions(principal.user_id)
        .await
        .map_err(subscription_to_api)?;

    let body: Vec<SubscriptionResponse> =
        edges.into_iter().map(SubscriptionResponse::from).collect();
    Ok(Json(body))
}

pub async fn unsubscribe(
    State(state): State<ApiState>,
    CurrentUser(principal): CurrentUser,
    ApiJson(payload): ApiJson<UnsubscribeRequest>,
) -> Result<Response, ApiError> {
    let removed = state
        .subscriptions
        .unsubscribe(principal.user_id, payload.author)
        .await
        .map_err(subscription_to_api)?;

    if removed {
        let body = SubscriptionResponse {
            author: payload.author,
            subscriber: principal.user_id,
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

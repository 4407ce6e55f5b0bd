//! Registration handler

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::identity_to_api;
use crate::infra::http::error::ApiError;
use crate::infra::http::extract::ApiJson;
use crate::infra::http::models::{RegisterRequest, RegisterResponse};
use crate::infra::http::state::ApiState;

pub async fn register_user(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let registered = state
        .identity
        .register(&payload.username)
        .await
        .map_err(identity_to_api)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(registered))))
}

//! Token authentication.
//!
//! `resolve_viewer` runs on every request and attaches a [`Viewer`]. Routes
//! that need a signed-in caller take [`CurrentUser`], which rejects anonymous
//! requests before the handler body runs.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::identity::{AuthError, Principal};

use super::error::{ApiError, codes};
use super::state::ApiState;

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(Principal),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::User(principal) => Some(principal.user_id),
        }
    }
}

/// Extractor for routes that require a signed-in caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Viewer>() {
            Some(Viewer::User(principal)) => Ok(Self(principal.clone())),
            _ => Err(ApiError::unauthorized()),
        }
    }
}

pub async fn resolve_viewer(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let viewer = match extract_token(request.headers().get(header::AUTHORIZATION)) {
        Err(AuthError::Missing) => Viewer::Anonymous,
        Err(err) => return auth_rejection(err).into_response(),
        Ok(token) => match state.identity.authenticate(token).await {
            Ok(principal) => Viewer::User(principal),
            Err(err) => return auth_rejection(err).into_response(),
        },
    };

    request.extensions_mut().insert(viewer.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(viewer);
    response
}

fn auth_rejection(err: AuthError) -> ApiError {
    match err {
        AuthError::Unavailable => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            "Credential store unavailable",
            None,
        ),
        AuthError::Missing | AuthError::Invalid => ApiError::unauthorized(),
    }
}

/// Accepts `Token <t>` and `Bearer <t>`.
fn extract_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let Some(header) = header else {
        return Err(AuthError::Missing);
    };
    let raw = header.to_str().map_err(|_| AuthError::Invalid)?.trim();
    let token = raw
        .strip_prefix("Token ")
        .or_else(|| raw.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::Invalid)?;

    if token.is_empty() {
        return Err(AuthError::Invalid);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_schemes() {
        let token = HeaderValue::from_static("Token pl_abc_secret");
        assert_eq!(extract_token(Some(&token)), Ok("pl_abc_secret"));

        let bearer = HeaderValue::from_static("Bearer pl_abc_secret");
        assert_eq!(extract_token(Some(&bearer)), Ok("pl_abc_secret"));
    }

    #[test]
    fn missing_and_malformed_headers_differ() {
        assert_eq!(extract_token(None), Err(AuthError::Missing));

        let basic = HeaderValue::from_static("Basic Zm9vOmJhcg==");
        assert_eq!(extract_token(Some(&basic)), Err(AuthError::Invalid));

        let empty = HeaderValue::from_static("Token   ");
        assert_eq!(extract_token(Some(&empty)), Err(AuthError::Invalid));
    }

    #[test]
    fn store_outage_is_not_reported_as_bad_credentials() {
        let unavailable = auth_rejection(AuthError::Unavailable);
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.code(), codes::UNAVAILABLE);

        let invalid = auth_rejection(AuthError::Invalid);
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
    }
}

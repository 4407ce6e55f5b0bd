//! HTTP surface: JSON API router, authentication and response logging.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::application::error::ErrorReport;

/// Assemble the full router. Layers run outermost first: request context,
/// response logging, then viewer resolution.
pub fn build_router(state: ApiState) -> Router {
    let auth_state = state.clone();

    Router::new()
        .route("/api/auth/users", post(handlers::register_user))
        .route(
            "/api/post",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/authors",
            get(handlers::list_authors).post(handlers::subscribe_author),
        )
        .route(
            "/api/subscribe",
            get(handlers::list_subscriptions).delete(handlers::unsubscribe),
        )
        .route("/api/post_subscribe", get(handlers::list_feed))
        .route(
            "/api/post_subscribe/{id}",
            get(handlers::get_feed_post)
                .put(handlers::set_read_state)
                .patch(handlers::set_read_state),
        )
        .route("/health", get(health))
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth::resolve_viewer,
        ))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn health(State(state): State<ApiState>) -> Response {
    match state.health.ping().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

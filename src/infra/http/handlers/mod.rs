//! API handlers organized by resource type.
//!
//! Error conversions shared by every resource live here.

mod auth;
mod authors;
mod feed;
mod posts;
mod subscriptions;

pub use auth::*;
pub use authors::*;
pub use feed::*;
pub use posts::*;
pub use subscriptions::*;

// ----- Shared query structs -----

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedListQuery {
    pub page: Option<String>,
    pub is_read: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorListQuery {
    pub count_post: Option<String>,
    pub o: Option<String>,
    pub page: Option<String>,
}

// ----- Shared error conversions -----

use axum::http::StatusCode;

use crate::application::feed::FeedError;
use crate::application::identity::IdentityError;
use crate::application::listing::ListingError;
use crate::application::pagination::parse_page_number;
use crate::application::repos::RepoError;
use crate::application::subscriptions::SubscriptionError;
use crate::domain::error::DomainError;

use super::error::{ApiError, codes};

pub(crate) fn parse_page(raw: Option<&str>) -> Result<u32, ApiError> {
    parse_page_number(raw)
        .map_err(|err| ApiError::validation("Invalid page", Some(err.to_string())))
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    ApiError::validation("Request could not be processed", Some(err.to_string()))
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn identity_to_api(err: IdentityError) -> ApiError {
    match err {
        IdentityError::Domain(domain) => domain_to_api(domain),
        IdentityError::UsernameTaken(username) => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Username already taken",
            Some(username),
        ),
        IdentityError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn subscription_to_api(err: SubscriptionError) -> ApiError {
    match err {
        SubscriptionError::SelfSubscription => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::SELF_SUBSCRIPTION,
            "You cannot subscribe to yourself",
            None,
        ),
        SubscriptionError::Duplicate => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Subscription already exists",
            None,
        ),
        SubscriptionError::UnknownAuthor(username) => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::UNKNOWN_AUTHOR,
            "Author does not exist",
            Some(username),
        ),
        SubscriptionError::Validation(domain) => domain_to_api(domain),
        SubscriptionError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn feed_to_api(err: FeedError) -> ApiError {
    match err {
        FeedError::NotFound => ApiError::not_found("post not found"),
        FeedError::Validation(domain) => domain_to_api(domain),
        FeedError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn listing_to_api(err: ListingError) -> ApiError {
    match err {
        ListingError::Validation(domain) => domain_to_api(domain),
        ListingError::Repo(repo) => repo_to_api(repo),
    }
}

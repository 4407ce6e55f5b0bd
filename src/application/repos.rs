//! Repository traits describing persistence adapters.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    AuthTokenRecord, AuthorRecord, PostRecord, SubscriptionRecord, UserRecord,
};
use crate::domain::types::ReadFilter;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct CreateAuthTokenParams {
    pub user_id: Uuid,
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
}

/// Selects the posts making up one subscriber's feed.
#[derive(Debug, Clone, Copy)]
pub struct FeedQuery<'a> {
    pub authors: &'a [Uuid],
    pub reader_id: Uuid,
    pub read: ReadFilter,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    /// Usernames for `ids`. Unknown ids are absent from the map.
    async fn find_usernames(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError>;

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError>;

    /// Every user with their post count, ordered by username.
    async fn list_authors(&self) -> Result<Vec<AuthorRecord>, RepoError>;
}

#[async_trait]
pub trait AuthTokensRepo: Send + Sync {
    async fn create_token(&self, params: CreateAuthTokenParams)
    -> Result<AuthTokenRecord, RepoError>;

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<AuthTokenRecord>, RepoError>;
}

/// Read side of the post store. Every list is ordered newest first.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// All posts, or all posts not written by `exclude_author`.
    async fn list_posts(&self, exclude_author: Option<Uuid>) -> Result<Vec<PostRecord>, RepoError>;

    async fn list_feed(
        &self,
        query: FeedQuery<'_>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_feed(&self, query: FeedQuery<'_>) -> Result<u64, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;
}

#[async_trait]
pub trait SubscriptionsRepo: Send + Sync {
    async fn list_for_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscriptionRecord>, RepoError>;

    async fn exists(&self, author_id: Uuid, subscriber_id: Uuid) -> Result<bool, RepoError>;

    /// Insert an edge. A second insert of the same pair fails with `Duplicate`.
    async fn create(
        &self,
        author_id: Uuid,
        subscriber_id: Uuid,
    ) -> Result<SubscriptionRecord, RepoError>;

    /// Remove an edge, reporting whether one existed.
    async fn delete(&self, author_id: Uuid, subscriber_id: Uuid) -> Result<bool, RepoError>;
}

/// Per-post read-sets. Membership is a set: adding or removing twice is a no-op.
#[async_trait]
pub trait ReadMarksRepo: Send + Sync {
    async fn is_read(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// Batch membership test: which of `post_ids` has `user_id` read.
    async fn read_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError>;

    async fn mark_read(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;

    async fn mark_unread(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}

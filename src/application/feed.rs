//! Subscriber feed: posts by followed authors, annotated with read state.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::application::pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest};
use crate::application::repos::{
    FeedQuery, PostsRepo, ReadMarksRepo, RepoError, SubscriptionsRepo, UsersRepo,
};
use crate::domain::entities::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::types::ReadFilter;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A post as seen by one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub post: PostRecord,
    /// Username of the post's author.
    pub author: String,
    pub is_read: bool,
}

#[derive(Clone)]
pub struct FeedService {
    subscriptions: Arc<dyn SubscriptionsRepo>,
    posts: Arc<dyn PostsRepo>,
    read_marks: Arc<dyn ReadMarksRepo>,
    users: Arc<dyn UsersRepo>,
    page_size: u32,
}

impl FeedService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionsRepo>,
        posts: Arc<dyn PostsRepo>,
        read_marks: Arc<dyn ReadMarksRepo>,
        users: Arc<dyn UsersRepo>,
    ) -> Self {
        Self {
            subscriptions,
            posts,
            read_marks,
            users,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Authors `subscriber_id` follows. Never contains the subscriber.
    pub async fn resolve_followed_authors(
        &self,
        subscriber_id: Uuid,
    ) -> Result<BTreeSet<Uuid>, FeedError> {
        let edges = self
            .subscriptions
            .list_for_subscriber(subscriber_id)
            .await?;
        Ok(edges
            .into_iter()
            .map(|edge| edge.author_id)
            .filter(|author_id| *author_id != subscriber_id)
            .collect())
    }

    /// One page of the feed, newest first, optionally filtered by read state.
    pub async fn feed_page(
        &self,
        subscriber_id: Uuid,
        read: ReadFilter,
        page: u32,
    ) -> Result<Page<FeedEntry>, FeedError> {
        let request = PageRequest::new(page, self.page_size).map_err(DomainError::from)?;
        let authors: Vec<Uuid> = self
            .resolve_followed_authors(subscriber_id)
            .await?
            .into_iter()
            .collect();

        if authors.is_empty() {
            return Ok(Page::new(Vec::new(), 0, request));
        }

        let query = FeedQuery {
            authors: &authors,
            reader_id: subscriber_id,
            read,
        };
        let count = self.posts.count_feed(query).await?;
        let posts = if request.offset() >= count {
            Vec::new()
        } else {
            self.posts
                .list_feed(query, request.limit(), request.offset())
                .await?
        };

        let ids: Vec<Uuid> = posts.iter().map(|post| post.id).collect();
        let (read_ids, authors) = if ids.is_empty() {
            Default::default()
        } else {
            let author_ids: Vec<Uuid> = posts
                .iter()
                .map(|post| post.author_id)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            (
                self.read_marks.read_post_ids(subscriber_id, &ids).await?,
                self.users.find_usernames(&author_ids).await?,
            )
        };

        let entries = posts
            .into_iter()
            .map(|post| {
                let is_read = read_ids.contains(&post.id);
                let author = author_name(&authors, post.author_id);
                FeedEntry {
                    post,
                    author,
                    is_read,
                }
            })
            .collect();

        debug!(
            target = "postline::feed",
            %subscriber_id,
            page = request.page(),
            count,
            "feed page resolved"
        );

        Ok(Page::new(entries, count, request))
    }

    /// A single feed post. Posts outside the follow-set are reported as absent.
    pub async fn feed_post(
        &self,
        subscriber_id: Uuid,
        post_id: Uuid,
    ) -> Result<FeedEntry, FeedError> {
        let post = self.visible_post(subscriber_id, post_id).await?;
        let is_read = self.read_marks.is_read(post.id, subscriber_id).await?;
        let author = self.author_of(&post).await?;
        Ok(FeedEntry {
            post,
            author,
            is_read,
        })
    }

    /// Set the caller's read flag on a visible post. Repeating a call is a no-op.
    pub async fn set_read_state(
        &self,
        subscriber_id: Uuid,
        post_id: Uuid,
        value: bool,
    ) -> Result<FeedEntry, FeedError> {
        let post = self.visible_post(subscriber_id, post_id).await?;

        if value {
            self.read_marks.mark_read(post.id, subscriber_id).await?;
        } else {
            self.read_marks.mark_unread(post.id, subscriber_id).await?;
        }

        debug!(
            target = "postline::feed",
            %subscriber_id,
            %post_id,
            is_read = value,
            "read state updated"
        );

        let author = self.author_of(&post).await?;
        Ok(FeedEntry {
            post,
            author,
            is_read: value,
        })
    }

    async fn author_of(&self, post: &PostRecord) -> Result<String, FeedError> {
        let names = self.users.find_usernames(&[post.author_id]).await?;
        Ok(author_name(&names, post.author_id))
    }

    async fn visible_post(
        &self,
        subscriber_id: Uuid,
        post_id: Uuid,
    ) -> Result<PostRecord, FeedError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(FeedError::NotFound)?;

        if post.author_id == subscriber_id {
            return Err(FeedError::NotFound);
        }

        if !self
            .subscriptions
            .exists(post.author_id, subscriber_id)
            .await?
        {
            return Err(FeedError::NotFound);
        }

        Ok(post)
    }
}

/// Authors cascade-delete their posts, so a missing name only shows up mid-race.
fn author_name(names: &HashMap<Uuid, String>, author_id: Uuid) -> String {
    names.get(&author_id).cloned().unwrap_or_default()
}

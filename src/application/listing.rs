//! Non-feed post listing, the author directory and post authoring.
//!
//! Both listings are served from [`ListingCache`] snapshots when the cache is
//! enabled. Creating a post never touches the cache, so a fresh post shows up
//! in listings only once the cached snapshot has expired.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest};
use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UsersRepo,
};
use crate::cache::{CacheKey, ListingCache};
use crate::domain::entities::{AuthorRecord, PostRecord};
use crate::domain::error::DomainError;
use crate::domain::posts::PostDraft;
use crate::domain::types::AuthorOrdering;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Filters applied to the author listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorQuery {
    /// Keep only authors with exactly this many posts.
    pub count_post: Option<u64>,
    pub ordering: Option<AuthorOrdering>,
}

#[derive(Clone)]
pub struct ListingService {
    posts: Arc<dyn PostsRepo>,
    posts_write: Arc<dyn PostsWriteRepo>,
    users: Arc<dyn UsersRepo>,
    cache: Option<Arc<ListingCache>>,
    page_size: u32,
}

impl ListingService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        posts_write: Arc<dyn PostsWriteRepo>,
        users: Arc<dyn UsersRepo>,
        cache: Option<Arc<ListingCache>>,
    ) -> Self {
        Self {
            posts,
            posts_write,
            users,
            cache,
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

    /// Every post newest first, minus the viewer's own when signed in.
    pub async fn list_posts(
        &self,
        viewer: Option<Uuid>,
        page: u32,
    ) -> Result<Page<PostRecord>, ListingError> {
        let request = PageRequest::new(page, self.page_size).map_err(DomainError::from)?;
        let posts = self.post_snapshot(viewer).await?;
        Ok(Page::from_slice(&posts, request))
    }

    /// Every user with their post count, filtered and ordered per `query`.
    pub async fn list_authors(
        &self,
        query: AuthorQuery,
        page: u32,
    ) -> Result<Page<AuthorRecord>, ListingError> {
        let request = PageRequest::new(page, self.page_size).map_err(DomainError::from)?;
        let snapshot = self.author_snapshot().await?;

        let mut authors: Vec<AuthorRecord> = snapshot
            .iter()
            .filter(|author| {
                query
                    .count_post
                    .is_none_or(|count| author.post_count == count)
            })
            .cloned()
            .collect();

        match query.ordering {
            Some(AuthorOrdering::PostCountAsc) => authors.sort_by_key(|author| author.post_count),
            Some(AuthorOrdering::PostCountDesc) => {
                authors.sort_by(|a, b| b.post_count.cmp(&a.post_count))
            }
            None => {}
        }

        Ok(Page::from_slice(&authors, request))
    }

    pub async fn create_post(
        &self,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<PostRecord, ListingError> {
        let draft = PostDraft::new(title, content)?;
        let post = self
            .posts_write
            .create_post(CreatePostParams {
                author_id,
                title: draft.title,
                content: draft.content,
            })
            .await?;

        info!(
            target = "postline::listing",
            post_id = %post.id,
            %author_id,
            "post created"
        );
        Ok(post)
    }

    async fn post_snapshot(&self, viewer: Option<Uuid>) -> Result<Arc<[PostRecord]>, ListingError> {
        let key = CacheKey::posts_for(viewer);
        if let Some(cache) = self.cache.as_ref()
            && let Some(posts) = cache.get_posts(&key)
        {
            return Ok(posts);
        }

        let posts: Arc<[PostRecord]> = self.posts.list_posts(viewer).await?.into();
        if let Some(cache) = self.cache.as_ref() {
            debug!(target = "postline::listing", %key, count = posts.len(), "caching post listing");
            cache.set_posts(key, Arc::clone(&posts));
        }
        Ok(posts)
    }

    async fn author_snapshot(&self) -> Result<Arc<[AuthorRecord]>, ListingError> {
        if let Some(cache) = self.cache.as_ref()
            && let Some(authors) = cache.get_authors()
        {
            return Ok(authors);
        }

        let authors: Arc<[AuthorRecord]> = self.users.list_authors().await?.into();
        if let Some(cache) = self.cache.as_ref() {
            debug!(
                target = "postline::listing",
                key = %CacheKey::Authors,
                count = authors.len(),
                "caching author listing"
            );
            cache.set_authors(Arc::clone(&authors));
        }
        Ok(authors)
    }
}

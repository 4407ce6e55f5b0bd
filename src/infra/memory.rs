//! In-process repository implementations.
//!
//! Backs the integration tests and `serve` runs without a configured
//! database. State lives behind one async mutex and is lost on exit.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::repos::{
    AuthTokensRepo, CreateAuthTokenParams, CreatePostParams, CreateUserParams, FeedQuery,
    HealthRepo, PostsRepo, PostsWriteRepo, ReadMarksRepo, RepoError, SubscriptionsRepo, UsersRepo,
};
use crate::domain::entities::{
    AuthTokenRecord, AuthorRecord, PostRecord, SubscriptionRecord, UserRecord,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, UserRecord>,
    tokens: HashMap<String, AuthTokenRecord>,
    posts: Vec<PostRecord>,
    subscriptions: Vec<SubscriptionRecord>,
    reads: HashSet<(Uuid, Uuid)>,
    last_post_at: Option<OffsetDateTime>,
}

impl MemoryState {
    /// Posts newest first, ties broken by id descending.
    fn sorted_posts<'a>(&'a self, keep: impl Fn(&PostRecord) -> bool) -> Vec<&'a PostRecord> {
        let mut posts: Vec<&PostRecord> = self.posts.iter().filter(|&post| keep(post)).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    fn in_feed(&self, post: &PostRecord, query: &FeedQuery<'_>) -> bool {
        query.authors.contains(&post.author_id)
            && query
                .read
                .matches(self.reads.contains(&(post.id, query.reader_id)))
    }

    /// Creation time strictly after the previous post so ordering is stable.
    fn next_post_time(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let at = match self.last_post_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_post_at = Some(at);
        at
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepositories {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepo for MemoryRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|user| user.username == params.username)
        {
            return Err(RepoError::Duplicate {
                constraint: "users_username_key".to_string(),
            });
        }

        let user = UserRecord {
            id: Uuid::new_v4(),
            username: params.username,
            created_at: OffsetDateTime::now_utc(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_usernames(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .users
                    .get(id)
                    .map(|user| (user.id, user.username.clone()))
            })
            .collect())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        state.users.remove(&id);
        state.tokens.retain(|_, token| token.user_id != id);
        Ok(())
    }

    async fn list_authors(&self) -> Result<Vec<AuthorRecord>, RepoError> {
        let state = self.state.lock().await;
        let mut authors: Vec<AuthorRecord> = state
            .users
            .values()
            .map(|user| AuthorRecord {
                id: user.id,
                username: user.username.clone(),
                post_count: state
                    .posts
                    .iter()
                    .filter(|post| post.author_id == user.id)
                    .count() as u64,
            })
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(authors)
    }
}

#[async_trait]
impl AuthTokensRepo for MemoryRepositories {
    async fn create_token(
        &self,
        params: CreateAuthTokenParams,
    ) -> Result<AuthTokenRecord, RepoError> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&params.user_id) {
            return Err(RepoError::InvalidInput {
                message: format!("user {} does not exist", params.user_id),
            });
        }
        if state.tokens.contains_key(&params.prefix) {
            return Err(RepoError::Duplicate {
                constraint: "auth_tokens_prefix_key".to_string(),
            });
        }

        let record = AuthTokenRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            prefix: params.prefix,
            hashed_secret: params.hashed_secret,
            created_at: OffsetDateTime::now_utc(),
        };
        state.tokens.insert(record.prefix.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<AuthTokenRecord>, RepoError> {
        Ok(self.state.lock().await.tokens.get(prefix).cloned())
    }
}

#[async_trait]
impl PostsRepo for MemoryRepositories {
    async fn list_posts(&self, exclude_author: Option<Uuid>) -> Result<Vec<PostRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .sorted_posts(|post| Some(post.author_id) != exclude_author)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn list_feed(
        &self,
        query: FeedQuery<'_>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let state = self.state.lock().await;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(state
            .sorted_posts(|post| state.in_feed(post, &query))
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_feed(&self, query: FeedQuery<'_>) -> Result<u64, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .iter()
            .filter(|post| state.in_feed(post, &query))
            .count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .await
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&params.author_id) {
            return Err(RepoError::InvalidInput {
                message: format!("author {} does not exist", params.author_id),
            });
        }

        let created_at = state.next_post_time();
        let post = PostRecord {
            id: Uuid::new_v4(),
            author_id: params.author_id,
            title: params.title,
            content: params.content,
            created_at,
            updated_at: created_at,
        };
        state.posts.push(post.clone());
        Ok(post)
    }
}

#[async_trait]
impl SubscriptionsRepo for MemoryRepositories {
    async fn list_for_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscriptionRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .subscriptions
            .iter()
            .filter(|edge| edge.subscriber_id == subscriber_id)
            .cloned()
            .collect())
    }

    async fn exists(&self, author_id: Uuid, subscriber_id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .state
            .lock()
            .await
            .subscriptions
            .iter()
            .any(|edge| edge.author_id == author_id && edge.subscriber_id == subscriber_id))
    }

    async fn create(
        &self,
        author_id: Uuid,
        subscriber_id: Uuid,
    ) -> Result<SubscriptionRecord, RepoError> {
        let mut state = self.state.lock().await;
        if author_id == subscriber_id {
            return Err(RepoError::Integrity {
                message: "subscriptions_no_self".to_string(),
            });
        }
        if !state.users.contains_key(&author_id) || !state.users.contains_key(&subscriber_id) {
            return Err(RepoError::InvalidInput {
                message: "subscription references an unknown user".to_string(),
            });
        }
        if state
            .subscriptions
            .iter()
            .any(|edge| edge.author_id == author_id && edge.subscriber_id == subscriber_id)
        {
            return Err(RepoError::Duplicate {
                constraint: "subscriptions_pkey".to_string(),
            });
        }

        let edge = SubscriptionRecord {
            author_id,
            subscriber_id,
            created_at: OffsetDateTime::now_utc(),
        };
        state.subscriptions.push(edge.clone());
        Ok(edge)
    }

    async fn delete(&self, author_id: Uuid, subscriber_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.lock().await;
        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|edge| !(edge.author_id == author_id && edge.subscriber_id == subscriber_id));
        Ok(state.subscriptions.len() < before)
    }
}

#[async_trait]
impl ReadMarksRepo for MemoryRepositories {
    async fn is_read(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.state.lock().await.reads.contains(&(post_id, user_id)))
    }

    async fn read_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.lock().await;
        Ok(post_ids
            .iter()
            .copied()
            .filter(|post_id| state.reads.contains(&(*post_id, user_id)))
            .collect())
    }

    async fn mark_read(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        self.state.lock().await.reads.insert((post_id, user_id));
        Ok(())
    }

    async fn mark_unread(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        self.state.lock().await.reads.remove(&(post_id, user_id));
        Ok(())
    }
}

#[async_trait]
impl HealthRepo for MemoryRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

//! Subscription manager: validates and mutates follow edges.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::repos::{RepoError, SubscriptionsRepo, UsersRepo};
use crate::domain::entities::SubscriptionRecord;
use crate::domain::error::DomainError;
use crate::domain::subscriptions::is_self_subscription;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("you cannot subscribe to yourself")]
    SelfSubscription,
    #[error("subscription already exists")]
    Duplicate,
    #[error("author `{0}` does not exist")]
    UnknownAuthor(String),
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for SubscriptionError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { .. } => Self::Duplicate,
            other => Self::Repo(other),
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionService {
    users: Arc<dyn UsersRepo>,
    subscriptions: Arc<dyn SubscriptionsRepo>,
}

impl SubscriptionService {
    pub fn new(users: Arc<dyn UsersRepo>, subscriptions: Arc<dyn SubscriptionsRepo>) -> Self {
        Self {
            users,
            subscriptions,
        }
    }

    /// Follow the author named `author_username` on behalf of `subscriber_id`.
    pub async fn subscribe(
        &self,
        subscriber_id: Uuid,
        author_username: &str,
    ) -> Result<SubscriptionRecord, SubscriptionError> {
        let username = author_username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("author", "must not be empty").into());
        }

        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| SubscriptionError::UnknownAuthor(username.to_string()))?;

        if is_self_subscription(author.id, subscriber_id) {
            return Err(SubscriptionError::SelfSubscription);
        }

        if self.subscriptions.exists(author.id, subscriber_id).await? {
            return Err(SubscriptionError::Duplicate);
        }

        // A concurrent insert of the same pair surfaces as `Duplicate` via `From<RepoError>`.
        let edge = self.subscriptions.create(author.id, subscriber_id).await?;
        info!(
            target = "postline::subscriptions",
            author_id = %edge.author_id,
            subscriber_id = %edge.subscriber_id,
            "subscription created"
        );
        Ok(edge)
    }

    pub async fn list_subscriptions(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscriptionRecord>, SubscriptionError> {
        Ok(self
            .subscriptions
            .list_for_subscriber(subscriber_id)
            .await?)
    }

    /// Drop the caller's edge to `author_id`. Returns `false` when there was none.
    pub async fn unsubscribe(
        &self,
        subscriber_id: Uuid,
        author_id: Uuid,
    ) -> Result<bool, SubscriptionError> {
        let removed = self.subscriptions.delete(author_id, subscriber_id).await?;
        debug!(
            target = "postline::subscriptions",
            %author_id,
            %subscriber_id,
            removed,
            "unsubscribe"
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::repos::CreateUserParams;
    use crate::infra::memory::MemoryRepositories;

    /// Loses the race: the pre-check sees no edge, the insert hits the constraint.
    struct RacingSubscriptions;

    #[async_trait]
    impl SubscriptionsRepo for RacingSubscriptions {
        async fn list_for_subscriber(
            &self,
            _subscriber_id: Uuid,
        ) -> Result<Vec<SubscriptionRecord>, RepoError> {
            Ok(Vec::new())
        }

        async fn exists(&self, _author_id: Uuid, _subscriber_id: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }

        async fn create(
            &self,
            _author_id: Uuid,
            _subscriber_id: Uuid,
        ) -> Result<SubscriptionRecord, RepoError> {
            Err(RepoError::Duplicate {
                constraint: "subscriptions_pkey".to_string(),
            })
        }

        async fn delete(&self, _author_id: Uuid, _subscriber_id: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }
    }

    struct FailingSubscriptions;

    #[async_trait]
    impl SubscriptionsRepo for FailingSubscriptions {
        async fn list_for_subscriber(
            &self,
            _subscriber_id: Uuid,
        ) -> Result<Vec<SubscriptionRecord>, RepoError> {
            Err(RepoError::Timeout)
        }

        async fn exists(&self, _author_id: Uuid, _subscriber_id: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }

        async fn create(
            &self,
            author_id: Uuid,
            subscriber_id: Uuid,
        ) -> Result<SubscriptionRecord, RepoError> {
            Err(RepoError::Integrity {
                message: format!("edge {author_id}/{subscriber_id} rejected"),
            })
        }

        async fn delete(&self, _author_id: Uuid, _subscriber_id: Uuid) -> Result<bool, RepoError> {
            Err(RepoError::Timeout)
        }
    }

    async fn users_with(names: &[&str]) -> (Arc<MemoryRepositories>, Vec<Uuid>) {
        let users = Arc::new(MemoryRepositories::new());
        let mut ids = Vec::new();
        for name in names {
            let user = users
                .create_user(CreateUserParams {
                    username: (*name).to_string(),
                })
                .await
                .expect("user should be created");
            ids.push(user.id);
        }
        (users, ids)
    }

    #[tokio::test]
    async fn unique_violation_on_insert_is_a_duplicate() {
        let (users, ids) = users_with(&["alice", "bob"]).await;
        let service = SubscriptionService::new(users, Arc::new(RacingSubscriptions));

        let err = service
            .subscribe(ids[0], "bob")
            .await
            .expect_err("racing insert must fail");
        assert!(matches!(err, SubscriptionError::Duplicate));
    }

    #[tokio::test]
    async fn other_store_failures_stay_repo_errors() {
        let (users, ids) = users_with(&["alice", "bob"]).await;
        let service = SubscriptionService::new(users, Arc::new(FailingSubscriptions));

        let err = service.subscribe(ids[0], "bob").await.unwrap_err();
        assert!(matches!(err, SubscriptionError::Repo(RepoError::Integrity { .. })));

        let err = service.list_subscriptions(ids[0]).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::Repo(RepoError::Timeout)));
    }
}

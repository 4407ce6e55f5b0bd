use std::sync::Arc;

use crate::application::feed::FeedService;
use crate::application::identity::IdentityService;
use crate::application::listing::ListingService;
use crate::application::repos::{
    AuthTokensRepo, HealthRepo, PostsRepo, PostsWriteRepo, ReadMarksRepo, SubscriptionsRepo,
    UsersRepo,
};
use crate::application::subscriptions::SubscriptionService;
use crate::cache::ListingCache;

#[derive(Clone)]
pub struct ApiState {
    pub identity: Arc<IdentityService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub feed: Arc<FeedService>,
    pub listing: Arc<ListingService>,
    pub health: Arc<dyn HealthRepo>,
}

impl ApiState {
    /// Wire every service against one backend implementing all repository traits.
    pub fn from_repositories<R>(
        repositories: Arc<R>,
        cache: Option<Arc<ListingCache>>,
        page_size: u32,
    ) -> Self
    where
        R: UsersRepo
            + AuthTokensRepo
            + PostsRepo
            + PostsWriteRepo
            + SubscriptionsRepo
            + ReadMarksRepo
            + HealthRepo
            + 'static,
    {
        let users: Arc<dyn UsersRepo> = repositories.clone();
        let tokens: Arc<dyn AuthTokensRepo> = repositories.clone();
        let posts: Arc<dyn PostsRepo> = repositories.clone();
        let posts_write: Arc<dyn PostsWriteRepo> = repositories.clone();
        let subscriptions: Arc<dyn SubscriptionsRepo> = repositories.clone();
        let read_marks: Arc<dyn ReadMarksRepo> = repositories.clone();
        let health: Arc<dyn HealthRepo> = repositories;

        let identity = IdentityService::new(users.clone(), tokens);
        let subscription_service = SubscriptionService::new(users.clone(), subscriptions.clone());
        let feed = FeedService::new(subscriptions, posts.clone(), read_marks, users.clone())
            .with_page_size(page_size);
        let listing =
            ListingService::new(posts, posts_write, users, cache).with_page_size(page_size);

        Self {
            identity: Arc::new(identity),
            subscriptions: Arc::new(subscription_service),
            feed: Arc::new(feed),
            listing: Arc::new(listing),
            health,
        }
    }
}

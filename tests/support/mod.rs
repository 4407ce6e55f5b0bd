#![allow(dead_code)]

use std::sync::Arc;

use postline::application::identity::Registered;
use postline::cache::{CacheConfig, ListingCache};
use postline::domain::entities::PostRecord;
use postline::infra::http::ApiState;
use postline::infra::memory::MemoryRepositories;

pub fn memory_state() -> ApiState {
    ApiState::from_repositories(Arc::new(MemoryRepositories::new()), None, 10)
}

pub fn cached_state(config: &CacheConfig) -> ApiState {
    let cache = Arc::new(ListingCache::new(config));
    ApiState::from_repositories(Arc::new(MemoryRepositories::new()), Some(cache), 10)
}

pub async fn register(state: &ApiState, username: &str) -> Registered {
    state
        .identity
        .register(username)
        .await
        .expect("registration should succeed")
}

pub async fn publish(state: &ApiState, author: &Registered, title: &str) -> PostRecord {
    state
        .listing
        .create_post(author.user.id, title, "body")
        .await
        .expect("post should be created")
}

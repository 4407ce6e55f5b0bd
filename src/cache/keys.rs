//! Cache key definitions.

use std::fmt;

use uuid::Uuid;

/// Keys of the listing cache. `Display` renders the wire form used in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Every post, for anonymous viewers.
    PostsAll,
    /// Every post not written by the given user.
    PostsExcluding(Uuid),
    /// Every user with their post count.
    Authors,
}

impl CacheKey {
    /// Key of the post listing seen by `viewer`.
    pub fn posts_for(viewer: Option<Uuid>) -> Self {
        match viewer {
            Some(user_id) => Self::PostsExcluding(user_id),
            None => Self::PostsAll,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostsAll => f.write_str("posts:all"),
            Self::PostsExcluding(user_id) => write!(f, "posts:excluding:{user_id}"),
            Self::Authors => f.write_str("authors"),
        }
    }
}

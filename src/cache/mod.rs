//! Listing cache.
//!
//! A TTL-bounded snapshot cache in front of the two expensive listing
//! queries:
//!
//! - `posts:all` / `posts:excluding:<user_id>`: the non-feed post listing
//! - `authors`: every user annotated with their post count
//!
//! Writes never invalidate. A cached listing may lag the store by up to one
//! TTL, configured under `[cache]` in `postline.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! capacity = 256
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::CacheKey;
pub use store::{ListingCache, TtlStore};

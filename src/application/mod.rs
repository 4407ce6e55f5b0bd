//! Application services layer.

pub mod error;
pub mod feed;
pub mod identity;
pub mod listing;
pub mod pagination;
pub mod repos;
pub mod subscriptions;

//! postline: subscriptions, a read-tracked subscriber feed and TTL-cached
//! listings for a small blogging backend.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

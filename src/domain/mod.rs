//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod posts;
pub mod subscriptions;
pub mod types;
pub mod users;

//! Follow-graph invariants.

use uuid::Uuid;

/// Rejects self-loops. The only structural rule an edge carries on its own;
/// uniqueness is enforced by the store.
pub fn is_self_subscription(author_id: Uuid, subscriber_id: Uuid) -> bool {
    author_id == subscriber_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_self_loop() {
        let id = Uuid::new_v4();
        assert!(is_self_subscription(id, id));
        assert!(!is_self_subscription(id, Uuid::new_v4()));
    }
}

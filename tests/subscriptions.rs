mod support;

use postline::application::subscriptions::SubscriptionError;

use support::{memory_state, register};

#[tokio::test]
async fn subscribing_to_self_is_rejected() {
    let state = memory_state();
    let alice = register(&state, "alice").await;

    let err = state
        .subscriptions
        .subscribe(alice.user.id, "alice")
        .await
        .expect_err("self subscription must fail");
    assert!(matches!(err, SubscriptionError::SelfSubscription));

    let edges = state
        .subscriptions
        .list_subscriptions(alice.user.id)
        .await
        .unwrap();
    assert!(edges.is_empty());
}

#[tokio::test]
async fn duplicate_subscription_keeps_a_single_edge() {
    let state = memory_state();
    let alice = register(&state, "alice").await;
    let bob = register(&state, "bob").await;

    let edge = state
        .subscriptions
        .subscribe(alice.user.id, "bob")
        .await
        .unwrap();
    assert_eq!(edge.author_id, bob.user.id);
    assert_eq!(edge.subscriber_id, alice.user.id);

    let err = state
        .subscriptions
        .subscribe(alice.user.id, "bob")
        .await
        .expect_err("second subscribe must fail");
    assert!(matches!(err, SubscriptionError::Duplicate));

    let edges = state
        .subscriptions
        .list_subscriptions(alice.user.id)
        .await
        .unwrap();
    assert_eq!(edges.len(), 1);
}

#[tokio::test]
async fn unknown_author_and_blank_name_are_distinct_errors() {
    let state = memory_state();
    let alice = register(&state, "alice").await;

    let unknown = state
        .subscriptions
        .subscribe(alice.user.id, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(unknown, SubscriptionError::UnknownAuthor(name) if name == "ghost"));

    let blank = state
        .subscriptions
        .subscribe(alice.user.id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(blank, SubscriptionError::Validation(_)));
}

#[tokio::test]
async fn unsubscribe_reports_whether_an_edge_existed() {
    let state = memory_state();
    let alice = register(&state, "alice").await;
    let bob = register(&state, "bob").await;

    let removed = state
        .subscriptions
        .unsubscribe(alice.user.id, bob.user.id)
        .await
        .unwrap();
    assert!(!removed, "no edge yet");

    state
        .subscriptions
        .subscribe(alice.user.id, "bob")
        .await
        .unwrap();
    assert!(
        state
            .subscriptions
            .unsubscribe(alice.user.id, bob.user.id)
            .await
            .unwrap()
    );
    assert!(
        !state
            .subscriptions
            .unsubscribe(alice.user.id, bob.user.id)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn unsubscribe_only_touches_the_callers_edge() {
    let state = memory_state();
    let alice = register(&state, "alice").await;
    let bob = register(&state, "bob").await;
    let carol = register(&state, "carol").await;

    state
        .subscriptions
        .subscribe(alice.user.id, "bob")
        .await
        .unwrap();

    let removed = state
        .subscriptions
        .unsubscribe(carol.user.id, bob.user.id)
        .await
        .unwrap();
    assert!(!removed);
    assert_eq!(
        state
            .subscriptions
            .list_subscriptions(alice.user.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

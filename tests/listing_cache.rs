mod support;

use std::time::Duration;

use postline::application::listing::{AuthorQuery, ListingError};
use postline::cache::CacheConfig;
use postline::domain::types::AuthorOrdering;

use support::{cached_state, memory_state, publish, register};

fn short_ttl() -> CacheConfig {
    CacheConfig {
        ttl: Duration::from_secs(60),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn cached_listing_is_stale_until_ttl_expires() {
    let state = cached_state(&short_ttl());
    let bob = register(&state, "bob").await;
    publish(&state, &bob, "first").await;

    let before = state.listing.list_posts(None, 1).await.unwrap();
    assert_eq!(before.count, 1);

    publish(&state, &bob, "second").await;
    tokio::time::advance(Duration::from_secs(30)).await;
    let within_ttl = state.listing.list_posts(None, 1).await.unwrap();
    assert_eq!(within_ttl, before, "writes never invalidate the cache");

    tokio::time::advance(Duration::from_secs(30)).await;
    let refreshed = state.listing.list_posts(None, 1).await.unwrap();
    assert_eq!(refreshed.count, 2);
    assert_eq!(refreshed.results[0].title, "second");
}

#[tokio::test(start_paused = true)]
async fn author_counts_are_cached_too() {
    let state = cached_state(&short_ttl());
    let bob = register(&state, "bob").await;

    let before = state
        .listing
        .list_authors(AuthorQuery::default(), 1)
        .await
        .unwrap();
    assert_eq!(before.results[0].post_count, 0);

    publish(&state, &bob, "post").await;
    let stale = state
        .listing
        .list_authors(AuthorQuery::default(), 1)
        .await
        .unwrap();
    assert_eq!(stale.results[0].post_count, 0);

    tokio::time::advance(Duration::from_secs(61)).await;
    let fresh = state
        .listing
        .list_authors(AuthorQuery::default(), 1)
        .await
        .unwrap();
    assert_eq!(fresh.results[0].post_count, 1);
}

#[tokio::test]
async fn uncached_listing_sees_writes_immediately() {
    let state = memory_state();
    let bob = register(&state, "bob").await;
    publish(&state, &bob, "first").await;
    assert_eq!(state.listing.list_posts(None, 1).await.unwrap().count, 1);

    publish(&state, &bob, "second").await;
    assert_eq!(state.listing.list_posts(None, 1).await.unwrap().count, 2);
}

#[tokio::test]
async fn signed_in_viewer_does_not_see_own_posts() {
    let state = cached_state(&short_ttl());
    let alice = register(&state, "alice").await;
    let bob = register(&state, "bob").await;
    publish(&state, &alice, "alice writes").await;
    publish(&state, &bob, "bob writes").await;

    let anonymous = state.listing.list_posts(None, 1).await.unwrap();
    assert_eq!(anonymous.count, 2);

    let for_alice = state
        .listing
        .list_posts(Some(alice.user.id), 1)
        .await
        .unwrap();
    assert_eq!(for_alice.count, 1);
    assert_eq!(for_alice.results[0].author_id, bob.user.id);
}

#[tokio::test]
async fn author_listing_filters_and_orders_by_post_count() {
    let state = memory_state();
    let alice = register(&state, "alice").await;
    let bob = register(&state, "bob").await;
    register(&state, "carol").await;
    for n in 0..3 {
        publish(&state, &bob, &format!("bob {n}")).await;
    }
    publish(&state, &alice, "alice").await;

    let descending = state
        .listing
        .list_authors(
            AuthorQuery {
                count_post: None,
                ordering: Some(AuthorOrdering::PostCountDesc),
            },
            1,
        )
        .await
        .unwrap();
    let counts: Vec<u64> = descending.results.iter().map(|a| a.post_count).collect();
    assert_eq!(counts, vec![3, 1, 0]);

    let ascending = state
        .listing
        .list_authors(
            AuthorQuery {
                count_post: None,
                ordering: Some(AuthorOrdering::PostCountAsc),
            },
            1,
        )
        .await
        .unwrap();
    assert_eq!(ascending.results[0].username, "carol");

    let exactly_one = state
        .listing
        .list_authors(
            AuthorQuery {
                count_post: Some(1),
                ordering: None,
            },
            1,
        )
        .await
        .unwrap();
    assert_eq!(exactly_one.count, 1);
    assert_eq!(exactly_one.results[0].username, "alice");
}

#[tokio::test]
async fn blank_post_title_is_rejected() {
    let state = memory_state();
    let alice = register(&state, "alice").await;

    let err = state
        .listing
        .create_post(alice.user.id, "   ", "body")
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::Validation(_)));
}

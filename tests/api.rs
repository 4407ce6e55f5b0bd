mod support;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use postline::infra::http::build_router;
use serde_json::{Value, json};
use tower::ServiceExt;

use support::memory_state;

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(router: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/auth/users",
        None,
        Some(json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        body["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn alice_and_bob_over_http() {
    let router = build_router(memory_state());
    let (alice_id, alice) = register(&router, "alice").await;
    let (bob_id, bob) = register(&router, "bob").await;

    let (status, post) = send(
        &router,
        Method::POST,
        "/api/post",
        Some(&bob),
        Some(json!({ "title": "hello", "content": "from bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = post["id"].as_str().unwrap().to_string();

    let (status, edge) = send(
        &router,
        Method::POST,
        "/api/authors",
        Some(&alice),
        Some(json!({ "author": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(edge["author"], bob_id.as_str());
    assert_eq!(edge["subscriber"], alice_id.as_str());

    let (status, feed) = send(&router, Method::GET, "/api/post_subscribe", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["count"], 1);
    assert_eq!(feed["results"][0]["id"], post_id.as_str());
    assert_eq!(feed["results"][0]["is_read"], false);
    assert_eq!(feed["results"][0]["author"], "bob");
    assert_eq!(feed["results"][0]["author_id"], bob_id.as_str());

    let uri = format!("/api/post_subscribe/{post_id}");
    let (status, entry) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "is_read": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["is_read"], true);
    assert_eq!(entry["author"], "bob");

    let (_, read) = send(
        &router,
        Method::GET,
        "/api/post_subscribe?is_read=true",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(read["count"], 1);

    let (status, entry) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&alice),
        Some(json!({ "is_read": "false" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["is_read"], false);

    let (status, _) = send(&router, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "bob does not follow himself");
}

#[tokio::test]
async fn required_routes_reject_anonymous_and_bad_tokens() {
    let router = build_router(memory_state());

    let (status, body) = send(&router, Method::GET, "/api/subscribe", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = send(&router, Method::GET, "/api/post", Some("pl_bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&router, Method::GET, "/api/post", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn subscription_errors_carry_stable_codes() {
    let router = build_router(memory_state());
    let (_, alice) = register(&router, "alice").await;
    register(&router, "bob").await;

    let cases = [
        ("alice", StatusCode::BAD_REQUEST, "self_subscription"),
        ("ghost", StatusCode::NOT_FOUND, "unknown_author"),
        ("", StatusCode::BAD_REQUEST, "validation"),
    ];
    for (author, status, code) in cases {
        let (got, body) = send(
            &router,
            Method::POST,
            "/api/authors",
            Some(&alice),
            Some(json!({ "author": author })),
        )
        .await;
        assert_eq!(got, status, "author {author:?}");
        assert_eq!(body["error"]["code"], code);
    }

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/authors",
        Some(&alice),
        Some(json!({ "author": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/authors",
        Some(&alice),
        Some(json!({ "author": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "duplicate");
}

#[tokio::test]
async fn unsubscribe_returns_no_content_without_an_edge() {
    let router = build_router(memory_state());
    let (_, alice) = register(&router, "alice").await;
    let (bob_id, _) = register(&router, "bob").await;

    send(
        &router,
        Method::POST,
        "/api/authors",
        Some(&alice),
        Some(json!({ "author": "bob" })),
    )
    .await;

    let (status, list) = send(&router, Method::GET, "/api/subscribe", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let body = json!({ "author": bob_id });
    let (status, removed) = send(
        &router,
        Method::DELETE,
        "/api/subscribe",
        Some(&alice),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["author"], bob_id.as_str());

    let (status, _) = send(&router, Method::DELETE, "/api/subscribe", Some(&alice), Some(body)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn invalid_query_parameters_are_validation_errors() {
    let router = build_router(memory_state());
    let (_, alice) = register(&router, "alice").await;

    for uri in [
        "/api/post_subscribe?is_read=maybe",
        "/api/post_subscribe?page=0",
        "/api/post?page=abc",
        "/api/authors?o=created_at",
        "/api/authors?count_post=-1",
    ] {
        let (status, body) = send(&router, Method::GET, uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "validation", "{uri}");
    }

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/api/post_subscribe/{}", uuid::Uuid::new_v4()),
        Some(&alice),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let router = build_router(memory_state());
    register(&router, "alice").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/auth/users",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "duplicate");
}

#[tokio::test]
async fn health_is_no_content() {
    let router = build_router(memory_state());
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    token: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn malformed_bodies_are_coded_validation_errors() {
    let router = build_router(memory_state());
    let (_, alice) = register(&router, "alice").await;
    let (_, bob) = register(&router, "bob").await;

    let (_, post) = send(
        &router,
        Method::POST,
        "/api/post",
        Some(&bob),
        Some(json!({ "title": "hello", "content": "from bob" })),
    )
    .await;
    send(
        &router,
        Method::POST,
        "/api/authors",
        Some(&alice),
        Some(json!({ "author": "bob" })),
    )
    .await;
    let uri = format!("/api/post_subscribe/{}", post["id"].as_str().unwrap());

    let cases = [
        (Method::PUT, uri.as_str(), "not json"),
        (Method::PUT, uri.as_str(), r#"{"is_read": [true]}"#),
        (Method::DELETE, "/api/subscribe", r#"{"author": "bob"}"#),
        (Method::POST, "/api/post", r#"{"title": "missing content"}"#),
    ];
    for (method, target, body) in cases {
        let (status, value) = send_raw(&router, method.clone(), target, &alice, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {target} {body}");
        assert_eq!(value["error"]["code"], "validation", "{method} {target} {body}");
    }
}

#[tokio::test]
async fn numeric_read_flags_are_accepted() {
    let router = build_router(memory_state());
    let (_, alice) = register(&router, "alice").await;
    let (_, bob) = register(&router, "bob").await;

    let (_, post) = send(
        &router,
        Method::POST,
        "/api/post",
        Some(&bob),
        Some(json!({ "title": "hello", "content": "from bob" })),
    )
    .await;
    send(
        &router,
        Method::POST,
        "/api/authors",
        Some(&alice),
        Some(json!({ "author": "bob" })),
    )
    .await;
    let uri = format!("/api/post_subscribe/{}", post["id"].as_str().unwrap());

    let (status, entry) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "is_read": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["is_read"], true);

    let (status, entry) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&alice),
        Some(json!({ "is_read": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["is_read"], false);

    let (status, body) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "is_read": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");
}

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::rest::{router, AppState};
use crate::storage::SqliteStorage;

const ADMIN_SECRET: &str = "test-secret";
const PAGE_SIZE: usize = 10;

fn test_app(prefix: &str) -> Router {
    let mut p = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("{}_{}.db", prefix, nanos));
    let storage = SqliteStorage::new(&p);
    storage.init().unwrap();
    router(AppState::new(storage, ADMIN_SECRET.to_string(), PAGE_SIZE))
}

fn request(method: &str, uri: &str, body: Option<Value>, admin: bool) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if admin {
        builder = builder.header("x-admin-secret", ADMIN_SECRET);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_items(app: &Router, n: usize) -> Vec<i64> {
    let refs: Vec<String> = (0..n).map(|i| format!("shoe_{i}.jpg")).collect();
    let (status, body) = send(
        app,
        request("POST", "/items", Some(json!({ "references": refs })), true),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app("api_health");

    let (status, body) = send(&app, request("GET", "/health", None, false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn admin_endpoints_require_the_shared_secret() {
    let app = test_app("api_auth");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/items",
            Some(json!({ "references": ["a.jpg"] })),
            false,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .method("GET")
        .uri("/export")
        .header("x-admin-secret", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bearer = Request::builder()
        .method("GET")
        .uri("/export")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_SECRET}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, bearer).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn voter_flow_like_favorite_and_confirmed_switch() {
    let app = test_app("api_flow");
    let ids = seed_items(&app, 2).await;
    let (a, b) = (ids[0], ids[1]);
    let voter = "a@x.com";

    let (status, body) = send(
        &app,
        request("POST", &format!("/voters/{voter}/likes/{a}"), None, false),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liked"], true);

    let (_, body) = send(
        &app,
        request("POST", &format!("/voters/{voter}/likes/{b}"), None, false),
    )
    .await;
    assert_eq!(body["liked"], true);

    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/voters/{voter}/favorite"),
            Some(json!({ "itemId": a })),
            false,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "FAVORITED");

    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/voters/{voter}/favorite"),
            Some(json!({ "itemId": b })),
            false,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "NEEDS_CONFIRMATION");
    assert_eq!(body["currentItemId"], json!(a));

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/voters/{voter}/favorite/switch"),
            Some(json!({ "newItemId": b, "oldItemId": a })),
            false,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(
        &app,
        request("GET", &format!("/voters/{voter}/favorite"), None, false),
    )
    .await;
    assert_eq!(body["itemId"], json!(b));

    // The old favorite's row kept its like and lost the favorite flag.
    let (_, body) = send(&app, request("GET", "/export", None, true)).await;
    let votes = body["votes"].as_array().unwrap();
    let old = votes.iter().find(|v| v["itemId"] == json!(a)).unwrap();
    assert_eq!(old["liked"], true);
    assert_eq!(old["isFavorite"], false);
}

#[tokio::test]
async fn second_like_toggle_restores_original_state() {
    let app = test_app("api_toggle");
    let ids = seed_items(&app, 1).await;
    let uri = format!("/voters/a@x.com/likes/{}", ids[0]);

    let (_, body) = send(&app, request("POST", &uri, None, false)).await;
    assert_eq!(body["liked"], true);
    let (_, body) = send(&app, request("POST", &uri, None, false)).await;
    assert_eq!(body["liked"], false);
}

#[tokio::test]
async fn stale_switch_confirmation_returns_conflict() {
    let app = test_app("api_conflict");
    let ids = seed_items(&app, 3).await;
    let (a, b, c) = (ids[0], ids[1], ids[2]);
    let voter = "a@x.com";

    send(
        &app,
        request(
            "PUT",
            &format!("/voters/{voter}/favorite"),
            Some(json!({ "itemId": a })),
            false,
        ),
    )
    .await;
    // Another tab confirms a -> c first.
    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/voters/{voter}/favorite/switch"),
            Some(json!({ "newItemId": c, "oldItemId": a })),
            false,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        request(
            "POST",
            &format!("/voters/{voter}/favorite/switch"),
            Some(json!({ "newItemId": b, "oldItemId": a })),
            false,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["currentItemId"], json!(c));
}

#[tokio::test]
async fn voting_on_an_unknown_item_is_not_found() {
    let app = test_app("api_missing");
    seed_items(&app, 1).await;

    let (status, _) = send(
        &app,
        request("POST", "/voters/a@x.com/likes/999", None, false),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gallery_ranks_by_favorites_then_likes() {
    let app = test_app("api_rank");
    let ids = seed_items(&app, 3).await;
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    for voter in ["v1", "v2"] {
        send(
            &app,
            request(
                "PUT",
                &format!("/voters/{voter}/favorite"),
                Some(json!({ "itemId": b })),
                false,
            ),
        )
        .await;
        send(
            &app,
            request("POST", &format!("/voters/{voter}/likes/{a}"), None, false),
        )
        .await;
    }

    let (status, body) = send(&app, request("GET", "/gallery", None, false)).await;
    assert_eq!(status, StatusCode::OK);
    let ranked: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["itemId"].as_i64().unwrap())
        .collect();
    assert_eq!(ranked, vec![b, a, c]);

    let (_, body) = send(&app, request("GET", "/leaderboard?limit=1", None, false)).await;
    let top = body["items"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["favoriteCount"], 2);
}

#[tokio::test]
async fn gallery_clamps_past_the_end_page_index() {
    let app = test_app("api_clamp");
    seed_items(&app, 23).await;

    let (status, body) = send(&app, request("GET", "/gallery?page=999", None, false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pageCount"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn deleting_an_item_cascades_its_votes() {
    let app = test_app("api_delete");
    let ids = seed_items(&app, 2).await;
    let (a, b) = (ids[0], ids[1]);

    send(
        &app,
        request("POST", &format!("/voters/v1/likes/{a}"), None, false),
    )
    .await;
    send(
        &app,
        request("POST", &format!("/voters/v1/likes/{b}"), None, false),
    )
    .await;

    let (status, _) = send(&app, request("DELETE", &format!("/items/{a}"), None, true)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("DELETE", &format!("/items/{a}"), None, true)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, request("GET", "/export", None, true)).await;
    let votes = body["votes"].as_array().unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["itemId"], json!(b));

    let (_, body) = send(&app, request("GET", "/gallery", None, false)).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn wiping_the_catalog_clears_everything() {
    let app = test_app("api_wipe");
    let ids = seed_items(&app, 2).await;

    send(
        &app,
        request("POST", &format!("/voters/v1/likes/{}", ids[0]), None, false),
    )
    .await;

    let (status, _) = send(&app, request("DELETE", "/items", None, true)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, request("GET", "/gallery", None, false)).await;
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["pageCount"], 0);

    let (_, body) = send(&app, request("GET", "/export", None, true)).await;
    assert!(body["votes"].as_array().unwrap().is_empty());
    assert!(body["voters"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn clearing_votes_keeps_the_catalog() {
    let app = test_app("api_clear_votes");
    let ids = seed_items(&app, 2).await;

    send(
        &app,
        request("POST", &format!("/voters/v1/likes/{}", ids[0]), None, false),
    )
    .await;

    let (status, _) = send(&app, request("DELETE", "/votes", None, true)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, request("GET", "/export", None, true)).await;
    assert!(body["votes"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, request("GET", "/items", None, false)).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn removing_a_voter_deletes_only_their_responses() {
    let app = test_app("api_remove_voter");
    let ids = seed_items(&app, 2).await;

    send(
        &app,
        request("POST", &format!("/voters/v1/likes/{}", ids[0]), None, false),
    )
    .await;
    send(
        &app,
        request(
            "PUT",
            "/voters/v1/favorite",
            Some(json!({ "itemId": ids[1] })),
            false,
        ),
    )
    .await;
    send(
        &app,
        request("POST", &format!("/voters/v2/likes/{}", ids[0]), None, false),
    )
    .await;

    let (status, body) = send(&app, request("DELETE", "/voters/v1", None, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, body) = send(&app, request("GET", "/export", None, true)).await;
    let voters = body["voters"].as_array().unwrap();
    assert_eq!(voters.len(), 1);
    assert_eq!(voters[0]["voterKey"], "v2");
}

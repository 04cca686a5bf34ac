use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use subtrack::connector::http::{router, AppState};
use subtrack::{InMemorySubscriptionRepository, SubscriptionService};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

fn app_with_token(token: CancellationToken) -> Router {
    let service = Arc::new(SubscriptionService::new(Arc::new(
        InMemorySubscriptionRepository::new(),
    )));
    router(AppState::new(service, token))
}

fn app() -> Router {
    app_with_token(CancellationToken::new())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn netflix() -> Value {
    json!({
        "service_name": "Netflix",
        "price": 999,
        "user_id": USER,
        "start_date": "01-2024"
    })
}

fn spotify() -> Value {
    json!({
        "service_name": "Spotify",
        "price": 499,
        "user_id": USER,
        "start_date": "03-2024",
        "end_date": "06-2024"
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_and_fetch_subscription() {
    let app = app();

    let (status, created) = send(&app, "POST", "/api/subscriptions", Some(spotify())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["service_name"], "Spotify");
    assert_eq!(created["price"], 499);
    assert_eq!(created["user_id"], USER);
    assert_eq!(created["start_date"], "03-2024");
    assert_eq!(created["end_date"], "06-2024");

    let id = created["id"].as_str().expect("id");
    let (status, fetched) = send(&app, "GET", &format!("/api/subscriptions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_without_end_date_serializes_null() {
    let (status, created) = send(&app(), "POST", "/api/subscriptions", Some(netflix())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["end_date"].is_null());
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let app = app();

    let mut zero_price = netflix();
    zero_price["price"] = json!(0);
    let (status, body) = send(&app, "POST", "/api/subscriptions", Some(zero_price)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("price"));

    let mut no_name = netflix();
    no_name["service_name"] = json!("");
    let (status, _) = send(&app, "POST", "/api/subscriptions", Some(no_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_date = netflix();
    bad_date["start_date"] = json!("2024-01");
    let (status, body) = send(&app, "POST", "/api/subscriptions", Some(bad_date)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("MM-YYYY"));

    let mut bad_user = netflix();
    bad_user["user_id"] = json!("nope");
    let (status, _) = send(&app, "POST", "/api/subscriptions", Some(bad_user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/subscriptions", Some(json!("not an object"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/subscriptions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let app = app();
    let missing = "/api/subscriptions/1b4e28ba-2fa1-11d2-883f-0016d3cca427";

    let (status, _) = send(&app, "GET", missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PUT", missing, Some(netflix())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/subscriptions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid subscription id");
}

#[tokio::test]
async fn update_replaces_and_delete_removes() {
    let app = app();
    let (_, created) = send(&app, "POST", "/api/subscriptions", Some(spotify())).await;
    let uri = format!("/api/subscriptions/{}", created["id"].as_str().expect("id"));

    let (status, updated) = send(&app, "PUT", &uri, Some(netflix())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["service_name"], "Netflix");
    assert!(updated["end_date"].is_null());
    assert_eq!(updated["created_at"], created["created_at"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_applies_pagination_defaults() {
    let app = app();
    for i in 0..12 {
        let mut body = netflix();
        body["service_name"] = json!(format!("service-{}", i));
        send(&app, "POST", "/api/subscriptions", Some(body)).await;
    }

    let (status, page) = send(&app, "GET", "/api/subscriptions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["limit"], 10);
    assert_eq!(page["offset"], 0);
    assert_eq!(page["total"], 10);

    let (_, clamped) = send(&app, "GET", "/api/subscriptions?limit=0&offset=-5", None).await;
    assert_eq!(clamped, page);

    let (_, garbage) = send(&app, "GET", "/api/subscriptions?limit=abc", None).await;
    assert_eq!(garbage["limit"], 10);

    let (_, tail) = send(&app, "GET", "/api/subscriptions?limit=5&offset=10", None).await;
    assert_eq!(tail["total"], 2);
    assert_eq!(tail["items"].as_array().expect("items").len(), 2);
}

#[tokio::test]
async fn cost_endpoint_filters() {
    let app = app();
    send(&app, "POST", "/api/subscriptions", Some(netflix())).await;
    send(&app, "POST", "/api/subscriptions", Some(spotify())).await;

    let cost = |uri: &'static str| {
        let app = app.clone();
        async move {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::OK);
            body["total_cost"].as_i64().expect("total_cost")
        }
    };

    assert_eq!(cost("/api/subscriptions/cost").await, 1498);
    assert_eq!(cost("/api/subscriptions/cost?start_date=02-2024").await, 499);
    assert_eq!(cost("/api/subscriptions/cost?end_date=05-2024").await, 999);
    assert_eq!(cost("/api/subscriptions/cost?service_name=SPOT").await, 499);
    assert_eq!(cost("/api/subscriptions/cost?service_name=hulu").await, 0);
    assert_eq!(
        cost("/api/subscriptions/cost?user_id=60601fee-2bf1-4721-ae6f-7636e79a0cba").await,
        1498
    );
    assert_eq!(cost("/api/subscriptions/cost?user_id=&start_date=").await, 1498);

    let (status, _) = send(&app, "GET", "/api/subscriptions/cost?start_date=2024-02", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/subscriptions/cost?user_id=xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelled_server_rejects_requests() {
    let token = CancellationToken::new();
    let app = app_with_token(token.clone());
    token.cancel();

    let (status, _) = send(&app, "POST", "/api/subscriptions", Some(netflix())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

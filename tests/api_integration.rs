//! Integration tests driving the full router through `tower::ServiceExt`.
//!
//! Each test builds a fresh app over temp-file SQLite stores, so tests
//! are independent and need no running server.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use eventboard_backend::api::{create_router, AppState};
use eventboard_backend::auth::{JwtHandler, UserStore};
use eventboard_backend::events::EventStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret";

struct TestApp {
    app: Router,
    jwt: Arc<JwtHandler>,
    _dir: TempDir,
}

fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let db_path = db_path.to_str().unwrap();

    let user_store = Arc::new(UserStore::new(db_path).unwrap());
    let event_store = Arc::new(EventStore::new(db_path).unwrap());
    let jwt = Arc::new(JwtHandler::new(TEST_SECRET.to_string()));

    let app = create_router(AppState {
        user_store,
        event_store,
        jwt_handler: jwt.clone(),
    });

    TestApp {
        app,
        jwt,
        _dir: dir,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "password": password,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"].clone(),
    )
}

async fn create_event(app: &Router, token: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/events",
        Some(token),
        Some(json!({
            "title": "Cleanup",
            "description": "d",
            "date": "2024-05-01",
            "time": "10:00",
            "location": "Park",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["data"].clone()
}

#[tokio::test]
async fn test_health() {
    let t = test_app();
    let (status, body) = send(&t.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_then_login_with_verifiable_token() {
    let t = test_app();

    let (token, user) = register(&t.app, "alice", "alice@example.com", "password123").await;
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "user");
    assert!(user.get("password_hash").is_none());

    // The returned token verifies against the same token service
    let claims = t.jwt.verify(&token).unwrap();
    assert_eq!(claims.id, user["id"].as_str().unwrap());

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged in successfully");
    t.jwt.verify(body["token"].as_str().unwrap()).unwrap();
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let t = test_app();

    register(&t.app, "alice", "alice@example.com", "pass").await;

    // Different username, same email
    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "pass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User with that email already exists");
}

#[tokio::test]
async fn test_register_missing_fields() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please enter all fields");
}

#[tokio::test]
async fn test_login_bad_password() {
    let t = test_app();

    register(&t.app, "carol", "carol@example.com", "correct").await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "carol@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_event_create_requires_auth() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/events",
        None,
        Some(json!({
            "title": "Cleanup",
            "description": "d",
            "date": "2024-05-01",
            "time": "10:00",
            "location": "Park",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token");
}

#[tokio::test]
async fn test_event_roundtrip() {
    let t = test_app();

    let (token, user) = register(&t.app, "dave", "dave@example.com", "pass").await;
    let created = create_event(&t.app, &token).await;

    assert_eq!(created["organizer"], "Anonymous");
    assert_eq!(created["user"], user["id"]);
    assert_eq!(created["rsvps"], json!([]));

    let id = created["id"].as_str().unwrap();
    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/events/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let fetched = &body["data"];
    assert_eq!(fetched["title"], "Cleanup");
    assert_eq!(fetched["description"], "d");
    assert_eq!(fetched["date"], "2024-05-01");
    assert_eq!(fetched["time"], "10:00");
    assert_eq!(fetched["location"], "Park");
    assert_eq!(fetched["rsvps"], json!([]));

    // Listing is public and includes the event
    let (status, body) = send(&t.app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_event_create_missing_fields() {
    let t = test_app();

    let (token, _) = register(&t.app, "erin", "erin@example.com", "pass").await;
    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/events",
        Some(&token),
        Some(json!({ "title": "Cleanup" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all the fields");
}

#[tokio::test]
async fn test_update_by_non_owner_is_401() {
    let t = test_app();

    let (owner_token, _) = register(&t.app, "owner", "owner@example.com", "pass").await;
    let (other_token, _) = register(&t.app, "other", "other@example.com", "pass").await;
    let event = create_event(&t.app, &owner_token).await;
    let id = event["id"].as_str().unwrap();

    let (status, body) = send(
        &t.app,
        Method::PUT,
        &format!("/api/events/{}", id),
        Some(&other_token),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized to update this event");

    // The owner can update, and empty fields keep prior values
    let (status, body) = send(
        &t.app,
        Method::PUT,
        &format!("/api/events/{}", id),
        Some(&owner_token),
        Some(json!({ "title": "Beach Cleanup", "location": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Beach Cleanup");
    assert_eq!(body["data"]["location"], "Park");
}

#[tokio::test]
async fn test_delete_by_owner_only() {
    let t = test_app();

    let (owner_token, _) = register(&t.app, "owner", "owner@example.com", "pass").await;
    let (other_token, _) = register(&t.app, "other", "other@example.com", "pass").await;
    let event = create_event(&t.app, &owner_token).await;
    let id = event["id"].as_str().unwrap();

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/events/{}", id),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/events/{}", id),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event deleted");

    let (status, _) = send(
        &t.app,
        Method::GET,
        &format!("/api/events/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rsvp_is_public_and_rejects_duplicates() {
    let t = test_app();

    let (token, _) = register(&t.app, "frank", "frank@example.com", "pass").await;
    let event = create_event(&t.app, &token).await;
    let id = event["id"].as_str().unwrap();
    let uri = format!("/api/events/{}/rsvp", id);

    // No token needed
    let (status, body) = send(
        &t.app,
        Method::PUT,
        &uri,
        None,
        Some(json!({ "email": "guest@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "RSVP successful");
    assert_eq!(body["data"]["rsvps"], json!(["guest@example.com"]));

    // Same email again fails, and the list did not grow
    let (status, body) = send(
        &t.app,
        Method::PUT,
        &uri,
        None,
        Some(json!({ "email": "guest@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have already RSVP'd to this event");

    let (_, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/events/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["rsvps"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rsvp_missing_email() {
    let t = test_app();

    let (token, _) = register(&t.app, "grace", "grace@example.com", "pass").await;
    let event = create_event(&t.app, &token).await;
    let id = event["id"].as_str().unwrap();

    let (status, body) = send(
        &t.app,
        Method::PUT,
        &format!("/api/events/{}/rsvp", id),
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide an email");
}

#[tokio::test]
async fn test_invalid_id_shape_is_404() {
    let t = test_app();
    let (token, _) = register(&t.app, "henry", "henry@example.com", "pass").await;

    let cases = [
        (Method::GET, "/api/events/not-a-uuid", None, None),
        (
            Method::PUT,
            "/api/events/not-a-uuid",
            Some(token.as_str()),
            Some(json!({ "title": "x" })),
        ),
        (
            Method::DELETE,
            "/api/events/not-a-uuid",
            Some(token.as_str()),
            None,
        ),
        (
            Method::PUT,
            "/api/events/not-a-uuid/rsvp",
            None,
            Some(json!({ "email": "a@b.c" })),
        ),
    ];

    for (method, uri, token, body) in cases {
        let (status, body) = send(&t.app, method, uri, token, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["message"], "Invalid Event Id");
    }
}

#[tokio::test]
async fn test_profile_get_and_merge_update() {
    let t = test_app();

    let (token, _) = register(&t.app, "iris", "iris@example.com", "pass").await;

    let (status, body) = send(&t.app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "iris");
    assert_eq!(body["data"]["bio"], Value::Null);

    // Set a bio
    let (status, body) = send(
        &t.app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "bio": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "hello");
    assert_eq!(body["message"], "Profile updated successfully");

    // Empty bio is falsy and leaves the prior value
    let (_, body) = send(
        &t.app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "bio": "", "website": "https://iris.example" })),
    )
    .await;
    assert_eq!(body["data"]["bio"], "hello");
    assert_eq!(body["data"]["website"], "https://iris.example");

    // Non-empty overwrites
    let (_, body) = send(
        &t.app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "bio": "new" })),
    )
    .await;
    assert_eq!(body["data"]["bio"], "new");
}

#[tokio::test]
async fn test_profile_requires_auth() {
    let t = test_app();

    let (status, _) = send(&t.app, Method::GET, "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &t.app,
        Method::GET,
        "/api/users/profile",
        Some("garbage-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let t = test_app();

    register(&t.app, "jack", "jack@example.com", "pass").await;

    // Hand-roll a token that expired an hour ago, signed with the right key
    let claims = serde_json::json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "role": "user",
        "exp": (chrono::Utc::now().timestamp() - 3600) as usize,
    });
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/api/users/profile",
        Some(&expired),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, token failed");
}

//! End-to-end flow tests through the full router.
//!
//! Every request goes through the real middleware stack; nothing is
//! mocked except the SQLite file, which lives in a tempdir.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use platefeed_backend::{
    app::build_router,
    auth::{models::Claims, AuthState, CredentialStore, JwtHandler},
    food::{FoodState, FoodStore},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-secret-key-12345";

fn test_app() -> (Router, NamedTempFile) {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_str().unwrap();

    let store = Arc::new(CredentialStore::new(path).unwrap());
    let food_store = Arc::new(FoodStore::new(path).unwrap());
    let jwt = Arc::new(JwtHandler::new(TEST_SECRET.to_string()));

    let auth_state = AuthState::new(store, jwt, false);
    let food_state = FoodState::new(food_store, false);

    (build_router(auth_state, food_state), temp)
}

/// Fire one request and return (status, parsed body, Set-Cookie header).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
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
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body, set_cookie)
}

/// Pull `token=...` out of a Set-Cookie header, as a Cookie header value.
fn cookie_from(set_cookie: &str) -> String {
    let token = set_cookie
        .split(';')
        .next()
        .expect("empty Set-Cookie header");
    assert!(token.starts_with("token="));
    token.to_string()
}

async fn register_user(app: &Router, fullname: &str, email: &str, password: &str) -> (Value, String) {
    let (status, body, set_cookie) = send(
        app,
        "POST",
        "/api/auth/user/register",
        Some(json!({ "fullname": fullname, "email": email, "password": password })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (body, cookie_from(&set_cookie.unwrap()))
}

async fn register_partner(app: &Router, name: &str, email: &str, password: &str) -> (Value, String) {
    let (status, body, set_cookie) = send(
        app,
        "POST",
        "/api/auth/foodpartner/register",
        Some(json!({ "name": name, "email": email, "password": password })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (body, cookie_from(&set_cookie.unwrap()))
}

#[tokio::test]
async fn register_login_guard_logout_roundtrip() {
    let (app, _temp) = test_app();

    // Register: 201, public fields only, session cookie set.
    let (body, _cookie) = register_user(&app, "Ana", "ana@x.com", "secret1").await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["email"], json!("ana@x.com"));
    assert_eq!(body["user"]["fullname"], json!("Ana"));
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // Login with the same credentials: 200 and a non-empty token.
    let (status, body, set_cookie) = send(
        &app,
        "POST",
        "/api/auth/user/login",
        Some(json!({ "email": "ana@x.com", "password": "secret1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Login successful."));
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    let cookie = cookie_from(&set_cookie.unwrap());

    // Guarded call with the cookie reaches the handler (empty store: 404
    // from the handler itself, not from the guard).
    let (status, body, _) = send(&app, "GET", "/api/food", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("No food items found."));

    // Logout clears the cookie.
    let (status, body, set_cookie) = send(&app, "GET", "/api/auth/user/logout", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Logged out successfully."));
    let cleared = set_cookie.unwrap();
    assert!(cleared.starts_with("token="));
    assert!(cleared.contains("Max-Age=0") || cleared.contains("Expires"));

    // Without the cookie, the guard rejects before any handler runs.
    let (status, body, _) = send(&app, "GET", "/api/food", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        json!("No token provided. Authorization denied.")
    );
}

#[tokio::test]
async fn register_sets_locked_down_cookie() {
    let (app, _temp) = test_app();

    let (_, _, set_cookie) = send(
        &app,
        "POST",
        "/api/auth/user/register",
        Some(json!({ "fullname": "Ana", "email": "ana@x.com", "password": "secret1" })),
        None,
    )
    .await;

    let set_cookie = set_cookie.unwrap();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=604800")); // 7 days
}

#[tokio::test]
async fn register_validates_and_rejects_duplicates() {
    let (app, _temp) = test_app();

    // Missing field.
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/auth/user/register",
        Some(json!({ "email": "ana@x.com", "password": "secret1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("All fields are required."));

    // First registration succeeds; the same normalized email again fails.
    register_user(&app, "Ana", "ana@x.com", "secret1").await;
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/auth/user/register",
        Some(json!({ "fullname": "Other", "email": "ANA@x.com", "password": "secret2" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("User already exists!"));
}

#[tokio::test]
async fn bad_credentials_get_identical_responses() {
    let (app, _temp) = test_app();
    register_user(&app, "Ana", "ana@x.com", "secret1").await;

    let (wrong_status, wrong_body, _) = send(
        &app,
        "POST",
        "/api/auth/user/login",
        Some(json!({ "email": "ana@x.com", "password": "not-it" })),
        None,
    )
    .await;
    let (ghost_status, ghost_body, _) = send(
        &app,
        "POST",
        "/api/auth/user/login",
        Some(json!({ "email": "ghost@x.com", "password": "secret1" })),
        None,
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(ghost_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, ghost_body);
    assert_eq!(wrong_body["message"], json!("Invalid email or password."));
}

#[tokio::test]
async fn partner_publishes_and_user_browses() {
    let (app, _temp) = test_app();

    let (partner_body, partner_cookie) =
        register_partner(&app, "Ana's Kitchen", "kitchen@x.com", "secret1").await;
    let partner_id = partner_body["user"]["id"].as_str().unwrap().to_string();
    assert_eq!(partner_body["user"]["name"], json!("Ana's Kitchen"));

    // Partner publishes a listing; it is attributed to the resolved
    // principal, not to anything in the body.
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/food",
        Some(json!({
            "name": "Tacos",
            "description": "Street style",
            "video": "https://cdn.example.com/tacos.mp4"
        })),
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["foodPartner"], json!(partner_id));

    // A consumer can browse it.
    let (_, user_cookie) = register_user(&app, "Ana", "ana@x.com", "secret1").await;
    let (status, body, _) = send(&app, "GET", "/api/food", None, Some(&user_cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["foodItems"][0]["name"], json!("Tacos"));
}

#[tokio::test]
async fn guards_enforce_principal_kind() {
    let (app, _temp) = test_app();

    let (_, user_cookie) = register_user(&app, "Ana", "ana@x.com", "secret1").await;
    let (_, partner_cookie) =
        register_partner(&app, "Ana's Kitchen", "kitchen@x.com", "secret1").await;

    // A consumer session cannot publish food.
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/food",
        Some(json!({ "name": "Tacos", "description": "x", "video": "https://v" })),
        Some(&user_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A partner session cannot browse the consumer feed.
    let (status, body, _) = send(&app, "GET", "/api/food", None, Some(&partner_cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("User not found."));
}

#[tokio::test]
async fn tampered_and_expired_tokens_are_distinguished() {
    let (app, _temp) = test_app();
    let (_, cookie) = register_user(&app, "Ana", "ana@x.com", "secret1").await;

    // Tamper with the signature.
    let mut tampered = cookie.clone();
    tampered.push('x');
    let (status, body, _) = send(&app, "GET", "/api/food", None, Some(&tampered)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid token. Access denied."));

    // An expired token signed with the real secret gets the expiry message.
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: uuid::Uuid::new_v4().to_string(),
        iat: (now - 7200) as usize,
        exp: (now - 3600) as usize,
    };
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();
    let (status, body, _) = send(
        &app,
        "GET",
        "/api/food",
        None,
        Some(&format!("token={}", expired)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        json!("Session expired. Please log in again.")
    );
}

#[tokio::test]
async fn valid_token_for_missing_principal_is_gone() {
    let (app, _temp) = test_app();

    // A well-signed token whose subject was never (or is no longer) in
    // the store.
    let jwt = JwtHandler::new(TEST_SECRET.to_string());
    let token = jwt.issue(&uuid::Uuid::new_v4()).unwrap();

    let (status, body, _) = send(
        &app,
        "GET",
        "/api/food",
        None,
        Some(&format!("token={}", token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("User not found."));
}

#[tokio::test]
async fn food_validation_and_duplicates() {
    let (app, _temp) = test_app();
    let (_, partner_cookie) =
        register_partner(&app, "Ana's Kitchen", "kitchen@x.com", "secret1").await;

    // Missing description.
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/food",
        Some(json!({ "name": "Tacos", "video": "https://v" })),
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Name and description are required"));

    // Missing video.
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/food",
        Some(json!({ "name": "Tacos", "description": "Street style" })),
        Some(&partner_cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Video is required"));

    // Same partner, same dish name: 409, unlike the 400 the credential
    // endpoints use for duplicates.
    let publish = json!({
        "name": "Tacos",
        "description": "Street style",
        "video": "https://cdn.example.com/tacos.mp4"
    });
    let (status, _, _) = send(&app, "POST", "/api/food", Some(publish.clone()), Some(&partner_cookie)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body, _) = send(&app, "POST", "/api/food", Some(publish), Some(&partner_cookie)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Food item already exists"));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let (app, _temp) = test_app();

    // No session at all still succeeds.
    let (status, body, set_cookie) = send(&app, "GET", "/api/auth/foodpartner/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(set_cookie.unwrap().starts_with("token="));
}

#[tokio::test]
async fn shared_email_across_namespaces() {
    let (app, _temp) = test_app();

    // The same email registers once per namespace.
    register_user(&app, "Ana", "ana@x.com", "secret1").await;
    register_partner(&app, "Ana's Kitchen", "ana@x.com", "secret2").await;

    // And each namespace logs in with its own password.
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/foodpartner/login",
        Some(json!({ "email": "ana@x.com", "password": "secret2" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/user/login",
        Some(json!({ "email": "ana@x.com", "password": "secret2" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let (app, _temp) = test_app();
    let (status, _, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

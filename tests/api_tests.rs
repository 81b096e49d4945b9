use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use salonix::config::{Config, DatabaseConfig, SecurityConfig, ServerConfig};

/// Default admin seeded by the initial migration.
const ADMIN_EMAIL: &str = "admin@salonix.local";
const ADMIN_PASSWORD: &str = "admin-change-me";

fn test_config() -> Config {
    Config {
        app_name: "Salonix".to_string(),
        app_version: "test".to_string(),
        debug: false,
        database: DatabaseConfig {
            host: "localhost".to_string(),
            port: 3306,
            user: "unused".to_string(),
            password: "unused".to_string(),
            database: "unused".to_string(),
            url_override: Some("sqlite::memory:".to_string()),
            max_connections: 5,
            min_connections: 1,
        },
        security: SecurityConfig {
            secret_key: "test-secret-key".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
        },
    }
}

async fn spawn_app() -> Router {
    let state = salonix::api::create_app_state_from_config(test_config())
        .await
        .expect("Failed to create app state");
    salonix::api::router(state)
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn register(app: &Router, email: &str, password: &str, id_role: i32) {
    let response = request(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": password,
            "first_name": "Ana",
            "last_name": "Lopez",
            "phone": "600123123",
            "id_role": id_role,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = request(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["token_type"], "bearer");
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_ping() {
    let app = spawn_app().await;

    let response = request(&app, "GET", "/", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["msg"], "ok");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;

    let response = request(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": "ana@example.com",
            "password": "password123",
            "first_name": "Ana",
            "last_name": "Lopez",
            "phone": "600123123",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "ana@example.com");
    assert_eq!(body["data"]["id_role"], 2);
    assert_eq!(body["data"]["state"], true);
    // The password hash must never leak into responses
    assert!(body["data"].get("password").is_none());

    // Same email again conflicts
    let response = request(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": "ana@example.com", "password": "other" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Wrong password is rejected
    let response = request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown email is rejected the same way
    let response = request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = login(&app, "ana@example.com", "password123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_authorization_gate() {
    let app = spawn_app().await;
    register(&app, "ana@example.com", "password123", 2).await;

    // No Authorization header
    let response = request(&app, "GET", "/users", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong scheme
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users")
                .header("Authorization", "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let response = request(&app, "GET", "/users", Some("garbage"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Expired token signed with the right secret
    let tokens = salonix::services::TokenService::new(&test_config().security).unwrap();
    let expired = tokens
        .issue_with_ttl(ADMIN_EMAIL, 1, chrono::Duration::seconds(-5))
        .unwrap();
    let response = request(&app, "GET", "/users", Some(&expired), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid token for an email with no account behind it
    let ghost = tokens.issue("ghost@example.com", 1).unwrap();
    let response = request(&app, "GET", "/users", Some(&ghost), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Standard user is authenticated but not an admin
    let user_token = login(&app, "ana@example.com", "password123").await;
    let response = request(&app, "GET", "/users", Some(&user_token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Seeded admin passes
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = request(&app, "GET", "/users", Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_service_mutations_require_admin() {
    let app = spawn_app().await;
    register(&app, "ana@example.com", "password123", 2).await;
    let user_token = login(&app, "ana@example.com", "password123").await;

    let payload = json!({ "name": "Manicure", "duration_minutes": 30, "price": 15.0 });

    let response = request(&app, "POST", "/services", None, Some(payload.clone())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = request(&app, "POST", "/services", Some(&user_token), Some(payload)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_services_crud_roundtrip() {
    let app = spawn_app().await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Create
    let response = request(
        &app,
        "POST",
        "/services",
        Some(&admin_token),
        Some(json!({
            "name": "Manicure",
            "description": "Classic manicure",
            "duration_minutes": 30,
            "price": 15.5,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let id_service = body_json(response).await["data"]["id_service"]
        .as_i64()
        .unwrap();

    // Public read
    let response = request(&app, "GET", &format!("/services/{id_service}"), None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Manicure");
    assert_eq!(body["data"]["duration_minutes"], 30);
    assert_eq!(body["data"]["price"], 15.5);
    assert_eq!(body["data"]["state"], true);

    // Public list
    let response = request(&app, "GET", "/services", None, None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Update
    let response = request(
        &app,
        "PUT",
        &format!("/services/{id_service}"),
        Some(&admin_token),
        Some(json!({
            "name": "Manicure Deluxe",
            "duration_minutes": 45,
            "price": 22.0,
            "state": false,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(&app, "GET", &format!("/services/{id_service}"), None, None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Manicure Deluxe");
    assert_eq!(body["data"]["state"], false);
    assert!(body["data"]["description"].is_null());

    // Update of an unknown id is a 404
    let response = request(
        &app,
        "PUT",
        "/services/9999",
        Some(&admin_token),
        Some(json!({ "name": "X", "duration_minutes": 10, "price": 1.0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Delete, then the record is gone
    let response = request(
        &app,
        "DELETE",
        &format!("/services/{id_service}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(&app, "GET", &format!("/services/{id_service}"), None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = request(
        &app,
        "DELETE",
        &format!("/services/{id_service}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_payload_validation() {
    let app = spawn_app().await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for payload in [
        json!({ "name": "", "duration_minutes": 30, "price": 10.0 }),
        json!({ "name": "Facial", "duration_minutes": 0, "price": 10.0 }),
        json!({ "name": "Facial", "duration_minutes": 30, "price": -1.0 }),
    ] {
        let response = request(&app, "POST", "/services", Some(&admin_token), Some(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_user_management_flow() {
    let app = spawn_app().await;
    register(&app, "ana@example.com", "password123", 2).await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Seeded admin + registered user
    let response = request(&app, "GET", "/users", Some(&admin_token), None).await;
    let body = body_json(response).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);

    let ana = users
        .iter()
        .find(|u| u["email"] == "ana@example.com")
        .unwrap();
    let ana_id = ana["id_user"].as_i64().unwrap();
    assert_eq!(ana["first_name"], "Ana");

    // Get by id
    let response = request(&app, "GET", &format!("/users/{ana_id}"), Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Partial update touches only the given fields
    let response = request(
        &app,
        "PUT",
        &format!("/users/{ana_id}"),
        Some(&admin_token),
        Some(json!({ "phone": "699999999" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["phone"], "699999999");
    assert_eq!(body["data"]["first_name"], "Ana");

    // Deactivate then reactivate
    let response = request(
        &app,
        "PATCH",
        &format!("/users/{ana_id}/deactivate"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(&app, "GET", &format!("/users/{ana_id}"), Some(&admin_token), None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], false);

    let response = request(
        &app,
        "PATCH",
        &format!("/users/{ana_id}/activate"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(&app, "GET", &format!("/users/{ana_id}"), Some(&admin_token), None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], true);

    // Unknown user id
    let response = request(&app, "GET", "/users/9999", Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reservations_flow() {
    let app = spawn_app().await;
    register(&app, "ana@example.com", "password123", 2).await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let user_token = login(&app, "ana@example.com", "password123").await;

    // Admin creates a bookable service
    let response = request(
        &app,
        "POST",
        "/services",
        Some(&admin_token),
        Some(json!({ "name": "Facial", "duration_minutes": 60, "price": 40.0 })),
    )
    .await;
    let id_service = body_json(response).await["data"]["id_service"]
        .as_i64()
        .unwrap();

    // Booking an unknown service fails
    let response = request(
        &app,
        "POST",
        "/reservations",
        Some(&user_token),
        Some(json!({
            "id_service": 9999,
            "scheduled_datetime": "2026-09-01T10:00:00Z",
            "payment_method": "card",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // User books the service
    let response = request(
        &app,
        "POST",
        "/reservations",
        Some(&user_token),
        Some(json!({
            "id_service": id_service,
            "scheduled_datetime": "2026-09-01T10:00:00Z",
            "payment_method": "card",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let id_reservation = body_json(response).await["data"]["id_reservation"]
        .as_i64()
        .unwrap();

    // Owner sees it with the joined service fields and the copied price
    let response = request(
        &app,
        "GET",
        "/reservations/my-reservations",
        Some(&user_token),
        None,
    )
    .await;
    let body = body_json(response).await;
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["service_name"], "Facial");
    assert_eq!(mine[0]["total_price"], 40.0);
    assert_eq!(mine[0]["status_name"], "pending");

    // Listing all reservations is admin-only
    let response = request(&app, "GET", "/reservations", Some(&user_token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = request(&app, "GET", "/reservations", Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["email"], "ana@example.com");

    // Another user cannot read someone else's reservation
    register(&app, "eva@example.com", "password123", 2).await;
    let other_token = login(&app, "eva@example.com", "password123").await;
    let response = request(
        &app,
        "GET",
        &format!("/reservations/{id_reservation}"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner and the admin can
    for token in [&user_token, &admin_token] {
        let response = request(
            &app,
            "GET",
            &format!("/reservations/{id_reservation}"),
            Some(token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Admin confirms, owner cancels
    let response = request(
        &app,
        "PATCH",
        &format!("/reservations/{id_reservation}/status/2"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        &app,
        "PATCH",
        &format!("/reservations/{id_reservation}/cancel"),
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A cancelled reservation cannot be cancelled again
    let response = request(
        &app,
        "PATCH",
        &format!("/reservations/{id_reservation}/cancel"),
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown status values are rejected
    let response = request(
        &app,
        "PATCH",
        &format!("/reservations/{id_reservation}/status/9"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Admin removes the reservation
    let response = request(
        &app,
        "DELETE",
        &format!("/reservations/{id_reservation}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        &app,
        "GET",
        &format!("/reservations/{id_reservation}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

mod common;

use std::sync::atomic::Ordering;

use axum::{body::Body, http::{Request, StatusCode}};
use lawn_quote_backend::models::user::UserRole;
use serde_json::json;

use common::*;

#[tokio::test]
async fn health_reports_database_state() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");

    let (status, body) = send(&app, get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn openapi_document_lists_quote_endpoints() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");

    let (status, body) = send(&app, get_request("/api-docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/quotes/estimate"].is_object());
    assert!(body["paths"]["/api/admin/quotes"].is_object());
    assert!(body["paths"]["/api/admin/calendar"].is_object());
    assert!(body["paths"]["/api/dashboard/my-calendar"].is_object());
}

#[tokio::test]
async fn out_of_range_size_is_rejected_before_lookup() {
    init_test_config();
    let (gis_url, hits) = mock_gis(Some(0.5)).await;
    let app = app(lazy_pool(), &gis_url, "http://127.0.0.1:9");

    for size in [0.0, -2.5, 100.5] {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/quotes/estimate", None, &quote_body(size)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "size {}", size);
        assert_eq!(body["fields"], json!(["claimed_size"]));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn estimate_reports_every_invalid_field() {
    init_test_config();
    let (gis_url, hits) = mock_gis(Some(0.5)).await;
    let app = app(lazy_pool(), &gis_url, "http://127.0.0.1:9");

    let body = json!({
        "name": "J4ne",
        "email": "not-an-email",
        "street_address": "123 Main St",
        "city": "Bel Air",
        "zipcode": "2101",
        "phone": "410-555-0100",
        "claimed_size": 1.0
    });
    let (status, body) = send(&app, json_request("POST", "/api/quotes/estimate", None, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["email", "name", "zipcode"]));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_estimate_body_is_a_json_bad_request() {
    init_test_config();
    let (gis_url, hits) = mock_gis(Some(0.5)).await;
    let app = app(lazy_pool(), &gis_url, "http://127.0.0.1:9");

    let mut missing = quote_body(1.0);
    missing.as_object_mut().unwrap().remove("claimed_size");
    let mut wrong_type = quote_body(1.0);
    wrong_type["claimed_size"] = json!("big");

    for body in [missing, wrong_type] {
        let (status, reply) = send(&app, json_request("POST", "/api/quotes/estimate", None, &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert!(reply["error"].is_string(), "{}", reply);
        assert!(reply.get("fields").is_none());
    }

    let garbled = Request::builder()
        .method("POST")
        .uri("/api/quotes/estimate")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, reply) = send(&app, garbled).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(reply["error"].is_string());

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn calendar_rejects_impossible_month() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");

    let customer = bearer(41, UserRole::Customer);
    let (status, body) = send(&app, get_request("/api/dashboard/my-calendar?year=2026&month=13", Some(&customer))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let admin = bearer(1, UserRole::Admin);
    let (status, _) = send(&app, get_request("/api/admin/calendar?month=0", Some(&admin))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get_request("/api/admin/calendar", Some(&customer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn quote_correction_is_validated_before_lookup() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");
    let admin = bearer(1, UserRole::Admin);

    let cases = [
        json!({ "service_status": "done" }),
        json!({ "service_frequency": "daily" }),
        json!({}),
    ];
    for body in cases {
        let (status, reply) = send(&app, json_request("PATCH", "/api/admin/quotes/7", Some(&admin), &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert!(reply["error"].is_string());
    }

    let (status, reply) = send(
        &app,
        json_request("PATCH", "/api/admin/quotes/7", Some(&admin), &json!({ "actual_size": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["fields"], json!(["actual_size"]));

    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/admin/users/1", Some(&admin), &json!({ "role": "pm" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_require_admin_token() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");

    let (status, body) = send(&app, get_request("/api/admin/quotes", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_authorization");

    let customer = bearer(41, UserRole::Customer);
    let (status, body) = send(&app, get_request("/api/admin/quotes", Some(&customer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("error").is_some());
    assert!(!body.is_array());

    let (status, _) = send(&app, get_request("/api/admin/stats", Some(&customer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_rejects_bad_credentials() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");

    let (status, body) = send(
        &app,
        get_request("/api/dashboard/my-quotes", Some("Basic dXNlcjpwYXNz")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unsupported_scheme");

    let (status, body) = send(
        &app,
        get_request("/api/dashboard/my-quotes", Some("Bearer not.a.jwt")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn register_rejects_weak_password_without_touching_db() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");

    let body = json!({ "email": "someone@example.com", "password": "short" });
    let (status, body) = send(&app, json_request("POST", "/api/auth/register", None, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["password"]));
}

#[tokio::test]
async fn webhook_requires_valid_signature() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");
    let payload = json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_1", "metadata": { "customer_id": "1" } } }
    })
    .to_string();

    let unsigned = Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, _) = send(&app, unsigned).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let forged = Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .header("stripe-signature", format!("t={},v1=deadbeef", chrono::Utc::now().timestamp()))
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = send(&app, forged).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid signature");
}

#[tokio::test]
async fn webhook_ignores_unrelated_event_types() {
    init_test_config();
    let app = app(lazy_pool(), "http://127.0.0.1:9/query", "http://127.0.0.1:9");
    let payload = json!({
        "id": "evt_2",
        "type": "invoice.paid",
        "data": { "object": { "id": "in_1" } }
    });

    let (status, body) = send(&app, signed_webhook(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

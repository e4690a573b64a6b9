//! HTTP-level integration tests for vendor onboarding endpoints.
//!
//! Both endpoints proxy to a vendor API; with the test config's closed-port
//! endpoints they exercise validation and the gateway error mapping.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_empty, post_json};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn credential_exchange_rejects_blank_username(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/vendors/self-hosted/credentials",
        serde_json::json!({"username": "   ", "password": "hunter2"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn credential_exchange_with_unreachable_vendor_returns_503(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/vendors/self-hosted/credentials",
        serde_json::json!({"username": "operator", "password": "hunter2"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VENDOR_UNAVAILABLE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn connect_session_with_unreachable_vendor_returns_503(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_empty(app, "/api/v1/vendors/cloud/connect-sessions").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VENDOR_UNAVAILABLE");
}

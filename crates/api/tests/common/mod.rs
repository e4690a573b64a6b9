use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use lockdesk_api::config::ServerConfig;
use lockdesk_api::routes;
use lockdesk_api::state::AppState;
use lockdesk_events::EventBus;
use lockdesk_provisioning::{
    DistributionRunner, HttpReservationSource, LockSync, PasscodeProvisioner,
};
use lockdesk_vendors::{
    AdapterRegistry, CloudConfig, CloudLockAdapter, CredentialStore, SelfHostedConfig,
    SelfHostedLockAdapter, VendorAdapter,
};

/// Build a test `ServerConfig` with safe defaults.
///
/// Vendor and reservation endpoints point at a closed local port, so any
/// test that actually reaches for a vendor observes `Unavailable` instead of
/// hanging.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        vendor_timeout_secs: 2,
        distribution_hour: 6,
        cloud: CloudConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
        },
        self_hosted: SelfHostedConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            username: "operator".to_string(),
            password: "hunter2".to_string(),
        },
        reservation_api_url: "http://127.0.0.1:9".to_string(),
        reservation_api_token: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let http_client = config.vendor_http_client();
    let credentials = CredentialStore::new(pool.clone());
    let cloud = Arc::new(CloudLockAdapter::new(
        http_client.clone(),
        config.cloud.clone(),
    ));
    let self_hosted = Arc::new(SelfHostedLockAdapter::new(
        http_client.clone(),
        config.self_hosted.clone(),
        credentials.clone(),
    ));
    let adapters = AdapterRegistry::new(
        Arc::clone(&cloud) as Arc<dyn VendorAdapter>,
        Arc::clone(&self_hosted) as Arc<dyn VendorAdapter>,
    );

    let provisioner = PasscodeProvisioner::new(pool.clone(), adapters.clone());
    let lock_sync = LockSync::new(pool.clone(), adapters.clone());
    let reservations = Arc::new(HttpReservationSource::new(
        http_client,
        config.reservation_api_url.clone(),
        None,
    ));
    let event_bus = Arc::new(EventBus::default());
    let distribution = DistributionRunner::new(
        pool.clone(),
        provisioner.clone(),
        reservations,
        Arc::clone(&event_bus),
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        event_bus,
        adapters,
        provisioner,
        lock_sync,
        distribution,
        cloud,
        self_hosted,
        credentials,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

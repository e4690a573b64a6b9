use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lockdesk_api::config::ServerConfig;
use lockdesk_api::{background, routes, state};
use lockdesk_events::{EmailConfig, EmailDelivery, EventBus, OutcomeNotifier};
use lockdesk_provisioning::{
    DistributionRunner, HttpReservationSource, LockSync, PasscodeProvisioner,
};
use lockdesk_vendors::{
    AdapterRegistry, CloudLockAdapter, CredentialStore, SelfHostedLockAdapter, VendorAdapter,
};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lockdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = lockdesk_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    lockdesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    lockdesk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- Vendor adapters ---
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
    tracing::info!("Vendor adapters initialized");

    // --- Provisioning services ---
    let provisioner = PasscodeProvisioner::new(pool.clone(), adapters.clone());
    let lock_sync = LockSync::new(pool.clone(), adapters.clone());

    let reservations = Arc::new(HttpReservationSource::new(
        http_client,
        config.reservation_api_url.clone(),
        config.reservation_api_token.clone(),
    ));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    let distribution = DistributionRunner::new(
        pool.clone(),
        provisioner.clone(),
        reservations,
        Arc::clone(&event_bus),
    );

    // Spawn the outcome notifier when email is configured.
    let notifier_handle = match EmailConfig::from_env() {
        Some(email_config) => {
            let notifier = OutcomeNotifier::new(EmailDelivery::new(email_config));
            tracing::info!("Outcome notifier started");
            Some(tokio::spawn(notifier.run(event_bus.subscribe())))
        }
        None => {
            tracing::info!("SMTP not configured, outcome notifications disabled");
            None
        }
    };

    // Spawn the daily distribution scheduler.
    let scheduler_cancel = tokio_util::sync::CancellationToken::new();
    let scheduler_handle = tokio::spawn(background::distribution::run(
        pool.clone(),
        distribution.clone(),
        config.distribution_hour,
        scheduler_cancel.clone(),
    ));
    tracing::info!("Distribution scheduler started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        adapters,
        provisioner,
        lock_sync,
        distribution,
        cloud,
        self_hosted,
        credentials,
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        // API v1 routes.
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500 JSON.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(cors)
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop the distribution scheduler.
    scheduler_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), scheduler_handle).await;
    tracing::info!("Distribution scheduler stopped");

    // Drop the event bus sender to close the broadcast channel. This signals
    // the outcome notifier to shut down.
    drop(event_bus);
    if let Some(handle) = notifier_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Outcome notifier shut down");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid; misconfiguration
/// should fail fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

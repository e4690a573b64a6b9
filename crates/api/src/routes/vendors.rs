//! Route definitions for vendor account onboarding endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::vendors;
use crate::state::AppState;

/// Routes mounted at `/vendors`.
///
/// ```text
/// POST /self-hosted/credentials  -> exchange_credentials
/// POST /cloud/connect-sessions   -> create_connect_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/self-hosted/credentials",
            post(vendors::exchange_credentials),
        )
        .route(
            "/cloud/connect-sessions",
            post(vendors::create_connect_session),
        )
}

pub mod distribution;
pub mod health;
pub mod listings;
pub mod locks;
pub mod vendors;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /locks                               list
/// /locks/sync                          pull inventory from one vendor (POST)
/// /locks/{id}                          get
/// /locks/{id}/lock                     engage bolt (POST)
/// /locks/{id}/unlock                   release bolt (POST)
/// /locks/{id}/codes                    vendor-side code listing (GET)
///
/// /listings/{listing_id}/lock          get, bind (PUT), release (DELETE)
/// /listings/{listing_id}/lock/history  full binding history (GET)
///
/// /distribution/runs                   trigger manual run (POST), list (GET)
/// /distribution/runs/{id}              run with items (GET)
///
/// /vendors/self-hosted/credentials     exchange and cache a token (POST)
/// /vendors/cloud/connect-sessions      webview onboarding session (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Lock registry and vendor passthrough.
        .nest("/locks", locks::router())
        // Listing/lock bindings.
        .nest("/listings", listings::router())
        // Distribution runs.
        .nest("/distribution", distribution::router())
        // Vendor account onboarding.
        .nest("/vendors", vendors::router())
}

//! Route definitions for distribution run endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::distribution;
use crate::state::AppState;

/// Routes mounted at `/distribution`.
///
/// ```text
/// POST /runs       -> trigger_run (manual)
/// GET  /runs       -> list_runs
/// GET  /runs/{id}  -> get_run
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/runs",
            get(distribution::list_runs).post(distribution::trigger_run),
        )
        .route("/runs/{id}", get(distribution::get_run))
}

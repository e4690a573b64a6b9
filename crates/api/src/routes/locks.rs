//! Route definitions for the lock registry and vendor passthrough endpoints.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::locks;
use crate::state::AppState;

/// Routes mounted at `/locks`.
///
/// ```text
/// GET    /                   -> list_locks
/// POST   /sync               -> sync_locks
/// GET    /{id}               -> get_lock
/// POST   /{id}/lock          -> lock_lock
/// POST   /{id}/unlock        -> unlock_lock
/// GET    /{id}/codes         -> list_codes
/// DELETE /{id}/codes/{name}  -> revoke_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(locks::list_locks))
        .route("/sync", post(locks::sync_locks))
        .route("/{id}", get(locks::get_lock))
        .route("/{id}/lock", post(locks::lock_lock))
        .route("/{id}/unlock", post(locks::unlock_lock))
        .route("/{id}/codes", get(locks::list_codes))
        .route("/{id}/codes/{name}", delete(locks::revoke_code))
}

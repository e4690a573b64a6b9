//! Route definitions for listing/lock binding endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::bindings;
use crate::state::AppState;

/// Routes mounted at `/listings`.
///
/// ```text
/// GET    /{listing_id}/lock          -> get_listing_lock
/// PUT    /{listing_id}/lock          -> put_listing_lock
/// DELETE /{listing_id}/lock          -> delete_listing_lock
/// GET    /{listing_id}/lock/history  -> get_listing_lock_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{listing_id}/lock",
            get(bindings::get_listing_lock)
                .put(bindings::put_listing_lock)
                .delete(bindings::delete_listing_lock),
        )
        .route(
            "/{listing_id}/lock/history",
            get(bindings::get_listing_lock_history),
        )
}

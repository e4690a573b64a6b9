//! Handlers for the listing/lock binding endpoints.
//!
//! A listing has at most one active lock and a lock has at most one active
//! listing; `PUT` is idempotent on the same pair and rejects a lock that is
//! already bound elsewhere with a 409 naming the conflicting listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use lockdesk_core::error::CoreError;
use lockdesk_core::types::DbId;
use lockdesk_db::models::binding::Binding;
use lockdesk_db::repositories::{BindingRepo, LockRepo};
use lockdesk_events::PlatformEvent;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /listings/{listing_id}/lock`.
#[derive(Debug, Deserialize)]
pub struct BindRequest {
    pub lock_id: DbId,
}

/// GET /listings/{listing_id}/lock
///
/// The listing's active binding, or 404 when it has none.
pub async fn get_listing_lock(
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Binding>>> {
    let binding = BindingRepo::find_active_for_listing(&state.pool, listing_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Active binding for listing",
            id: listing_id,
        })?;
    Ok(Json(DataResponse { data: binding }))
}

/// PUT /listings/{listing_id}/lock
///
/// Bind a lock to a listing. Re-binding the same pair is a no-op; binding a
/// new lock releases the listing's previous one; a lock actively bound to a
/// different listing is a 409.
pub async fn put_listing_lock(
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Json(body): Json<BindRequest>,
) -> AppResult<Json<DataResponse<Binding>>> {
    // Only registered, active locks are bindable.
    LockRepo::find_by_id(&state.pool, body.lock_id)
        .await?
        .filter(|l| l.is_active())
        .ok_or(CoreError::NotFound {
            entity: "Lock",
            id: body.lock_id,
        })?;

    let binding = BindingRepo::bind(&state.pool, listing_id, body.lock_id).await?;

    state.event_bus.publish(
        PlatformEvent::new("binding.created")
            .with_source("listing", listing_id)
            .with_payload(serde_json::json!({ "lock_id": body.lock_id })),
    );

    Ok(Json(DataResponse { data: binding }))
}

/// DELETE /listings/{listing_id}/lock
///
/// Release the listing's active binding. Releasing a listing with no active
/// binding is a no-op.
pub async fn delete_listing_lock(
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let active = BindingRepo::find_active_for_listing(&state.pool, listing_id).await?;
    BindingRepo::unbind(&state.pool, listing_id).await?;

    if let Some(binding) = active {
        state.event_bus.publish(
            PlatformEvent::new("binding.released")
                .with_source("listing", listing_id)
                .with_payload(serde_json::json!({ "lock_id": binding.lock_id })),
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /listings/{listing_id}/lock/history
///
/// All bindings the listing has ever had, newest first.
pub async fn get_listing_lock_history(
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Binding>>>> {
    let history = BindingRepo::history_for_listing(&state.pool, listing_id).await?;
    Ok(Json(DataResponse { data: history }))
}

//! Handlers for the lock registry and vendor passthrough endpoints.
//!
//! Registry reads come straight from the database; sync, lock/unlock, and
//! code listing go through to the vendor (with the standard one-shot auth
//! retry) and so can fail with gateway statuses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lockdesk_core::error::CoreError;
use lockdesk_core::types::DbId;
use lockdesk_core::Vendor;
use lockdesk_db::models::lock::Lock;
use lockdesk_db::repositories::LockRepo;
use lockdesk_events::PlatformEvent;
use lockdesk_provisioning::SyncSummary;
use lockdesk_vendors::VendorAccessCode;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /locks/sync`.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub vendor: Vendor,
}

/// Response payload for `POST /locks/sync`.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub summary: SyncSummary,
    pub locks: Vec<Lock>,
}

/// GET /locks
///
/// List all locks in the registry, active and deactivated.
pub async fn list_locks(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Lock>>>> {
    let locks = LockRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: locks }))
}

/// GET /locks/{id}
pub async fn get_lock(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Lock>>> {
    let lock = LockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Lock", id })?;
    Ok(Json(DataResponse { data: lock }))
}

/// POST /locks/sync
///
/// Pull the lock inventory from one vendor: upsert everything it reports,
/// deactivate registry rows it no longer reports.
pub async fn sync_locks(
    State(state): State<AppState>,
    Json(body): Json<SyncRequest>,
) -> AppResult<Json<DataResponse<SyncResponse>>> {
    let (summary, locks) = state.lock_sync.sync(body.vendor).await?;
    Ok(Json(DataResponse {
        data: SyncResponse { summary, locks },
    }))
}

/// POST /locks/{id}/lock
pub async fn lock_lock(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.provisioner.lock(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /locks/{id}/unlock
pub async fn unlock_lock(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.provisioner.unlock(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /locks/{id}/codes
///
/// Passthrough listing of the codes currently installed at the vendor.
/// This is the vendor's view, not the local ledger's.
pub async fn list_codes(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<VendorAccessCode>>>> {
    let codes = state.provisioner.list_vendor_codes(id).await?;
    Ok(Json(DataResponse { data: codes }))
}

/// DELETE /locks/{id}/codes/{name}
///
/// Revoke a named code from the vendor and the ledger. Revoking a code that
/// exists in neither place succeeds, so the operation is safe to repeat.
pub async fn revoke_code(
    State(state): State<AppState>,
    Path((id, name)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    state.provisioner.revoke_code(id, &name).await?;

    state.event_bus.publish(
        PlatformEvent::new("code.revoked")
            .with_source("lock", id)
            .with_payload(serde_json::json!({ "name": name })),
    );

    Ok(StatusCode::NO_CONTENT)
}

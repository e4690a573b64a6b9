//! Handlers for distribution run endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lockdesk_core::error::CoreError;
use lockdesk_core::types::DbId;
use lockdesk_db::models::distribution::{DistributionItem, DistributionRunRecord};
use lockdesk_db::repositories::DistributionRepo;
use lockdesk_provisioning::RunTrigger;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the run list endpoint.
#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    /// How many runs to return, newest first (default: 50).
    pub limit: Option<i64>,
}

/// A run together with its per-reservation items.
#[derive(Debug, Serialize)]
pub struct RunDetail {
    pub run: DistributionRunRecord,
    pub items: Vec<DistributionItem>,
}

/// POST /distribution/runs
///
/// Trigger a manual distribution run for today's arrivals and wait for it to
/// finish. Safe to re-run: already-provisioned codes are verified, not
/// duplicated.
pub async fn trigger_run(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<DistributionRunRecord>>)> {
    let run = state.distribution.execute(RunTrigger::Manual).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: run })))
}

/// GET /distribution/runs
pub async fn list_runs(
    State(state): State<AppState>,
    Query(query): Query<RunsQuery>,
) -> AppResult<Json<DataResponse<Vec<DistributionRunRecord>>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let runs = DistributionRepo::list_runs(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: runs }))
}

/// GET /distribution/runs/{id}
///
/// A single run with its items in processing order.
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RunDetail>>> {
    let run = DistributionRepo::find_run(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Distribution run",
            id,
        })?;
    let items = DistributionRepo::list_items(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: RunDetail { run, items },
    }))
}

//! Handlers for vendor account onboarding endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lockdesk_vendors::ConnectSession;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /vendors/self-hosted/credentials`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response payload for a successful credential exchange. The token itself
/// never leaves the server.
#[derive(Debug, Serialize)]
pub struct CredentialsResponse {
    pub account_ref: String,
}

/// POST /vendors/self-hosted/credentials
///
/// Exchange a username/password for an access token at the self-hosted
/// vendor and cache it. Exchanging again for the same account overwrites
/// the previous token.
pub async fn exchange_credentials(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CredentialsResponse>>)> {
    if body.username.trim().is_empty() {
        return Err(AppError::BadRequest("username must not be empty".into()));
    }

    let token = state
        .self_hosted
        .exchange_credentials(&body.username, &body.password)
        .await?;
    state.credentials.save(&body.username, &token).await?;

    tracing::info!(account_ref = %body.username, "Vendor credentials exchanged");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CredentialsResponse {
                account_ref: body.username,
            },
        }),
    ))
}

/// POST /vendors/cloud/connect-sessions
///
/// Create a short-lived session at the cloud vendor whose URL an operator
/// opens in a webview to attach the vendor account.
pub async fn create_connect_session(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<ConnectSession>>)> {
    let session = state.cloud.create_connect_session().await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

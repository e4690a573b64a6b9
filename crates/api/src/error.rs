use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use lockdesk_core::error::CoreError;
use lockdesk_db::repositories::BindingError;
use lockdesk_provisioning::{DistributionError, ProvisionError, ReservationSourceError};
use lockdesk_vendors::VendorError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error taxonomies and implements [`IntoResponse`] to
/// produce consistent JSON error responses. Upstream vendor failures map to
/// the gateway statuses (502 for vendor-side errors, 503 for unreachability)
/// so callers can distinguish "our fault" from "their fault".
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `lockdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A listing/lock binding error.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// A vendor adapter error.
    #[error(transparent)]
    Vendor(#[from] VendorError),

    /// A provisioning error.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// A distribution run error.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Binding(err) => match err {
                BindingError::LockAlreadyBound { .. } => {
                    (StatusCode::CONFLICT, "LOCK_ALREADY_BOUND", err.to_string())
                }
                BindingError::Db(db_err) => classify_sqlx_error(db_err),
            },

            AppError::Vendor(err) => classify_vendor_error(err),

            AppError::Provision(err) => match err {
                ProvisionError::UnknownLock(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Lock {id} is not registered"),
                ),
                ProvisionError::UnknownVendor(parse_err) => {
                    tracing::error!(error = %parse_err, "Corrupt vendor column in lock registry");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                ProvisionError::Vendor(vendor_err) => classify_vendor_error(vendor_err),
                ProvisionError::Db(db_err) => classify_sqlx_error(db_err),
            },

            AppError::Distribution(err) => match err {
                DistributionError::Source(ReservationSourceError::Unavailable(msg)) => {
                    tracing::error!(error = %msg, "Reservation source unreachable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "RESERVATION_SOURCE_UNAVAILABLE",
                        "Reservation source is unreachable".to_string(),
                    )
                }
                DistributionError::Source(ReservationSourceError::Api { status, .. }) => (
                    StatusCode::BAD_GATEWAY,
                    "RESERVATION_SOURCE_ERROR",
                    format!("Reservation source returned status {status}"),
                ),
                DistributionError::Db(db_err) => classify_sqlx_error(db_err),
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a vendor adapter error into an HTTP status, error code, and message.
///
/// - `AuthFailed` and `Api` are upstream-side failures: 502.
/// - `Unavailable` (timeout, connect failure, 5xx) maps to 503.
/// - `LockNotFound`/`CodeNotFound` map to 404.
/// - `Credential` is a local storage failure: sanitized 500.
fn classify_vendor_error(err: &VendorError) -> (StatusCode, &'static str, String) {
    match err {
        VendorError::AuthFailed => (
            StatusCode::BAD_GATEWAY,
            "VENDOR_AUTH_FAILED",
            "Vendor rejected our credentials".to_string(),
        ),
        VendorError::Api { status, .. } => (
            StatusCode::BAD_GATEWAY,
            "VENDOR_ERROR",
            format!("Vendor API returned status {status}"),
        ),
        VendorError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Vendor unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "VENDOR_UNAVAILABLE",
                "Vendor API is unreachable".to_string(),
            )
        }
        VendorError::LockNotFound(native_id) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Lock {native_id} not found at vendor"),
        ),
        VendorError::CodeNotFound(code_id) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Access code {code_id} not found at vendor"),
        ),
        VendorError::Credential(msg) => {
            tracing::error!(error = %msg, "Credential store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

//! Shared response classification for both vendor HTTP APIs.

use crate::adapter::VendorError;

/// Which entity a 404 refers to for the operation in flight.
#[derive(Clone, Copy)]
pub(crate) enum NotFoundKind {
    Lock,
    Code,
}

/// Map a non-success status to the adapter error taxonomy: 401/403 is an
/// auth failure, 404 is lock/code-not-found depending on the operation,
/// 5xx means the vendor is unavailable.
pub(crate) async fn classify_failure(
    response: reqwest::Response,
    not_found: NotFoundKind,
) -> Result<reqwest::Response, VendorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(match status.as_u16() {
        401 | 403 => VendorError::AuthFailed,
        404 => match not_found {
            NotFoundKind::Lock => VendorError::LockNotFound(url),
            NotFoundKind::Code => VendorError::CodeNotFound(url),
        },
        s if s >= 500 => VendorError::Unavailable(format!("Vendor returned {s}")),
        s => VendorError::Api { status: s, body },
    })
}

/// Classify, then parse the JSON body of a successful response.
pub(crate) async fn parse<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    not_found: NotFoundKind,
) -> Result<T, VendorError> {
    let response = classify_failure(response, not_found).await?;
    Ok(response.json::<T>().await?)
}

/// Classify and discard the body.
pub(crate) async fn check(
    response: reqwest::Response,
    not_found: NotFoundKind,
) -> Result<(), VendorError> {
    classify_failure(response, not_found).await?;
    Ok(())
}

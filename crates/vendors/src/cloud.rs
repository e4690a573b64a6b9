//! Adapter for the cloud-hosted lock platform.
//!
//! REST API authenticated with a static workspace API key sent as a bearer
//! token. Device onboarding happens through a vendor-hosted webview: we open
//! a connect session and hand the returned URL to the UI.

use async_trait::async_trait;
use serde::Deserialize;

use lockdesk_core::Vendor;

use crate::adapter::{
    CodeSpec, VendorAccessCode, VendorAdapter, VendorError, VendorLock, VendorLockDetail,
};
use crate::http::{check, parse, NotFoundKind};

/// Configuration for the cloud vendor, loaded from the environment.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Base API URL, e.g. `https://api.cloudlock.example`.
    pub base_url: String,
    /// Workspace API key.
    pub api_key: String,
}

/// A vendor-hosted onboarding webview session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConnectSession {
    pub session_id: String,
    /// URL the UI embeds so the owner can link their lock account.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CloudLockPayload {
    device_id: String,
    name: String,
    #[serde(default)]
    online: Option<bool>,
    #[serde(default)]
    battery_level: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ListLocksResponse {
    locks: Vec<CloudLockPayload>,
}

#[derive(Debug, Deserialize)]
struct LockDetailResponse {
    lock: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CloudAccessCodePayload {
    access_code_id: String,
    name: String,
    code: String,
    #[serde(default)]
    starts_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    ends_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct ListAccessCodesResponse {
    access_codes: Vec<CloudAccessCodePayload>,
}

#[derive(Debug, Deserialize)]
struct CreateAccessCodeResponse {
    access_code: CloudAccessCodePayload,
}

#[derive(Debug, Deserialize)]
struct ConnectSessionPayload {
    connect_session_id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct CreateConnectSessionResponse {
    connect_session: ConnectSessionPayload,
}

impl From<CloudAccessCodePayload> for VendorAccessCode {
    fn from(p: CloudAccessCodePayload) -> Self {
        VendorAccessCode {
            vendor_code_id: p.access_code_id,
            name: p.name,
            value: p.code,
            valid_from: p.starts_at,
            valid_to: p.ends_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// [`VendorAdapter`] for the cloud-hosted platform.
pub struct CloudLockAdapter {
    client: reqwest::Client,
    config: CloudConfig,
}

impl CloudLockAdapter {
    /// Create an adapter reusing an existing [`reqwest::Client`] (the client
    /// carries the bounded per-request timeout).
    pub fn new(client: reqwest::Client, config: CloudConfig) -> Self {
        Self { client, config }
    }

    /// Open a webview onboarding session at the vendor.
    pub async fn create_connect_session(&self) -> Result<ConnectSession, VendorError> {
        let response = self
            .client
            .post(format!("{}/v1/connect_sessions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        let body: CreateConnectSessionResponse = parse(response, NotFoundKind::Lock).await?;
        Ok(ConnectSession {
            session_id: body.connect_session.connect_session_id,
            url: body.connect_session.url,
        })
    }

    fn device_url(&self, native_id: &str, suffix: &str) -> String {
        format!("{}/v1/locks/{native_id}{suffix}", self.config.base_url)
    }
}

#[async_trait]
impl VendorAdapter for CloudLockAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Cloud
    }

    async fn list_locks(&self) -> Result<Vec<VendorLock>, VendorError> {
        let response = self
            .client
            .get(format!("{}/v1/locks", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        let body: ListLocksResponse = parse(response, NotFoundKind::Lock).await?;
        Ok(body
            .locks
            .into_iter()
            .map(|l| VendorLock {
                capabilities: serde_json::json!({
                    "online": l.online,
                    "battery_level": l.battery_level,
                }),
                native_id: l.device_id,
                display_name: l.name,
            })
            .collect())
    }

    async fn lock_detail(&self, native_id: &str) -> Result<VendorLockDetail, VendorError> {
        let response = self
            .client
            .get(self.device_url(native_id, ""))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        let body: LockDetailResponse = parse(response, NotFoundKind::Lock).await?;
        let lock: CloudLockPayload = serde_json::from_value(body.lock.clone())
            .map_err(|e| VendorError::Unavailable(format!("Malformed lock detail: {e}")))?;
        Ok(VendorLockDetail {
            native_id: lock.device_id,
            display_name: lock.name,
            online: lock.online,
            battery_percent: lock.battery_level,
            raw: body.lock,
        })
    }

    async fn lock(&self, native_id: &str) -> Result<(), VendorError> {
        let response = self
            .client
            .post(self.device_url(native_id, "/lock"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        check(response, NotFoundKind::Lock).await
    }

    async fn unlock(&self, native_id: &str) -> Result<(), VendorError> {
        let response = self
            .client
            .post(self.device_url(native_id, "/unlock"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        check(response, NotFoundKind::Lock).await
    }

    async fn list_access_codes(
        &self,
        native_id: &str,
    ) -> Result<Vec<VendorAccessCode>, VendorError> {
        let response = self
            .client
            .get(self.device_url(native_id, "/access_codes"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        let body: ListAccessCodesResponse = parse(response, NotFoundKind::Lock).await?;
        Ok(body.access_codes.into_iter().map(Into::into).collect())
    }

    async fn create_access_code(
        &self,
        native_id: &str,
        spec: &CodeSpec,
    ) -> Result<String, VendorError> {
        let payload = serde_json::json!({
            "name": spec.name,
            "code": spec.value,
            "starts_at": spec.valid_from,
            "ends_at": spec.valid_to,
        });
        let response = self
            .client
            .post(self.device_url(native_id, "/access_codes"))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        let body: CreateAccessCodeResponse = parse(response, NotFoundKind::Lock).await?;
        Ok(body.access_code.access_code_id)
    }

    async fn delete_access_code(
        &self,
        native_id: &str,
        vendor_code_id: &str,
    ) -> Result<(), VendorError> {
        let response = self
            .client
            .delete(self.device_url(native_id, &format!("/access_codes/{vendor_code_id}")))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        match check(response, NotFoundKind::Code).await {
            // Already gone at the vendor: the desired end state.
            Err(VendorError::CodeNotFound(_)) => Ok(()),
            other => other,
        }
    }
}

//! Adapter for the self-hosted lock platform.
//!
//! Authentication is a two-step flow: the account username/password are
//! exchanged for a per-account access token, which the adapter pulls from the
//! [`CredentialStore`] on every call. The vendor's token contract requires the
//! password to be sent as a SHA-256 hex digest rather than plaintext, a
//! vendor convention, not a security boundary on our side. There is no
//! visible token expiry; a rejected token surfaces as
//! [`VendorError::AuthFailed`] and [`refresh_credentials`] re-exchanges.
//!
//! [`refresh_credentials`]: VendorAdapter::refresh_credentials

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use lockdesk_core::Vendor;

use crate::adapter::{
    CodeSpec, VendorAccessCode, VendorAdapter, VendorError, VendorLock, VendorLockDetail,
};
use crate::credentials::CredentialStore;
use crate::http::{check, classify_failure, parse, NotFoundKind};

/// Configuration for the self-hosted vendor, loaded from the environment.
#[derive(Debug, Clone)]
pub struct SelfHostedConfig {
    /// Base API URL of the self-hosted controller.
    pub base_url: String,
    /// Account username; doubles as the credential-cache account reference.
    pub username: String,
    /// Account password (hashed before transmission).
    pub password: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ShLockPayload {
    id: i64,
    label: String,
    #[serde(default)]
    battery: Option<i32>,
    #[serde(default)]
    online: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ShListResponse<T> {
    list: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ShCodePayload {
    password_id: i64,
    alias: String,
    password: String,
    #[serde(default)]
    start_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    end_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct CreateCodeResponse {
    password_id: i64,
}

impl From<ShCodePayload> for VendorAccessCode {
    fn from(p: ShCodePayload) -> Self {
        VendorAccessCode {
            vendor_code_id: p.password_id.to_string(),
            name: p.alias,
            value: p.password,
            valid_from: p.start_at,
            valid_to: p.end_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// [`VendorAdapter`] for the self-hosted platform.
pub struct SelfHostedLockAdapter {
    client: reqwest::Client,
    config: SelfHostedConfig,
    store: CredentialStore,
}

impl SelfHostedLockAdapter {
    pub fn new(client: reqwest::Client, config: SelfHostedConfig, store: CredentialStore) -> Self {
        Self {
            client,
            config,
            store,
        }
    }

    /// Exchange username/password for a fresh access token.
    ///
    /// The password travels as its SHA-256 hex digest per the vendor's token
    /// contract. Returns the raw token; the caller decides whether to cache
    /// it (the trait-level [`refresh_credentials`] does).
    ///
    /// [`refresh_credentials`]: VendorAdapter::refresh_credentials
    pub async fn exchange_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, VendorError> {
        let payload = serde_json::json!({
            "username": username,
            "password": hash_password(password),
        });
        let response = self
            .client
            .post(format!("{}/api/auth/token", self.config.base_url))
            .json(&payload)
            .send()
            .await?;
        let body: TokenResponse = parse(response, NotFoundKind::Lock).await?;
        Ok(body.access_token)
    }

    /// Cached token, or `AuthFailed` when none was ever exchanged; the
    /// caller's standard re-exchange path then populates the cache.
    async fn token(&self) -> Result<String, VendorError> {
        self.store
            .get(&self.config.username)
            .await?
            .ok_or(VendorError::AuthFailed)
    }

    fn lock_url(&self, native_id: &str, suffix: &str) -> String {
        format!("{}/api/locks/{native_id}{suffix}", self.config.base_url)
    }
}

#[async_trait]
impl VendorAdapter for SelfHostedLockAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::SelfHosted
    }

    async fn list_locks(&self) -> Result<Vec<VendorLock>, VendorError> {
        let token = self.token().await?;
        let response = self
            .client
            .get(format!("{}/api/locks", self.config.base_url))
            .bearer_auth(&token)
            .send()
            .await?;
        let body: ShListResponse<ShLockPayload> = parse(response, NotFoundKind::Lock).await?;
        Ok(body
            .list
            .into_iter()
            .map(|l| VendorLock {
                capabilities: serde_json::json!({
                    "online": l.online,
                    "battery_level": l.battery,
                }),
                native_id: l.id.to_string(),
                display_name: l.label,
            })
            .collect())
    }

    async fn lock_detail(&self, native_id: &str) -> Result<VendorLockDetail, VendorError> {
        let token = self.token().await?;
        let response = self
            .client
            .get(self.lock_url(native_id, ""))
            .bearer_auth(&token)
            .send()
            .await?;
        let response = classify_failure(response, NotFoundKind::Lock).await?;
        let raw: serde_json::Value = response.json().await?;
        let lock: ShLockPayload = serde_json::from_value(raw.clone())
            .map_err(|e| VendorError::Unavailable(format!("Malformed lock detail: {e}")))?;
        Ok(VendorLockDetail {
            native_id: lock.id.to_string(),
            display_name: lock.label,
            online: lock.online,
            battery_percent: lock.battery,
            raw,
        })
    }

    async fn lock(&self, native_id: &str) -> Result<(), VendorError> {
        let token = self.token().await?;
        let response = self
            .client
            .post(self.lock_url(native_id, "/lock"))
            .bearer_auth(&token)
            .send()
            .await?;
        check(response, NotFoundKind::Lock).await
    }

    async fn unlock(&self, native_id: &str) -> Result<(), VendorError> {
        let token = self.token().await?;
        let response = self
            .client
            .post(self.lock_url(native_id, "/unlock"))
            .bearer_auth(&token)
            .send()
            .await?;
        check(response, NotFoundKind::Lock).await
    }

    async fn list_access_codes(
        &self,
        native_id: &str,
    ) -> Result<Vec<VendorAccessCode>, VendorError> {
        let token = self.token().await?;
        let response = self
            .client
            .get(self.lock_url(native_id, "/passwords"))
            .bearer_auth(&token)
            .send()
            .await?;
        let body: ShListResponse<ShCodePayload> = parse(response, NotFoundKind::Lock).await?;
        Ok(body.list.into_iter().map(Into::into).collect())
    }

    async fn create_access_code(
        &self,
        native_id: &str,
        spec: &CodeSpec,
    ) -> Result<String, VendorError> {
        let token = self.token().await?;
        let payload = serde_json::json!({
            "alias": spec.name,
            "password": spec.value,
            "start_at": spec.valid_from,
            "end_at": spec.valid_to,
        });
        let response = self
            .client
            .post(self.lock_url(native_id, "/passwords"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        let body: CreateCodeResponse = parse(response, NotFoundKind::Lock).await?;
        Ok(body.password_id.to_string())
    }

    async fn delete_access_code(
        &self,
        native_id: &str,
        vendor_code_id: &str,
    ) -> Result<(), VendorError> {
        let token = self.token().await?;
        let response = self
            .client
            .delete(self.lock_url(native_id, &format!("/passwords/{vendor_code_id}")))
            .bearer_auth(&token)
            .send()
            .await?;
        match check(response, NotFoundKind::Code).await {
            // Already gone at the vendor: the desired end state.
            Err(VendorError::CodeNotFound(_)) => Ok(()),
            other => other,
        }
    }

    async fn refresh_credentials(&self) -> Result<(), VendorError> {
        let token = self
            .exchange_credentials(&self.config.username, &self.config.password)
            .await?;
        self.store.save(&self.config.username, &token).await?;
        tracing::info!(account = %self.config.username, "Self-hosted vendor token re-exchanged");
        Ok(())
    }
}

/// SHA-256 hex digest of the account password, as the vendor's token
/// endpoint expects it.
fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{digest:x}")
}

//! Database-backed cache for self-hosted vendor access tokens.

use sqlx::PgPool;

use lockdesk_db::repositories::CredentialRepo;

/// A deliberately dumb token cache over the `vendor_credentials` table.
///
/// It is a cache, not an authority: there is no TTL and no background
/// refresh. Call sites detect an expired or revoked token through a
/// `VendorAuthFailed` from the adapter and re-exchange; concurrent overwrites
/// are last-write-wins, which at worst costs one extra failed vendor call.
#[derive(Clone)]
pub struct CredentialStore {
    pool: PgPool,
}

impl CredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The cached token for an account, if one was ever exchanged.
    pub async fn get(&self, account_ref: &str) -> Result<Option<String>, sqlx::Error> {
        let credential = CredentialRepo::find_by_account(&self.pool, account_ref).await?;
        Ok(credential.map(|c| c.access_token))
    }

    /// Overwrite the cached token, stamping `obtained_at`.
    pub async fn save(&self, account_ref: &str, access_token: &str) -> Result<(), sqlx::Error> {
        CredentialRepo::save(&self.pool, account_ref, access_token).await?;
        tracing::debug!(account_ref, "Vendor access token cached");
        Ok(())
    }
}

//! Repository for the `vendor_credentials` cache table.

use sqlx::PgPool;

use crate::models::credential::VendorCredential;

const CREDENTIAL_COLUMNS: &str = "id, account_ref, access_token, obtained_at";

/// Cached access tokens for self-hosted vendor accounts. Last write wins; a
/// stale token just causes one failed vendor call followed by re-exchange.
pub struct CredentialRepo;

impl CredentialRepo {
    /// Fetch the cached token for an account, if any.
    pub async fn find_by_account(
        pool: &PgPool,
        account_ref: &str,
    ) -> Result<Option<VendorCredential>, sqlx::Error> {
        let query =
            format!("SELECT {CREDENTIAL_COLUMNS} FROM vendor_credentials WHERE account_ref = $1");
        sqlx::query_as::<_, VendorCredential>(&query)
            .bind(account_ref)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the cached token for an account, stamping `obtained_at`.
    pub async fn save(
        pool: &PgPool,
        account_ref: &str,
        access_token: &str,
    ) -> Result<VendorCredential, sqlx::Error> {
        let query = format!(
            "INSERT INTO vendor_credentials (account_ref, access_token) \
             VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_vendor_credentials_account_ref DO UPDATE SET \
                 access_token = EXCLUDED.access_token, \
                 obtained_at = now() \
             RETURNING {CREDENTIAL_COLUMNS}"
        );
        sqlx::query_as::<_, VendorCredential>(&query)
            .bind(account_ref)
            .bind(access_token)
            .fetch_one(pool)
            .await
    }
}

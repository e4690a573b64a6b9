use std::time::Duration;

use lockdesk_vendors::{CloudConfig, SelfHostedConfig};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development, except
/// the vendor endpoints, which must point at real (or stubbed) APIs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Per-request timeout for outbound vendor HTTP calls (default: `10`).
    pub vendor_timeout_secs: u64,
    /// UTC hour (0-23) after which the daily distribution run fires
    /// (default: `6`).
    pub distribution_hour: u32,
    /// Cloud vendor endpoint and API key.
    pub cloud: CloudConfig,
    /// Self-hosted vendor endpoint and operator account.
    pub self_hosted: SelfHostedConfig,
    /// Reservation service base URL.
    pub reservation_api_url: String,
    /// Optional bearer token for the reservation service.
    pub reservation_api_token: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                       |
    /// |----------------------------|-------------------------------|
    /// | `HOST`                     | `0.0.0.0`                     |
    /// | `PORT`                     | `3000`                        |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                          |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                          |
    /// | `VENDOR_TIMEOUT_SECS`      | `10`                          |
    /// | `DISTRIBUTION_HOUR`        | `6`                           |
    /// | `CLOUD_LOCK_API_URL`       | `http://localhost:9081`       |
    /// | `CLOUD_LOCK_API_KEY`       | (empty)                       |
    /// | `SELF_HOSTED_LOCK_API_URL` | `http://localhost:9082`       |
    /// | `SELF_HOSTED_USERNAME`     | `operator`                    |
    /// | `SELF_HOSTED_PASSWORD`     | (empty)                       |
    /// | `RESERVATION_API_URL`      | `http://localhost:9083`       |
    /// | `RESERVATION_API_TOKEN`    | (unset)                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let vendor_timeout_secs: u64 = std::env::var("VENDOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("VENDOR_TIMEOUT_SECS must be a valid u64");

        let distribution_hour: u32 = std::env::var("DISTRIBUTION_HOUR")
            .unwrap_or_else(|_| "6".into())
            .parse()
            .expect("DISTRIBUTION_HOUR must be a valid hour (0-23)");
        assert!(
            distribution_hour < 24,
            "DISTRIBUTION_HOUR must be a valid hour (0-23)"
        );

        let cloud = CloudConfig {
            base_url: std::env::var("CLOUD_LOCK_API_URL")
                .unwrap_or_else(|_| "http://localhost:9081".into()),
            api_key: std::env::var("CLOUD_LOCK_API_KEY").unwrap_or_default(),
        };

        let self_hosted = SelfHostedConfig {
            base_url: std::env::var("SELF_HOSTED_LOCK_API_URL")
                .unwrap_or_else(|_| "http://localhost:9082".into()),
            username: std::env::var("SELF_HOSTED_USERNAME")
                .unwrap_or_else(|_| "operator".into()),
            password: std::env::var("SELF_HOSTED_PASSWORD").unwrap_or_default(),
        };

        let reservation_api_url = std::env::var("RESERVATION_API_URL")
            .unwrap_or_else(|_| "http://localhost:9083".into());
        let reservation_api_token = std::env::var("RESERVATION_API_TOKEN").ok();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            vendor_timeout_secs,
            distribution_hour,
            cloud,
            self_hosted,
            reservation_api_url,
            reservation_api_token,
        }
    }

    /// Build the shared HTTP client used for all outbound vendor calls.
    ///
    /// A hung vendor surfaces as a timeout, which the adapters classify as
    /// `VendorError::Unavailable`.
    pub fn vendor_http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.vendor_timeout_secs))
            .build()
            .expect("Failed to build outbound HTTP client")
    }
}

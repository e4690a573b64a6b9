//! The supported smart-lock platforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A third-party smart-lock platform.
///
/// Stored in the database as lowercase text (`"cloud"` / `"self_hosted"`),
/// matching the `CHECK` constraint on `locks.vendor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    /// Cloud-hosted platform: API-key authenticated, webview onboarding.
    Cloud,
    /// Self-hosted platform: username/password exchanged for an access token.
    SelfHosted,
}

impl Vendor {
    /// The database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::Cloud => "cloud",
            Vendor::SelfHosted => "self_hosted",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown vendor: {0}")]
pub struct UnknownVendor(pub String);

impl FromStr for Vendor {
    type Err = UnknownVendor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cloud" => Ok(Vendor::Cloud),
            "self_hosted" => Ok(Vendor::SelfHosted),
            other => Err(UnknownVendor(other.to_string())),
        }
    }
}

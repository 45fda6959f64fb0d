use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_auth_method() -> String {
    "social".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Kiro OAuth credential file, as written by the import tooling. Unknown
/// keys such as `_comment` and `_originalId` ride along in `extras`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KiroCredentials {
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_auth_method")]
    pub auth_method: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub profile_arn: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl KiroCredentials {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, String> {
        serde_json::from_value(value.clone())
            .map_err(|e| format!("failed_to_parse_kiro_credentials: {}", e))
    }

    /// Whether the cached access token exists and has not expired.
    pub fn is_token_valid(&self) -> bool {
        if self.access_token.is_none() {
            return false;
        }
        match self.expires_at {
            Some(expiry) => expiry > Utc::now(),
            None => true,
        }
    }

    /// Token is missing, expired, or expiring within five minutes.
    pub fn needs_refresh(&self) -> bool {
        if !self.is_token_valid() {
            return true;
        }
        match self.expires_at {
            Some(expiry) => expiry <= Utc::now() + chrono::Duration::minutes(5),
            None => false,
        }
    }
}

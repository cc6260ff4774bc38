//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;
use crate::wizard::StepFallback;

/// App slug whose keys back the workspace directory integration.
pub const GOOGLE_APP_SLUG: &str = "google-calendar";

/// Server configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    /// How the wizard treats unknown step identifiers.
    pub step_fallback: StepFallback,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/team-setup.db"),
            step_fallback: StepFallback::FirstStep,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("TEAM_SETUP_PORT") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "TEAM_SETUP_PORT".into(),
                message: format!("{e}"),
            })?,
            Err(_) => defaults.port,
        };

        let db_path = std::env::var("TEAM_SETUP_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let step_fallback = if env_flag("TEAM_SETUP_STRICT_STEPS") {
            StepFallback::Reject
        } else {
            StepFallback::FirstStep
        };

        Ok(Self {
            port,
            db_path,
            step_fallback,
        })
    }
}

/// Endpoints and limits for the Google Workspace directory client.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Base URL of the Admin SDK, without trailing slash.
    pub api_base: String,
    /// OAuth2 token endpoint used for refresh-token grants.
    pub token_url: String,
    /// Page-size cap sent as `maxResults`.
    pub max_results: u32,
    /// Customer scope sent as `customer`. Single-domain only.
    pub customer: String,
    pub timeout: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_base: "https://admin.googleapis.com".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            max_results: 200,
            customer: "my_customer".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl DirectoryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base = std::env::var("GOOGLE_DIRECTORY_API_BASE")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);

        let token_url = std::env::var("GOOGLE_OAUTH_TOKEN_URL").unwrap_or(defaults.token_url);

        let timeout = std::env::var("GOOGLE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            api_base,
            token_url,
            timeout,
            ..defaults
        }
    }
}

/// OAuth application credentials for a provider app.
#[derive(Debug, Clone)]
pub struct AppKeys {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl AppKeys {
    /// Validate a stored key object.
    ///
    /// Both `client_id` and `client_secret` must be non-empty strings; any
    /// other value counts as missing.
    pub fn from_value(slug: &str, value: &serde_json::Value) -> Result<Self, ConfigError> {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let client_id = field("client_id").ok_or_else(|| ConfigError::MissingRequired {
            key: format!("{slug}.client_id"),
            hint: "Google client_id missing.".into(),
        })?;
        let client_secret = field("client_secret").ok_or_else(|| ConfigError::MissingRequired {
            key: format!("{slug}.client_secret"),
            hint: "Google client_secret missing.".into(),
        })?;

        Ok(Self {
            client_id,
            client_secret: SecretString::from(client_secret),
        })
    }

    /// Key object suitable for storing in `app_keys`.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret.expose_secret(),
        })
    }

    /// Read `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` for seeding.
    /// Returns `None` unless both are set.
    pub fn google_from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok()?;
        Self::from_value(
            GOOGLE_APP_SLUG,
            &serde_json::json!({
                "client_id": client_id,
                "client_secret": client_secret,
            }),
        )
        .ok()
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn app_keys_require_client_id() {
        let err = AppKeys::from_value(GOOGLE_APP_SLUG, &json!({"client_secret": "s"})).unwrap_err();
        match err {
            ConfigError::MissingRequired { key, .. } => {
                assert_eq!(key, "google-calendar.client_id")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn app_keys_require_client_secret() {
        let err = AppKeys::from_value(GOOGLE_APP_SLUG, &json!({"client_id": "id"})).unwrap_err();
        match err {
            ConfigError::MissingRequired { key, .. } => {
                assert_eq!(key, "google-calendar.client_secret")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn app_keys_treat_non_strings_and_blanks_as_missing() {
        assert!(AppKeys::from_value("x", &json!({"client_id": 12, "client_secret": "s"})).is_err());
        assert!(AppKeys::from_value("x", &json!({"client_id": "  ", "client_secret": "s"})).is_err());
        assert!(AppKeys::from_value("x", &json!({"client_id": "id", "client_secret": null})).is_err());
    }

    #[test]
    fn app_keys_roundtrip_through_value() {
        let keys =
            AppKeys::from_value("x", &json!({"client_id": "id", "client_secret": "shh"})).unwrap();
        assert_eq!(keys.client_id, "id");
        assert_eq!(keys.client_secret.expose_secret(), "shh");
        assert_eq!(keys.to_value()["client_secret"], "shh");
    }

    #[test]
    fn directory_defaults() {
        let config = DirectoryConfig::default();
        assert_eq!(config.max_results, 200);
        assert_eq!(config.customer, "my_customer");
    }
}

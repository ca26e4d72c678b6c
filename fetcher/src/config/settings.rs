// Fetcher settings: where series live, where the exchange is, and which series to refresh.
use crate::error::{FetcherError, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;

pub const API_KEY_VAR: &str = "API_KEY";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const BASE_URL_VAR: &str = "BINANCE_BASE_URL";

/// One (symbol, timeframe, lookback) triple to refresh.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SeriesJob {
    pub symbol: String,
    pub timeframe: String,
    pub lookback_days: i64,
}

impl SeriesJob {
    pub fn new(symbol: &str, timeframe: &str, lookback_days: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            lookback_days,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetcherSettings {
    pub data_dir: PathBuf,
    pub base_url: String,
    pub request_limit: u16,
    pub request_timeout_secs: u64,
    pub jobs: Vec<SeriesJob>,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        FetcherSettings {
            data_dir: PathBuf::from("data"),
            base_url: "https://api.binance.com".to_string(),
            request_limit: 1000,
            request_timeout_secs: 30,
            jobs: vec![SeriesJob::new("BTCUSDT", "1m", 720)],
        }
    }
}

impl FetcherSettings {
    /// Defaults, with the exchange base URL overridable from the environment.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_VAR) {
            if !url.trim().is_empty() {
                settings.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        settings
    }
}

/// Exchange credentials, read once at startup and held for the life of the process.
pub struct Credentials {
    pub api_key: SecretString,
    pub secret_key: SecretString,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| FetcherError::ConfigError(format!("environment variable {} is not set", name)))
        };
        Ok(Self::new(read(API_KEY_VAR)?, read(SECRET_KEY_VAR)?))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    #[test]
    fn test_default_jobs() {
        let settings = FetcherSettings::default();
        assert_eq!(settings.jobs, vec![SeriesJob::new("BTCUSDT", "1m", 720)]);
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert_eq!(settings.request_limit, 1000);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let vars: HashMap<&str, &str> = [(API_KEY_VAR, "key"), (SECRET_KEY_VAR, "secret")].into();
        let creds = Credentials::from_lookup(|n| vars.get(n).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.api_key.expose_secret(), "key");
        assert_eq!(creds.secret_key.expose_secret(), "secret");
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let vars: HashMap<&str, &str> = [(API_KEY_VAR, "key")].into();
        let err = Credentials::from_lookup(|n| vars.get(n).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, FetcherError::ConfigError(_)));
        assert!(err.to_string().contains(SECRET_KEY_VAR));
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let err = Credentials::from_lookup(|_| Some("  ".to_string())).unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("visible-key", "visible-secret");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("visible"));
    }

    #[test]
    fn test_settings_deserialize() {
        let json = r#"{
            "data_dir": "/tmp/series",
            "base_url": "http://localhost:9000",
            "request_limit": 500,
            "request_timeout_secs": 5,
            "jobs": [{"symbol": "ETHUSDT", "timeframe": "4h", "lookback_days": 30}]
        }"#;
        let settings: FetcherSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.jobs[0], SeriesJob::new("ETHUSDT", "4h", 30));
        assert_eq!(settings.request_limit, 500);
    }
}

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::media::MediaProviderId;

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: Option<AuthConfig>,
    pub media: MediaConfig,
    pub cookies: CookieConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

/// Signing material and lifetimes for the two token classes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub access_token_secret: String,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    pub refresh_token_secret: String,
    #[serde(default = "default_refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    pub provider: MediaProviderId,
    /// Where multipart uploads are written before being handed to the store.
    pub staging_dir: PathBuf,
    /// Root served under `public_base_url` when the local provider is active.
    pub public_dir: PathBuf,
    pub public_base_url: String,
    pub remote_endpoint: Option<String>,
    pub remote_api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            provider: MediaProviderId::Local,
            staging_dir: PathBuf::from(defaults::DEFAULT_MEDIA_STAGING_DIR),
            public_dir: PathBuf::from(defaults::DEFAULT_MEDIA_PUBLIC_DIR),
            public_base_url: defaults::DEFAULT_MEDIA_PUBLIC_BASE_URL.to_string(),
            remote_endpoint: None,
            remote_api_key: None,
            request_timeout_secs: defaults::DEFAULT_MEDIA_REQUEST_TIMEOUT_SECS as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CookieConfig {
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: defaults::DEFAULT_COOKIE_SECURE,
        }
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}

fn default_access_token_ttl_secs() -> u64 {
    defaults::DEFAULT_ACCESS_TOKEN_TTL_SECS as u64
}

fn default_refresh_token_ttl_secs() -> u64 {
    defaults::DEFAULT_REFRESH_TOKEN_TTL_SECS as u64
}

//! Process configuration
//!
//! Loaded once at start-up from an optional JSON file, then overridden by
//! command-line flags. The extraction core only ever sees the resulting
//! backend instance.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration
///
/// # Example
///
/// ```
/// use dicometa_core::config::{AppConfig, BackendSettings};
///
/// let config: AppConfig = serde_json::from_str(r#"{
///     "backend": { "type": "filesystem", "root": "/data/dicom" },
///     "server": { "bind": "127.0.0.1:9000" }
/// }"#).unwrap();
///
/// assert!(matches!(config.backend, BackendSettings::Filesystem(_)));
/// assert_eq!(config.server.bind, "127.0.0.1:9000");
/// assert!(config.server.allowed_origins.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendSettings,
    pub server: ServerSettings,
    pub auth: AuthSettings,
}

impl AppConfig {
    /// Reads the configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    /// Reads `path` when given, otherwise returns the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Which storage backend serves objects
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendSettings {
    S3(S3Settings),
    Filesystem(FilesystemSettings),
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings::S3(S3Settings::default())
    }
}

/// Connection settings for S3 or an S3-compatible store
///
/// Also accepts the upper-case key names of a legacy `secrets.json`
/// (`REGION`, `AWS_ACCESS_KEY_ID`, ...).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    #[serde(alias = "REGION")]
    pub region: Option<String>,

    /// Custom endpoint, e.g. a MinIO server
    #[serde(alias = "ENDPOINT")]
    pub endpoint: Option<String>,

    #[serde(alias = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    #[serde(alias = "AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: Option<String>,

    #[serde(alias = "AWS_SESSION_TOKEN")]
    pub session_token: Option<String>,

    /// Path-style addressing, required by most self-hosted stores
    pub force_path_style: bool,

    /// Legacy `secrets.json` filling in whatever is not set here
    pub secrets_file: Option<PathBuf>,
}

impl S3Settings {
    /// Reads settings from a secrets file
    pub fn from_secrets_file(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    /// Merges in the secrets file, if one is configured
    ///
    /// Values already set take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the secrets file cannot be read or parsed.
    pub fn resolve(&self) -> Result<Self, ConfigError> {
        let Some(path) = &self.secrets_file else {
            return Ok(self.clone());
        };
        let secrets = Self::from_secrets_file(path)?;
        Ok(Self {
            region: self.region.clone().or(secrets.region),
            endpoint: self.endpoint.clone().or(secrets.endpoint),
            access_key_id: self.access_key_id.clone().or(secrets.access_key_id),
            secret_access_key: self.secret_access_key.clone().or(secrets.secret_access_key),
            session_token: self.session_token.clone().or(secrets.session_token),
            force_path_style: self.force_path_style || secrets.force_path_style,
            secrets_file: None,
        })
    }

    /// Whether static credentials are configured
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

/// Settings for serving objects from a local directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilesystemSettings {
    pub root: PathBuf,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,

    /// Origins allowed by CORS; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Mock login flow settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Public base URL of this service, used to build the login URL
    pub public_base_url: String,

    /// Frontend route the mock identity provider redirects back to
    pub frontend_callback_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080".to_string(),
            frontend_callback_url: "http://localhost:3000/callback".to_string(),
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

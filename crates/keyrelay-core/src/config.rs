//! Runtime configuration: Telegram bot credentials, Google service-account
//! credentials, and relay tuning.
//!
//! The file is YAML by default (`config/config.yml`, or `/app/config/config.yml`
//! when `ENVIRONMENT=production`). Files ending in `.json` are parsed as JSON.
//! `TELEGRAM_BOT_TOKEN` and `TELEGRAM_BOT_ADMIN_ID` override the Telegram
//! section after the file is read.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::ConfigError;

pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";
pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const ADMIN_ID_VAR: &str = "TELEGRAM_BOT_ADMIN_ID";

const PRODUCTION_PATH: &str = "/app/config/config.yml";
const DEVELOPMENT_PATH: &str = "config/config.yml";

/// Directories searched by [`Config::find_json`], in order.
pub const JSON_SEARCH_DIRS: &[&str] = &["../config/", "../../config/", "config/", "app/"];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_UPDATE_BUFFER: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub google: GoogleCredentials,
    pub telegram: TelegramCredentials,
    #[serde(default)]
    pub relay: RelaySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramCredentials {
    #[serde(default)]
    pub token: String,
    #[serde(rename = "adminId", default, deserialize_with = "admin_id_from_any")]
    pub admin_id: i64,
}

/// Service-account key fields as found in a Google credentials JSON, plus the
/// target spreadsheet.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoogleCredentials {
    #[serde(rename = "type")]
    pub kind: String,
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_x509_cert_url: String,
    pub universe_domain: String,
    pub spreadsheet_id: String,
}

// Keeps the private key out of logs.
impl fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("kind", &self.kind)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

impl GoogleCredentials {
    /// Token endpoint, falling back to Google's default when the file leaves it blank.
    pub fn token_uri(&self) -> &str {
        if self.token_uri.is_empty() {
            DEFAULT_TOKEN_URI
        } else {
            &self.token_uri
        }
    }
}

/// How the row cursor reacts to a failed append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorPolicy {
    /// The cursor advances before the append and stays advanced on failure.
    #[default]
    Optimistic,
    /// A failed append hands its row back if no later row was reserved.
    Confirmed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    pub cursor_policy: CursorPolicy,
    /// Capacity of the queue between the update poller and the relay loop.
    pub update_buffer: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            cursor_policy: CursorPolicy::default(),
            update_buffer: DEFAULT_UPDATE_BUFFER,
        }
    }
}

impl Config {
    /// Load configuration the way the deployed binary does.
    ///
    /// `explicit` wins if given; otherwise the path is chosen from the
    /// `ENVIRONMENT` variable. Environment overrides are applied and the
    /// result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let env = std::env::var(ENVIRONMENT_VAR).ok();
                info!(environment = env.as_deref().unwrap_or(""), "resolving config path");
                Self::default_path(env.as_deref())
            }
        };
        Self::from_path(&path)?.finish_from_env()
    }

    /// Load `<name>.json` from the first of [`JSON_SEARCH_DIRS`] that has it.
    pub fn load_named_json(name: &str) -> Result<Self, ConfigError> {
        let dirs: Vec<PathBuf> = JSON_SEARCH_DIRS.iter().map(PathBuf::from).collect();
        let path = Self::find_json(name, &dirs)?;
        Self::from_path(&path)?.finish_from_env()
    }

    /// Config file location for a deployment environment.
    pub fn default_path(environment: Option<&str>) -> PathBuf {
        match environment {
            Some("production") => PathBuf::from(PRODUCTION_PATH),
            _ => PathBuf::from(DEVELOPMENT_PATH),
        }
    }

    /// Find `<name>.json` in the given directories.
    pub fn find_json(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, ConfigError> {
        dirs.iter()
            .map(|d| d.join(format!("{name}.json")))
            .find(|p| p.is_file())
            .ok_or_else(|| ConfigError::NotFoundInSearchPaths {
                name: name.to_string(),
            })
    }

    /// Read and parse a config file. No overrides or validation.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&data)?,
            _ => Self::from_yaml_str(&data)?,
        };
        info!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_yaml_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Apply Telegram overrides. Empty values are ignored.
    pub fn with_overrides(
        mut self,
        token: Option<String>,
        admin_id: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            info!("telegram token overridden from environment");
            self.telegram.token = token;
        }
        if let Some(raw) = admin_id.filter(|a| !a.is_empty()) {
            let parsed = raw
                .trim()
                .parse::<i64>()
                .map_err(|source| ConfigError::InvalidAdminId {
                    value: raw.clone(),
                    source,
                })?;
            info!(admin_id = parsed, "telegram admin id overridden from environment");
            self.telegram.admin_id = parsed;
        }
        Ok(self)
    }

    /// Check the fields both remote clients need to start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.is_empty() {
            return Err(ConfigError::Missing("telegram.token"));
        }
        if self.google.spreadsheet_id.is_empty() {
            return Err(ConfigError::Missing("google.spreadsheet_id"));
        }
        if self.google.client_email.is_empty() {
            return Err(ConfigError::Missing("google.client_email"));
        }
        if self.google.private_key.is_empty() {
            return Err(ConfigError::Missing("google.private_key"));
        }
        Ok(())
    }

    fn finish_from_env(self) -> Result<Self, ConfigError> {
        let config = self.with_overrides(
            std::env::var(TOKEN_VAR).ok(),
            std::env::var(ADMIN_ID_VAR).ok(),
        )?;
        config.validate()?;
        Ok(config)
    }
}

/// Accepts `adminId` as either a number or a numeric string.
fn admin_id_from_any<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

//! Run configuration
//!
//! Settings are loaded once at process start from a JSON config file, then
//! selected fields are overridden from the environment. The resulting
//! structs are immutable for the rest of the run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete run configuration loaded from `config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// WMS API settings
    #[serde(default)]
    pub wms: WmsConfig,

    /// Google Drive publish settings
    #[serde(default)]
    pub drive: DriveConfig,

    /// Relational database settings (SQL script path)
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("BASE_URL") {
            self.wms.base_url = base_url;
        }
        if let Ok(username) = std::env::var("WMS_USERNAME") {
            self.wms.username = username;
        }
        if let Ok(password) = std::env::var("WMS_PASSWORD") {
            self.wms.password = password;
        }
        if let Ok(verify) = std::env::var("WMS_VERIFY_SSL") {
            self.wms.verify_ssl = verify.to_lowercase() != "false";
        }
        self.wms.base_url = self.wms.base_url.trim_end_matches('/').to_string();

        if let Ok(host) = std::env::var("PGHOST") {
            self.database.host = host;
        }
        if let Ok(port) = std::env::var("PGPORT") {
            if let Ok(port) = port.parse() {
                self.database.port = port;
            }
        }
        if let Ok(user) = std::env::var("PGUSER") {
            self.database.user = user;
        }
        if let Ok(password) = std::env::var("PGPASSWORD") {
            self.database.password = password;
        }
        if let Ok(database) = std::env::var("PGDATABASE") {
            self.database.database = database;
        }
    }

    /// Validate the fields required for the extraction path
    pub fn validate_wms(&self) -> Result<()> {
        if self.wms.base_url.is_empty() {
            return Err(Error::missing_field("wms.base_url"));
        }
        url::Url::parse(&self.wms.base_url)?;
        if self.wms.username.is_empty() {
            return Err(Error::missing_field("wms.username"));
        }
        Ok(())
    }
}

/// WMS client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WmsConfig {
    /// Base API address, e.g. `https://wms.example.com`
    #[serde(default)]
    pub base_url: String,

    /// Basic auth username
    #[serde(default)]
    pub username: String,

    /// Basic auth password
    #[serde(default)]
    pub password: String,

    /// Verify TLS certificates
    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    /// Maximum simultaneous in-flight page requests
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,

    /// Number of retries per page after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Initial backoff delay in seconds; doubles per retry
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            verify_ssl: default_true(),
            concurrency: default_concurrency(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            backoff_base: default_backoff_base(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    10
}

fn default_timeout() -> f64 {
    30.0
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    0.5
}

/// Google Drive publish settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Target folder id
    #[serde(default)]
    pub folder_id: String,

    /// Shared drive id, when the folder lives on a shared drive
    #[serde(default)]
    pub shared_drive_id: Option<String>,

    /// Path to the client secret file (service account key or OAuth client)
    #[serde(default)]
    pub client_secret_file: String,

    /// Path to the stored OAuth token file
    #[serde(default = "default_token_file")]
    pub token_file: String,

    /// OAuth scopes to request
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            folder_id: String::new(),
            shared_drive_id: None,
            client_secret_file: String::new(),
            token_file: default_token_file(),
            scopes: default_scopes(),
        }
    }
}

fn default_token_file() -> String {
    "token.json".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/drive".to_string()]
}

/// Postgres connection settings for the SQL script path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_database")]
    pub database: String,

    /// SQL scripts to run: each entry maps a script file to an output CSV name
    #[serde(default)]
    pub scripts: Vec<SqlScript>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            database: default_database(),
            scripts: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

/// One SQL script to execute and publish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlScript {
    /// Path to the `;`-delimited SQL file
    pub sql_file: String,

    /// Name of the CSV artifact produced from the final statement
    pub output_csv: String,
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8466
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret for signing access tokens. The service refuses to start
    /// without one.
    pub access_token_secret: Option<String>,
    /// Secret for signing refresh tokens. Falls back to the access secret
    /// when unset.
    pub refresh_token_secret: Option<String>,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: None,
            refresh_token_secret: None,
            access_ttl_minutes: default_access_ttl_minutes(),
            refresh_ttl_days: default_refresh_ttl_days(),
        }
    }
}

fn default_access_ttl_minutes() -> i64 {
    30
}

fn default_refresh_ttl_days() -> i64 {
    7
}

/// Bootstrap super admin created at startup when the store is empty
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub enabled: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: None,
            email: None,
            password: None,
            phone: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse configuration file")?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            seed: SeedConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Environment variables take precedence over file values
    fn apply_env(&mut self) {
        if let Some(secret) = env_string("GATEKEEPR_ACCESS_SECRET") {
            self.auth.access_token_secret = Some(secret);
        }
        if let Some(secret) = env_string("GATEKEEPR_REFRESH_SECRET") {
            self.auth.refresh_token_secret = Some(secret);
        }
        if let Some(enabled) = env_string("GATEKEEPR_SEED_ENABLED") {
            self.seed.enabled = matches!(enabled.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(name) = env_string("GATEKEEPR_SEED_NAME") {
            self.seed.name = Some(name);
        }
        if let Some(email) = env_string("GATEKEEPR_SEED_EMAIL") {
            self.seed.email = Some(email);
        }
        if let Some(password) = env_string("GATEKEEPR_SEED_PASSWORD") {
            self.seed.password = Some(password);
        }
        if let Some(phone) = env_string("GATEKEEPR_SEED_PHONE") {
            self.seed.phone = Some(phone);
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

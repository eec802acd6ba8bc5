//! Configuration management for rds
//!
//! The config file is optional. Every field has a built-in default so the
//! tool works with nothing but an AWS profile.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Profile name used when neither `--profile` nor `AWS_PROFILE` is set
pub const DEFAULT_PROFILE: &str = "default";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Region that owns master secrets. Falls back to the profile's region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_region: Option<String>,

    /// Engine family kept from the instance inventory
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Database name passed to the client
    #[serde(default = "default_database")]
    pub database: String,

    /// Secret name is `<secret_prefix>/<target>/<secret_suffix>`
    #[serde(default = "default_secret_prefix")]
    pub secret_prefix: String,

    #[serde(default = "default_secret_suffix")]
    pub secret_suffix: String,

    /// Interactive clients, in order of preference
    #[serde(default = "default_clients")]
    pub clients: Vec<String>,

    /// Cache root override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// AWS profile -> VPN connection name that must be up
    #[serde(default)]
    pub vpn_profiles: HashMap<String, String>,
}

fn default_engine() -> String {
    "postgres".to_string()
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_secret_prefix() -> String {
    "root".to_string()
}

fn default_secret_suffix() -> String {
    "psql".to_string()
}

fn default_clients() -> Vec<String> {
    vec!["pgcli".to_string(), "psql".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_region: None,
            engine: default_engine(),
            database: default_database(),
            secret_prefix: default_secret_prefix(),
            secret_suffix: default_secret_suffix(),
            clients: default_clients(),
            cache_dir: None,
            vpn_profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Get the default config file path (~/.rds/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".rds").join("config.yaml"))
    }

    /// Load configuration from an explicit path, or the default location.
    ///
    /// A missing default file means "use defaults"; a missing explicit file
    /// is an error.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(Path::new(p)),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.engine.trim().is_empty() {
            return Err(ConfigError::Invalid("engine must not be empty".to_string()).into());
        }
        if self.secret_prefix.contains('/') || self.secret_suffix.contains('/') {
            return Err(ConfigError::Invalid(
                "secret_prefix and secret_suffix must not contain '/'".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Name of the VPN connection required for a profile, if one is mapped
    pub fn required_vpn(&self, profile: &str) -> Option<&str> {
        self.vpn_profiles.get(profile).map(String::as_str)
    }
}

/// Resolved AWS identity scope for one invocation.
///
/// Built once from flags, environment and config, then passed by reference
/// to every operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsScope {
    /// Named profile, `None` for the SDK default chain
    pub profile: Option<String>,
    /// Region instances are discovered in
    pub region: String,
    /// Region that owns master secrets
    pub home_region: String,
}

impl AwsScope {
    /// Profile name used for cache keys and VPN lookup
    pub fn profile_name(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }
}

//! Global CLI options shared across all commands

use std::path::PathBuf;

use crate::cache::CacheStore;
use crate::cli::Cli;
use crate::config::{Config, DEFAULT_PROFILE};
use crate::error::Result;

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in by the
/// accessors that take a `Config`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// AWS profile override (falls back to the SDK default chain)
    pub profile: Option<String>,

    /// Operating region override
    pub region: Option<String>,

    /// Custom config file path (defaults to ~/.rds/config.yaml)
    pub config: Option<String>,

    /// Custom cache directory
    pub cache_dir: Option<PathBuf>,

    /// Ignore cached instance lists
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            profile: cli.profile.clone(),
            region: cli.region.clone(),
            config: cli.config.clone(),
            cache_dir: cli.cache_dir.clone(),
            no_cache: cli.no_cache,
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Profile name for cache keys and VPN lookup
    pub fn profile_name(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    /// Cache store at the flag/env directory, else the config file's, else
    /// the default
    pub fn cache_store(&self, config: &Config) -> Result<CacheStore> {
        match self.cache_dir.as_ref().or(config.cache_dir.as_ref()) {
            Some(dir) => Ok(CacheStore::open_at(dir)),
            None => Ok(CacheStore::open()?),
        }
    }
}

//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

use completions::{instance_candidates, profile_candidates};

pub mod args;
pub mod cache;
pub mod completions;
pub mod docs;
pub mod version;

pub use args::GlobalOptions;

/// rds - connect to RDS PostgreSQL instances without copying passwords around
#[derive(Parser, Debug)]
#[command(name = "rds")]
#[command(version = version::short_version(), about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// AWS profile to use
    #[arg(
        long,
        short = 'p',
        global = true,
        env = "AWS_PROFILE",
        hide_env = true,
        add = profile_candidates()
    )]
    pub profile: Option<String>,

    /// AWS region to discover instances in (defaults to the profile's region)
    #[arg(long, short = 'r', global = true)]
    pub region: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "RDS_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override cache directory (default ~/.cache/rds)
    #[arg(long, global = true, env = "RDS_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<PathBuf>,

    /// Ignore the cached instance list and fetch a fresh one
    #[arg(long, global = true, env = "RDS_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "RDS_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick an instance, fetch its credentials and open a SQL session
    #[command(
        visible_alias = "c",
        after_help = "EXAMPLES:\n  \
            rds connect                      # Fuzzy-pick from all instances\n  \
            rds connect orders               # Exact id, or the only id containing 'orders'\n  \
            rds connect --last               # Reconnect to the last instance used\n  \
            rds -p prod -r us-east-1 connect # DR region; master secret read from home region"
    )]
    Connect {
        /// Instance identifier or a fragment of one
        #[arg(add = instance_candidates())]
        name: Option<String>,

        /// Reconnect to the instance used last time with this profile and region
        #[arg(long, short = 'l')]
        last: bool,
    },

    /// Manage the local instance cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Display version information
    Version,

    /// Generate shell completions (static)
    #[command(after_help = "\
Static completions (subcommands/flags only):
  bash:   rds completion bash > /etc/bash_completion.d/rds
  zsh:    rds completion zsh > \"${fpath[1]}/_rds\"
  fish:   rds completion fish > ~/.config/fish/completions/rds.fish

Dynamic completions (includes AWS profiles and cached instance names):
  bash:   echo 'source <(COMPLETE=bash rds)' >> ~/.bashrc
  zsh:    echo 'source <(COMPLETE=zsh rds)' >> ~/.zshrc
  fish:   echo 'COMPLETE=fish rds | source' >> ~/.config/fish/config.fish

Instance names come from the local cache only; run `rds connect` once per
profile and region to populate it.")]
    Completion {
        /// Shell to generate completions for (static only)
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate Markdown reference docs for every command
    #[command(hide = true)]
    GenDocs {
        /// Directory to write the pages to
        #[arg(long, short = 'd', default_value = docs::DEFAULT_DIR)]
        dir: PathBuf,
    },
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cached instance lists and last-used markers
    Status,

    /// Delete cached data
    Clear {
        /// Only clear the current profile's files
        #[arg(long)]
        profile_only: bool,
    },

    /// Print the cache directory
    Path,
}

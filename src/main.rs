//! rds - resolve, authenticate and connect to RDS PostgreSQL instances

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;

mod cache;
mod cli;
mod client;
mod config;
mod connect;
mod error;

use cli::{CacheCommands, Cli, Commands, GlobalOptions};
use config::Config;
use connect::ConnectOptions;
use connect::select::Selection;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Answers COMPLETE=<shell> requests and exits; a no-op otherwise
    CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Warnings by default, debug for this crate with `--debug`.
/// `RUST_LOG` wins when set.
fn init_logging(debug: bool) {
    let default = if debug { "warn,rds=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Connect { name, last } => {
            let config = Config::load_at(opts.config_ref())?;
            let store = opts.cache_store(&config)?;
            let connect_opts = ConnectOptions {
                selection: Selection::from_args(name, last),
                profile: opts.profile.clone(),
                region: opts.region.clone(),
                use_cache: !opts.no_cache,
            };
            connect::run(&connect_opts, &config, store).await
        }
        Commands::Cache(cache_cmd) => {
            let config = Config::load_at(opts.config_ref())?;
            let store = opts.cache_store(&config)?;
            match cache_cmd {
                CacheCommands::Status => cli::cache::status(&store),
                CacheCommands::Clear { profile_only } => {
                    let profile = profile_only.then(|| opts.profile_name());
                    cli::cache::clear(&store, profile)
                }
                CacheCommands::Path => cli::cache::path(&store),
            }
        }
        Commands::Version => {
            cli::version::run();
            Ok(())
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rds", &mut std::io::stdout());
            Ok(())
        }
        Commands::GenDocs { dir } => {
            println!("📄 Generating reference docs in: {}", dir.display());
            let files = cli::docs::generate(Cli::command(), &dir)?;
            println!("✅ Wrote {} pages", files.len());
            Ok(())
        }
    }
}

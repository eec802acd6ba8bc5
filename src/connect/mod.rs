//! The `connect` command: discover, select, authenticate, hand off
//!
//! Resolution runs against the collaborator traits so the whole pipeline up
//! to the launch can be exercised with in-memory doubles.

pub mod credentials;
pub mod handoff;
pub mod native;
pub mod select;
pub mod terminal;
pub mod vpn;

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::{CacheStore, CachedInventory, ProfileKey};
use crate::client::{
    AwsClient, Credentials, InstanceDiscovery, InstanceRecord, SecretStore, aws,
};
use crate::config::{AwsScope, Config};
use crate::error::Result;

use credentials::SecretScope;
use select::{FuzzyPicker, Picker, Selection};

/// Everything `connect` needs from the command line
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub selection: Selection,
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Serve the inventory from cache when fresh
    pub use_cache: bool,
}

/// A selected instance with credentials in hand
#[derive(Debug)]
pub struct Target {
    pub instance: InstanceRecord,
    pub secret: SecretScope,
    pub credentials: Credentials,
}

/// Run `connect` end to end against AWS
pub async fn run(opts: &ConnectOptions, config: &Config, store: CacheStore) -> Result<()> {
    let profile = opts
        .profile
        .as_deref()
        .unwrap_or(crate::config::DEFAULT_PROFILE);
    vpn::warn_if_disconnected(profile, config.required_vpn(profile)).await;

    let (scope, sdk) = aws::resolve_scope(
        opts.profile.as_deref(),
        opts.region.as_deref(),
        config.home_region.as_deref(),
    )
    .await?;
    let cloud = Arc::new(AwsClient::new(sdk));

    let target = resolve_target(
        cloud,
        &scope,
        config,
        store,
        &opts.selection,
        opts.use_cache,
        &FuzzyPicker,
    )
    .await?;

    launch(&target, config).await
}

/// Select an instance and fetch its credentials.
///
/// The selection is remembered as last used only once credentials are in
/// hand, right before the caller launches a client.
pub async fn resolve_target<C>(
    cloud: Arc<C>,
    scope: &AwsScope,
    config: &Config,
    store: CacheStore,
    selection: &Selection,
    use_cache: bool,
    picker: &dyn Picker,
) -> Result<Target>
where
    C: InstanceDiscovery + SecretStore,
{
    let key = ProfileKey::from(scope);
    let inventory = CachedInventory::new(cloud.clone(), store.clone(), &config.engine, use_cache);
    let instances = load_instances(&inventory, &key).await?;

    let instance = select::resolve(&instances, selection, &store, &key, picker)?;
    log::debug!("Selected {}", instance.id);

    let secret = credentials::secret_scope(&instance, scope, config);
    if secret.redirected {
        println!(
            "🌐 DR Replica detected. Fetching master secret '{}' from primary region: {}",
            secret.target.cyan(),
            secret.region.cyan()
        );
    }
    let credentials = credentials::fetch_credentials(cloud.as_ref(), &secret).await?;

    if let Err(e) = store.save_last_selection(&key, &instance.id) {
        log::warn!("Could not remember last instance: {}", e);
    }

    Ok(Target {
        instance,
        secret,
        credentials,
    })
}

async fn load_instances<D: InstanceDiscovery>(
    inventory: &CachedInventory<D>,
    key: &ProfileKey,
) -> Result<Vec<InstanceRecord>> {
    if let Some(cached) = inventory.cached(key) {
        return Ok(cached);
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!(
        "Fetching RDS instances [{}:{}]...",
        key.profile, key.region
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = inventory.refresh(key).await;
    spinner.finish_and_clear();
    result
}

/// Hand the terminal to the first installed client, or the built-in prompt
async fn launch(target: &Target, config: &Config) -> Result<()> {
    let instance = &target.instance;
    println!(
        "\n🚀 Target: {} [{}]",
        instance.id.bold(),
        instance.host.dimmed()
    );

    let Some(bin) = handoff::find_client(&config.clients) else {
        println!(
            "{}",
            "⚠️  No binary clients found. Launching Native Fallback...".yellow()
        );
        let client = native::connect(instance, &target.credentials, &config.database).await?;
        println!("✅ Connected to {} (Native Mode)", instance.host);
        return native::run_repl(&client, &config.database).await;
    };

    let name = bin
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("✨ Launching {}...", name);

    let command = handoff::client_command(&bin, instance, &target.credentials, &config.database);
    let terminal = terminal::for_stdin();
    let status = handoff::launch(command, terminal.as_ref())?;
    if !status.success() {
        log::warn!("{} exited with {}", name, status);
    }

    Ok(())
}

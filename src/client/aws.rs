//! AWS SDK implementations of the cloud collaborators

use async_trait::async_trait;
use aws_config::meta::region::ProvideRegion;
use aws_config::profile::ProfileFileRegionProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_runtime::env_config::file::EnvConfigFiles;
use aws_sdk_rds::types::DbInstance;

use super::{DiscoveredInstance, InstanceDiscovery, InstanceRecord, SecretStore};
use crate::config::AwsScope;
use crate::error::{Error, Result};

/// AWS-backed discovery and secret store, bound to one operating region
pub struct AwsClient {
    sdk: SdkConfig,
}

impl AwsClient {
    pub fn new(sdk: SdkConfig) -> Self {
        Self { sdk }
    }
}

async fn load_sdk_config(profile: Option<&str>, region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

/// Region written in the profile itself. `AWS_REGION` and
/// `AWS_DEFAULT_REGION` are not consulted.
async fn profile_file_region(
    profile: Option<&str>,
    files: Option<EnvConfigFiles>,
) -> Option<String> {
    let mut builder = ProfileFileRegionProvider::builder();
    if let Some(profile) = profile {
        builder = builder.profile_name(profile);
    }
    if let Some(files) = files {
        builder = builder.profile_files(files);
    }
    let provider = builder.build();
    ProvideRegion::region(&provider)
        .await
        .map(|r| r.as_ref().to_string())
}

fn pick_home_region(
    home_override: Option<&str>,
    profile_region: Option<String>,
    operating: &str,
) -> String {
    home_override
        .map(str::to_string)
        .or(profile_region)
        .unwrap_or_else(|| {
            log::debug!("Profile has no region, using {} as home region", operating);
            operating.to_string()
        })
}

/// Load SDK config for a profile and resolve the operating and home regions.
///
/// The home region comes from the profile file alone, never from `--region`
/// or the environment, so that DR replicas can be pointed back at the region
/// that owns their master secret. `home_override` (from the config file)
/// wins when set.
pub async fn resolve_scope(
    profile: Option<&str>,
    region: Option<&str>,
    home_override: Option<&str>,
) -> Result<(AwsScope, SdkConfig)> {
    let base = load_sdk_config(profile, None).await;

    let (sdk, operating) = match region {
        Some(r) => (load_sdk_config(profile, Some(r)).await, r.to_string()),
        None => {
            let r = base.region().map(|r| r.as_ref().to_string()).ok_or_else(|| {
                Error::ConfigLoadFailed(format!(
                    "no region configured for profile '{}'; pass --region or set one in the profile",
                    profile.unwrap_or(crate::config::DEFAULT_PROFILE)
                ))
            })?;
            (base, r)
        }
    };

    let profile_region = profile_file_region(profile, None).await;
    let home_region = pick_home_region(home_override, profile_region, &operating);

    log::debug!(
        "AWS scope: profile={:?} region={} home_region={}",
        profile,
        operating,
        home_region
    );

    Ok((
        AwsScope {
            profile: profile.map(str::to_string),
            region: operating,
            home_region,
        },
        sdk,
    ))
}

/// Map an SDK instance to our model; instances without an endpoint are skipped.
fn to_discovered(db: &DbInstance) -> Option<DiscoveredInstance> {
    let id = db.db_instance_identifier()?;
    let endpoint = db.endpoint()?;
    let host = endpoint.address()?;
    let port = endpoint.port().and_then(|p| u16::try_from(p).ok())?;

    Some(DiscoveredInstance {
        engine: db.engine().unwrap_or_default().to_string(),
        record: InstanceRecord {
            id: id.to_string(),
            host: host.to_string(),
            size: db.db_instance_class().unwrap_or_default().to_string(),
            port,
            version: db.engine_version().unwrap_or_default().to_string(),
            source_id: db
                .read_replica_source_db_instance_identifier()
                .unwrap_or_default()
                .to_string(),
        },
    })
}

#[async_trait]
impl InstanceDiscovery for AwsClient {
    async fn list_instances(&self) -> Result<Vec<DiscoveredInstance>> {
        let client = aws_sdk_rds::Client::new(&self.sdk);
        let mut stream = client.describe_db_instances().into_paginator().items().send();

        let mut instances = Vec::new();
        while let Some(item) = stream.next().await {
            let db = item.map_err(|e| {
                Error::Discovery(aws_sdk_rds::error::DisplayErrorContext(&e).to_string())
            })?;
            match to_discovered(&db) {
                Some(instance) => instances.push(instance),
                None => log::debug!(
                    "Skipping instance without endpoint: {}",
                    db.db_instance_identifier().unwrap_or("?")
                ),
            }
        }

        log::debug!("Discovered {} instances", instances.len());
        Ok(instances)
    }
}

#[async_trait]
impl SecretStore for AwsClient {
    async fn get_secret(&self, name: &str, region: &str) -> Result<String> {
        let conf = aws_sdk_secretsmanager::config::Builder::from(&self.sdk)
            .region(Region::new(region.to_string()))
            .build();
        let client = aws_sdk_secretsmanager::Client::from_conf(conf);

        let fetch_failed = |reason: String| Error::CredentialFetchFailed {
            secret: name.to_string(),
            region: region.to_string(),
            reason,
        };

        let out = client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                fetch_failed(aws_sdk_secretsmanager::error::DisplayErrorContext(&e).to_string())
            })?;

        out.secret_string()
            .map(str::to_string)
            .ok_or_else(|| fetch_failed("secret has no string value".to_string()))
    }
}

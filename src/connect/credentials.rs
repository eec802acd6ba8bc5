//! Credential lookup for a selected instance
//!
//! Replicas do not own a secret: the master does. A cross-region DR replica
//! names its master by ARN, and the master's secret lives in the home region.

use crate::client::{Credentials, InstanceRecord, SecretStore};
use crate::config::{AwsScope, Config};
use crate::error::{Error, Result};

/// Prefix marking a replication source as an RDS ARN
pub const RDS_ARN_PREFIX: &str = "arn:aws:rds:";

/// `arn:aws:rds:<region>:<account>:db:<identifier>`
const ARN_IDENTIFIER_FIELD: usize = 6;

/// Where to read credentials for an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretScope {
    /// Instance whose secret is read
    pub target: String,
    /// Full secret name
    pub name: String,
    pub region: String,
    /// True when the target is not the selected instance itself
    pub redirected: bool,
}

/// Identifier of the instance that owns the selected instance's secret.
///
/// A short or malformed ARN is ignored and the instance's own id is used.
pub fn secret_target(instance: &InstanceRecord) -> &str {
    let Some(source) = instance.replication_source() else {
        return &instance.id;
    };

    if source.starts_with(RDS_ARN_PREFIX) {
        source
            .split(':')
            .nth(ARN_IDENTIFIER_FIELD)
            .filter(|id| !id.is_empty())
            .unwrap_or(instance.id.as_str())
    } else {
        source
    }
}

/// Secret name for a target, e.g. `root/orders/psql`
pub fn secret_name(config: &Config, target: &str) -> String {
    format!("{}/{}/{}", config.secret_prefix, target, config.secret_suffix)
}

/// Resolve the secret name and region for an instance.
///
/// When the secret belongs to another instance the lookup goes to the home
/// region; otherwise it stays in the region the instance was found in.
pub fn secret_scope(instance: &InstanceRecord, scope: &AwsScope, config: &Config) -> SecretScope {
    let target = secret_target(instance);
    let redirected = target != instance.id;
    let region = if redirected {
        &scope.home_region
    } else {
        &scope.region
    };

    SecretScope {
        target: target.to_string(),
        name: secret_name(config, target),
        region: region.clone(),
        redirected,
    }
}

/// Read and decode credentials. Never retried.
pub async fn fetch_credentials<S: SecretStore + ?Sized>(
    store: &S,
    secret: &SecretScope,
) -> Result<Credentials> {
    log::debug!("Reading secret {} in {}", secret.name, secret.region);

    let payload = store
        .get_secret(&secret.name, &secret.region)
        .await
        .map_err(|e| match e {
            e @ Error::CredentialFetchFailed { .. } => e,
            other => Error::CredentialFetchFailed {
                secret: secret.name.clone(),
                region: secret.region.clone(),
                reason: other.to_string(),
            },
        })?;

    serde_json::from_str(&payload).map_err(|e| Error::CredentialFetchFailed {
        secret: secret.name.clone(),
        region: secret.region.clone(),
        reason: format!("malformed secret payload: {}", e),
    })
}

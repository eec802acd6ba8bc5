//! Cloud collaborators: instance discovery and the secret store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::Result;

pub mod aws;
#[cfg(test)]
pub mod mock;

pub use aws::AwsClient;
#[cfg(test)]
pub use mock::MockCloud;

/// Lists database instances for a profile and region
#[async_trait]
pub trait InstanceDiscovery: Send + Sync {
    /// Every instance visible to the caller, all engines
    async fn list_instances(&self) -> Result<Vec<DiscoveredInstance>>;
}

/// Reads secret strings, scoped to a region
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Raw secret string for `name` in `region`
    async fn get_secret(&self, name: &str, region: &str) -> Result<String>;
}

/// One instance as returned by discovery, before engine filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredInstance {
    /// Engine name (`postgres`, `mysql`, ...)
    pub engine: String,
    pub record: InstanceRecord,
}

/// Database instance metadata, as cached on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Instance identifier
    pub id: String,

    /// Endpoint address
    pub host: String,

    /// Instance class, e.g. `db.r6g.large`
    pub size: String,

    /// Endpoint port
    pub port: u16,

    /// Engine version
    pub version: String,

    /// Replication source: empty, a plain identifier, or an ARN
    #[serde(default)]
    pub source_id: String,
}

impl InstanceRecord {
    /// Replication source, if this instance is a read replica
    pub fn replication_source(&self) -> Option<&str> {
        if self.source_id.is_empty() {
            None
        } else {
            Some(&self.source_id)
        }
    }
}

/// Database credentials read from the secret store.
///
/// Never persisted and never logged.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

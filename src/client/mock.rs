//! Mock cloud collaborators for testing
//!
//! Provides an in-memory implementation of the discovery and secret store
//! traits for unit testing without AWS calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{DiscoveredInstance, InstanceDiscovery, InstanceRecord, SecretStore};
use crate::error::{Error, Result};

/// Mock cloud for testing.
///
/// Configure responses via builder methods, then hand it to the code under test.
///
/// # Example
/// ```ignore
/// let mock = MockCloud::new()
///     .with_instance("postgres", record("orders-db"))
///     .with_secret("root/orders-db/psql", "ap-south-1", r#"{"username":"u","password":"p"}"#);
/// ```
#[derive(Default)]
pub struct MockCloud {
    /// Instances returned from list_instances
    instances: Arc<Mutex<Vec<DiscoveredInstance>>>,
    /// Secret strings keyed by (name, region)
    secrets: Arc<Mutex<HashMap<(String, String), String>>>,
    /// Discovery error to return (if any) - consumed on first use
    discovery_error: Arc<Mutex<Option<String>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Secret lookups in call order, as (name, region)
    secret_requests: Arc<Mutex<Vec<(String, String)>>>,
}

/// Tracks collaborator call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_instances: usize,
    pub get_secret: usize,
}

/// Build a record with predictable endpoint fields
pub fn record(id: &str) -> InstanceRecord {
    InstanceRecord {
        id: id.to_string(),
        host: format!("{id}.cluster.ap-south-1.rds.amazonaws.com"),
        size: "db.t4g.medium".to_string(),
        port: 5432,
        version: "15.4".to_string(),
        source_id: String::new(),
    }
}

impl MockCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(self, engine: &str, record: InstanceRecord) -> Self {
        self.instances
            .try_lock()
            .expect("mock not shared yet")
            .push(DiscoveredInstance {
                engine: engine.to_string(),
                record,
            });
        self
    }

    pub fn with_secret(self, name: &str, region: &str, value: &str) -> Self {
        self.secrets
            .try_lock()
            .expect("mock not shared yet")
            .insert((name.to_string(), region.to_string()), value.to_string());
        self
    }

    pub fn with_discovery_error(self, message: &str) -> Self {
        *self.discovery_error.try_lock().expect("mock not shared yet") =
            Some(message.to_string());
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn secret_requests(&self) -> Vec<(String, String)> {
        self.secret_requests.lock().await.clone()
    }
}

#[async_trait]
impl InstanceDiscovery for MockCloud {
    async fn list_instances(&self) -> Result<Vec<DiscoveredInstance>> {
        self.call_count.lock().await.list_instances += 1;

        if let Some(message) = self.discovery_error.lock().await.take() {
            return Err(Error::Discovery(message));
        }
        Ok(self.instances.lock().await.clone())
    }
}

#[async_trait]
impl SecretStore for MockCloud {
    async fn get_secret(&self, name: &str, region: &str) -> Result<String> {
        self.call_count.lock().await.get_secret += 1;
        self.secret_requests
            .lock()
            .await
            .push((name.to_string(), region.to_string()));

        self.secrets
            .lock()
            .await
            .get(&(name.to_string(), region.to_string()))
            .cloned()
            .ok_or_else(|| Error::CredentialFetchFailed {
                secret: name.to_string(),
                region: region.to_string(),
                reason: "ResourceNotFoundException".to_string(),
            })
    }
}

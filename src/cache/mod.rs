//! Local cache for the instance inventory
//!
//! One JSON envelope per profile and region, plus a plain-text marker per
//! profile remembering the last instance connected to. Designed to make
//! repeat connects and shell completion fast without calling AWS.

pub mod inventory;
pub mod key;
pub mod storage;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client::InstanceRecord;

/// Envelope format tag. Bump when `InstanceRecord` or the envelope changes;
/// files with any other tag are ignored and refetched.
pub const CACHE_VERSION: &str = "v2";

/// Cache TTL configuration per data type
pub struct CacheTtl;

impl CacheTtl {
    /// Instance inventory freshness window
    pub const INSTANCES: Duration = Duration::from_secs(60 * 60); // 1 hr
}

/// On-disk format of a cached instance list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub version: String,
    pub instances: Vec<InstanceRecord>,
}

// Re-export main types
pub use inventory::CachedInventory;
pub use key::ProfileKey;
pub use storage::CacheStore;

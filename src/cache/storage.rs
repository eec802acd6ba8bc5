//! File-based cache storage
//!
//! The instance list lives in a versioned JSON envelope whose file
//! modification time is its age. The last-selection marker is raw text.
//! This is the only code that touches the cache directory.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::key::ProfileKey;
use super::{CACHE_VERSION, CacheEnvelope, CacheTtl};
use crate::client::InstanceRecord;
use crate::error::{CacheError, Error};

type Result<T> = std::result::Result<T, CacheError>;

/// Cache directory handle
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open cache storage at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(&Self::default_dir()?))
    }

    /// Default cache directory (~/.cache/rds)
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(CacheError::NoHome)?;
        Ok(home.join(".cache").join("rds"))
    }

    /// Open cache storage at a specific directory. Nothing is created until
    /// the first write.
    pub fn open_at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cached instance list, if present, of the current version and fresh
    pub fn load(&self, key: &ProfileKey) -> Option<Vec<InstanceRecord>> {
        self.load_fresh(key, CacheTtl::INSTANCES, SystemTime::now())
    }

    fn load_fresh(
        &self,
        key: &ProfileKey,
        ttl: Duration,
        now: SystemTime,
    ) -> Option<Vec<InstanceRecord>> {
        let path = self.root.join(key.instances_file());
        let envelope = read_envelope(&path)?;

        if envelope.version != CACHE_VERSION {
            log::debug!(
                "Cache version mismatch for {} ({} != {})",
                path.display(),
                envelope.version,
                CACHE_VERSION
            );
            return None;
        }

        let age = file_age(&path, now)?;
        if age >= ttl {
            log::debug!("Cache expired for {} (age {}s)", path.display(), age.as_secs());
            return None;
        }

        Some(envelope.instances)
    }

    /// Replace the cached instance list for a key
    pub fn save(&self, key: &ProfileKey, records: &[InstanceRecord]) -> Result<()> {
        let envelope = CacheEnvelope {
            version: CACHE_VERSION.to_string(),
            instances: records.to_vec(),
        };
        let data =
            serde_json::to_vec(&envelope).map_err(|e| CacheError::Serialize(e.to_string()))?;

        self.write_file(&key.instances_file(), &data)
    }

    /// Remember the instance last connected to in a profile and region
    pub fn save_last_selection(&self, key: &ProfileKey, id: &str) -> Result<()> {
        self.write_file(&key.last_selection_file(), id.as_bytes())
    }

    /// Instance id last connected to in a profile and region
    pub fn load_last_selection(&self, key: &ProfileKey) -> crate::error::Result<String> {
        let path = self.root.join(key.last_selection_file());
        let id = std::fs::read_to_string(&path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        id.ok_or_else(|| {
            Error::NotFound(format!(
                "no history found for profile '{}' in {}",
                key.profile, key.region
            ))
        })
    }

    /// Delete cache files. With a profile, only that profile's files go.
    pub fn clear(&self, profile: Option<&str>) -> Result<ClearStats> {
        let mut removed = 0;

        for name in self.file_names()? {
            let owner = ProfileKey::from_instances_file(&name)
                .or_else(|| ProfileKey::from_last_selection_file(&name))
                .map(|k| k.profile);

            let Some(owner) = owner else {
                continue;
            };
            if profile.is_some_and(|p| p != owner) {
                continue;
            }

            let path = self.root.join(&name);
            std::fs::remove_file(&path).map_err(|e| {
                CacheError::Io(format!("Failed to remove {}: {}", path.display(), e))
            })?;
            removed += 1;
        }

        Ok(ClearStats {
            entries_removed: removed,
        })
    }

    /// Describe every instance list and marker in the cache
    pub fn stats(&self) -> Result<CacheStats> {
        let now = SystemTime::now();
        let mut stats = CacheStats::default();

        for name in self.file_names()? {
            let path = self.root.join(&name);

            if let Some(key) = ProfileKey::from_instances_file(&name) {
                let envelope = read_envelope(&path);
                let current = envelope
                    .as_ref()
                    .is_some_and(|e| e.version == CACHE_VERSION);
                let age = file_age(&path, now).unwrap_or_default();

                stats.inventories.push(InventoryEntry {
                    key,
                    instance_count: envelope.map(|e| e.instances.len()),
                    age,
                    fresh: current && age < CacheTtl::INSTANCES,
                });
            } else if let Some(key) = ProfileKey::from_last_selection_file(&name) {
                if let Ok(id) = self.load_last_selection(&key) {
                    stats.last_selections.push((key, id));
                }
            }
        }

        stats.inventories.sort_by(|a, b| {
            (&a.key.profile, &a.key.region).cmp(&(&b.key.profile, &b.key.region))
        });
        stats.last_selections.sort_by(|(a, _), (b, _)| {
            (&a.profile, &a.region).cmp(&(&b.profile, &b.region))
        });
        Ok(stats)
    }

    fn file_names(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CacheError::Io(format!(
                    "Failed to read {}: {}",
                    self.root.display(),
                    e
                )));
            }
        };

        Ok(entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect())
    }

    /// Write via a temp file and rename so readers never see a partial file
    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let path = self.root.join(name);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", name, std::process::id()));

        std::fs::write(&tmp, data)
            .map_err(|e| CacheError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            CacheError::Io(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

fn read_envelope(path: &Path) -> Option<CacheEnvelope> {
    let data = std::fs::read(path).ok()?;
    match serde_json::from_slice(&data) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            log::debug!("Ignoring unreadable cache {}: {}", path.display(), e);
            None
        }
    }
}

/// Age from the file's modification time. A time in the future counts as new.
fn file_age(path: &Path, now: SystemTime) -> Option<Duration> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(now.duration_since(modified).unwrap_or_default())
}

/// Statistics about cache clear operation
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// One cached instance list
#[derive(Debug)]
pub struct InventoryEntry {
    pub key: ProfileKey,
    /// `None` when the file could not be parsed
    pub instance_count: Option<usize>,
    pub age: Duration,
    pub fresh: bool,
}

/// Statistics about cache state
#[derive(Debug, Default)]
pub struct CacheStats {
    pub inventories: Vec<InventoryEntry>,
    /// (profile and region, instance id)
    pub last_selections: Vec<(ProfileKey, String)>,
}

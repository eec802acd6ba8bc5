//! Cache keys and file naming

use crate::config::AwsScope;

const INSTANCES_SUFFIX: &str = "_instances.json";
const LAST_SELECTION_SUFFIX: &str = "_last_connected";

/// Identifies one cached inventory: a profile in a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileKey {
    pub profile: String,
    pub region: String,
}

impl ProfileKey {
    pub fn new(profile: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            region: region.into(),
        }
    }

    /// Instance list file, e.g. `dev_ap-south-1_instances.json`
    pub fn instances_file(&self) -> String {
        format!(
            "{}_{}{}",
            path_safe(&self.profile),
            path_safe(&self.region),
            INSTANCES_SUFFIX
        )
    }

    /// Last-selection marker, e.g. `dev_ap-south-1_last_connected`
    pub fn last_selection_file(&self) -> String {
        format!(
            "{}_{}{}",
            path_safe(&self.profile),
            path_safe(&self.region),
            LAST_SELECTION_SUFFIX
        )
    }

    /// Recover the key from an instance list file name
    pub fn from_instances_file(name: &str) -> Option<Self> {
        Self::from_file_name(name, INSTANCES_SUFFIX)
    }

    /// Recover the key from a last-selection marker file name
    pub fn from_last_selection_file(name: &str) -> Option<Self> {
        Self::from_file_name(name, LAST_SELECTION_SUFFIX)
    }

    fn from_file_name(name: &str, suffix: &str) -> Option<Self> {
        let stem = name.strip_suffix(suffix)?;
        // Regions never contain '_', profiles may
        let (profile, region) = stem.rsplit_once('_')?;
        if profile.is_empty() || region.is_empty() {
            return None;
        }
        Some(Self::new(profile, region))
    }
}

impl From<&AwsScope> for ProfileKey {
    fn from(scope: &AwsScope) -> Self {
        Self::new(scope.profile_name(), scope.region.clone())
    }
}

/// Keep a profile or region name from escaping the cache directory
fn path_safe(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

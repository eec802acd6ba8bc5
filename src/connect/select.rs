//! Instance selection
//!
//! Priority: a name argument, then `--last`, then the interactive picker.

use dialoguer::{FuzzySelect, theme::ColorfulTheme};

use crate::cache::{CacheStore, ProfileKey};
use crate::client::InstanceRecord;
use crate::error::{Error, Result};

const PICKER_PROMPT: &str = "Select RDS Instance";

/// How the user asked for an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Identifier or fragment of one
    Name(String),
    /// Instance connected to last time
    Last,
    Interactive,
}

impl Selection {
    pub fn from_args(name: Option<String>, last: bool) -> Self {
        match (name, last) {
            (Some(name), _) => Selection::Name(name),
            (None, true) => Selection::Last,
            (None, false) => Selection::Interactive,
        }
    }
}

/// Chooses one entry from a labelled list
pub trait Picker {
    /// Index of the chosen item, or `None` if the user cancelled
    fn pick(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;
}

/// Terminal fuzzy finder
pub struct FuzzyPicker;

impl Picker for FuzzyPicker {
    fn pick(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        let choice = FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()?;
        Ok(choice)
    }
}

/// Picker row: id, class and engine version in aligned columns
pub fn label(instance: &InstanceRecord) -> String {
    format!(
        "{:<30} | {:<12} | {}",
        instance.id, instance.size, instance.version
    )
}

/// Resolve a selection against the current instance list
pub fn resolve(
    instances: &[InstanceRecord],
    selection: &Selection,
    store: &CacheStore,
    key: &ProfileKey,
    picker: &dyn Picker,
) -> Result<InstanceRecord> {
    match selection {
        Selection::Name(name) => find_by_name(instances, name, picker),
        Selection::Last => {
            let last_id = store.load_last_selection(key)?;
            find_last(instances, &last_id)
        }
        Selection::Interactive => pick_instance(instances, picker),
    }
}

/// Exact identifier match first, then substring match.
///
/// Several substring matches are narrowed down with the picker.
pub fn find_by_name(
    instances: &[InstanceRecord],
    name: &str,
    picker: &dyn Picker,
) -> Result<InstanceRecord> {
    if let Some(exact) = instances.iter().find(|i| i.id == name) {
        return Ok(exact.clone());
    }

    let matches: Vec<InstanceRecord> = instances
        .iter()
        .filter(|i| i.id.contains(name))
        .cloned()
        .collect();

    match matches.len() {
        0 => Err(Error::NotFound(format!("no instance matching '{}'", name))),
        1 => Ok(matches[0].clone()),
        n => {
            log::debug!("{} instances match '{}', asking", n, name);
            pick_instance(&matches, picker)
        }
    }
}

/// The remembered instance, if it still exists
pub fn find_last(instances: &[InstanceRecord], last_id: &str) -> Result<InstanceRecord> {
    instances
        .iter()
        .find(|i| i.id == last_id)
        .cloned()
        .ok_or_else(|| {
            Error::NotFound(format!(
                "last used instance '{}' not found in current profile",
                last_id
            ))
        })
}

/// Interactive choice over `instances`, in the order given
pub fn pick_instance(instances: &[InstanceRecord], picker: &dyn Picker) -> Result<InstanceRecord> {
    if instances.is_empty() {
        return Err(Error::NotFound("no instances found".to_string()));
    }

    let labels: Vec<String> = instances.iter().map(label).collect();
    match picker.pick(PICKER_PROMPT, &labels)? {
        Some(idx) => instances
            .get(idx)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no instance at position {}", idx))),
        None => Err(Error::Cancelled),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::mock::record;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Picker that answers from a script and records what it was shown
    #[derive(Default)]
    pub(crate) struct ScriptedPicker {
        answer: Option<usize>,
        pub(crate) shown: RefCell<Vec<Vec<String>>>,
    }

    impl ScriptedPicker {
        pub(crate) fn choosing(idx: usize) -> Self {
            Self {
                answer: Some(idx),
                ..Default::default()
            }
        }

        pub(crate) fn cancelling() -> Self {
            Self::default()
        }

        pub(crate) fn times_shown(&self) -> usize {
            self.shown.borrow().len()
        }
    }

    impl Picker for ScriptedPicker {
        fn pick(&self, _prompt: &str, items: &[String]) -> Result<Option<usize>> {
            self.shown.borrow_mut().push(items.to_vec());
            Ok(self.answer)
        }
    }

    fn fleet(ids: &[&str]) -> Vec<InstanceRecord> {
        ids.iter().map(|id| record(id)).collect()
    }

    #[test]
    fn test_exact_match_wins_over_substring_matches() {
        let instances = fleet(&["orders-replica", "orders", "orders-dr"]);
        let picker = ScriptedPicker::cancelling();

        let found = find_by_name(&instances, "orders", &picker).unwrap();
        assert_eq!(found.id, "orders");
        assert_eq!(picker.times_shown(), 0);
    }

    #[test]
    fn test_unique_substring_match() {
        let instances = fleet(&["staging-db-1", "metabasedev-poc"]);
        let picker = ScriptedPicker::cancelling();

        let found = find_by_name(&instances, "metabasedev", &picker).unwrap();
        assert_eq!(found.id, "metabasedev-poc");
        assert_eq!(picker.times_shown(), 0);
    }

    #[test]
    fn test_no_match_names_the_fragment() {
        let instances = fleet(&["staging-db-1", "metabasedev-poc"]);
        let err = find_by_name(&instances, "payments", &ScriptedPicker::cancelling()).unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.to_string(), "no instance matching 'payments'");
    }

    #[test]
    fn test_empty_list_is_not_found() {
        let err = find_by_name(&[], "anything", &ScriptedPicker::cancelling()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let instances = fleet(&["Orders-Prod"]);
        let err = find_by_name(&instances, "orders", &ScriptedPicker::cancelling()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_several_matches_go_to_picker_with_only_matches() {
        let instances = fleet(&["orders-a", "billing", "orders-b"]);
        let picker = ScriptedPicker::choosing(1);

        let found = find_by_name(&instances, "orders", &picker).unwrap();
        assert_eq!(found.id, "orders-b");

        let shown = picker.shown.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].len(), 2);
        assert!(shown[0][0].starts_with("orders-a"));
    }

    #[test]
    fn test_cancelled_picker() {
        let instances = fleet(&["orders-a", "orders-b"]);
        let err = find_by_name(&instances, "orders", &ScriptedPicker::cancelling()).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_interactive_keeps_discovery_order() {
        let instances = fleet(&["zeta", "alpha"]);
        let picker = ScriptedPicker::choosing(0);

        let found = pick_instance(&instances, &picker).unwrap();
        assert_eq!(found.id, "zeta");
        assert!(picker.shown.borrow()[0][1].starts_with("alpha"));
    }

    #[test]
    fn test_label_columns() {
        let mut instance = record("orders");
        instance.size = "db.r6g.large".to_string();
        instance.version = "16.2".to_string();

        let label = label(&instance);
        assert!(label.starts_with("orders "));
        assert!(label.contains("| db.r6g.large |"));
        assert!(label.ends_with("16.2"));
    }

    #[test]
    fn test_resolve_last_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open_at(dir.path());
        let key = ProfileKey::new("dev", "ap-south-1");
        store.save_last_selection(&key, "billing").unwrap();

        let instances = fleet(&["orders", "billing"]);
        let found = resolve(
            &instances,
            &Selection::Last,
            &store,
            &key,
            &ScriptedPicker::cancelling(),
        )
        .unwrap();
        assert_eq!(found.id, "billing");
    }

    #[test]
    fn test_resolve_last_without_history() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open_at(dir.path());

        let err = resolve(
            &fleet(&["orders"]),
            &Selection::Last,
            &store,
            &ProfileKey::new("dev", "ap-south-1"),
            &ScriptedPicker::cancelling(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no history found for profile 'dev'"));
    }

    #[test]
    fn test_last_instance_gone_from_fleet() {
        let err = find_last(&fleet(&["orders"]), "decommissioned").unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("decommissioned"));
    }

    #[test]
    fn test_name_takes_priority_over_last() {
        assert_eq!(
            Selection::from_args(Some("orders".to_string()), true),
            Selection::Name("orders".to_string())
        );
        assert_eq!(Selection::from_args(None, true), Selection::Last);
        assert_eq!(Selection::from_args(None, false), Selection::Interactive);
    }
}

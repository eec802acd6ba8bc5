//! Dynamic shell completions
//!
//! Provides TAB completion for AWS profile names and instance identifiers.
//! Everything is read from local files: completion never calls AWS and
//! returns nothing rather than failing the shell.
//!
//! Shell support:
//! - Fish/Zsh: Full support with descriptions
//! - Bash: Values only (no description display)

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap_complete::engine::{ArgValueCandidates, CompletionCandidate};

use crate::cache::{CacheStore, ProfileKey};
use crate::config::DEFAULT_PROFILE;

/// Section names from an AWS shared config or credentials file.
///
/// `[default]` and `[name]` come from credentials files, `[profile name]`
/// from config files. Other section kinds (`sso-session`, `services`) are
/// not profiles.
pub fn profiles_from_ini(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(section_name)
        .filter_map(|section| match section.split_once(char::is_whitespace) {
            Some(("profile", name)) => Some(name.trim().to_string()),
            Some(_) => None,
            None => Some(section.to_string()),
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// `region` set in a profile's section of an AWS config file
pub fn region_for_profile(contents: &str, profile: &str) -> Option<String> {
    let mut in_section = false;

    for line in contents.lines() {
        if let Some(section) = section_name(line) {
            in_section = section == profile
                || section
                    .strip_prefix("profile")
                    .is_some_and(|rest| rest.trim() == profile);
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "region" {
                return Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
        }
    }
    None
}

fn section_name(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Value of a flag in a partial command line: `--long v`, `--long=v` or `-s v`
pub fn flag_value(args: &[String], long: &str, short: &str) -> Option<String> {
    let with_eq = format!("{}=", long);

    for (i, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&with_eq) {
            return Some(value.to_string()).filter(|v| !v.is_empty());
        }
        if arg == long || arg == short {
            let value = args.get(i + 1)?;
            if !value.is_empty() && !value.starts_with('-') {
                return Some(value.clone());
            }
        }
    }
    None
}

fn aws_file(env_var: &str, name: &str) -> Option<PathBuf> {
    std::env::var_os(env_var)
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join(name)))
}

fn aws_config_file() -> Option<PathBuf> {
    aws_file("AWS_CONFIG_FILE", "config")
}

fn aws_credentials_file() -> Option<PathBuf> {
    aws_file("AWS_SHARED_CREDENTIALS_FILE", "credentials")
}

/// Complete AWS profile names from the shared credentials and config files.
pub fn complete_profiles() -> Vec<CompletionCandidate> {
    let mut names = BTreeSet::new();

    for path in [aws_credentials_file(), aws_config_file()]
        .into_iter()
        .flatten()
    {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            names.extend(profiles_from_ini(&contents));
        }
    }

    names.into_iter().map(CompletionCandidate::new).collect()
}

/// Complete instance identifiers from the fresh cache.
///
/// Profile, region and cache directory are taken from the command line
/// being completed, then the environment, then the AWS config file.
/// Format: `{id}` with help `{size} | {version}`
pub fn complete_instances() -> Vec<CompletionCandidate> {
    let args: Vec<String> = std::env::args().collect();

    let profile = flag_value(&args, "--profile", "-p")
        .or_else(|| std::env::var("AWS_PROFILE").ok())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let region = flag_value(&args, "--region", "-r")
        .or_else(|| std::env::var("AWS_REGION").ok())
        .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
        .or_else(|| {
            let contents = std::fs::read_to_string(aws_config_file()?).ok()?;
            region_for_profile(&contents, &profile)
        });
    let Some(region) = region else {
        return vec![];
    };

    let store = match flag_value(&args, "--cache-dir", "--cache-dir")
        .or_else(|| std::env::var("RDS_CACHE_DIR").ok())
    {
        Some(dir) => CacheStore::open_at(&PathBuf::from(dir)),
        None => match CacheStore::open() {
            Ok(store) => store,
            Err(_) => return vec![],
        },
    };

    let Some(instances) = store.load(&ProfileKey::new(profile, region)) else {
        return vec![];
    };

    instances
        .into_iter()
        .map(|i| {
            let help = format!("{} | {}", i.size, i.version);
            CompletionCandidate::new(i.id).help(Some(help.into()))
        })
        .collect()
}

/// Create completion candidates for AWS profiles.
pub fn profile_candidates() -> ArgValueCandidates {
    ArgValueCandidates::new(complete_profiles)
}

/// Create completion candidates for cached instance identifiers.
pub fn instance_candidates() -> ArgValueCandidates {
    ArgValueCandidates::new(complete_instances)
}

//! Cache management commands

use std::time::Duration;

use colored::Colorize;

use crate::cache::CacheStore;
use crate::error::Result;

/// Show cached instance lists and last-used markers
pub fn status(store: &CacheStore) -> Result<()> {
    let stats = store.stats()?;

    println!("Cache Status");
    println!("────────────────────────────────────────");
    println!("Location:       {}", store.root().display());

    if stats.inventories.is_empty() {
        println!("Instance lists: none");
    } else {
        println!("Instance lists:");
        for entry in &stats.inventories {
            let count = entry
                .instance_count
                .map(|n| format!("{} instances", n))
                .unwrap_or_else(|| "unreadable".to_string());
            let state = if entry.fresh {
                "fresh".green()
            } else {
                "stale".yellow()
            };
            println!(
                "  {:<20} {:<16} {:<16} {:<12} {}",
                entry.key.profile,
                entry.key.region,
                count,
                format_age(entry.age),
                state
            );
        }
    }

    if !stats.last_selections.is_empty() {
        println!("Last used:");
        for (key, id) in &stats.last_selections {
            println!("  {:<20} {:<16} {}", key.profile, key.region, id);
        }
    }

    Ok(())
}

/// Delete cached data, everything or one profile's
pub fn clear(store: &CacheStore, profile: Option<&str>) -> Result<()> {
    let stats = store.clear(profile)?;

    if stats.entries_removed > 0 {
        match profile {
            Some(p) => println!(
                "Cleared {} cache entries for profile {}",
                stats.entries_removed, p
            ),
            None => println!("Cleared {} cache entries", stats.entries_removed),
        }
    } else {
        println!("Cache was already empty");
    }

    Ok(())
}

/// Show cache path
pub fn path(store: &CacheStore) -> Result<()> {
    println!("{}", store.root().display());
    Ok(())
}

/// Age as `42s`, `17m`, `3h 5m` or a local timestamp once older than a day
fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..60 => format!("{}s ago", secs),
        60..3600 => format!("{}m ago", secs / 60),
        3600..86400 => format!("{}h {}m ago", secs / 3600, (secs % 3600) / 60),
        _ => chrono::TimeDelta::from_std(age)
            .ok()
            .and_then(|delta| chrono::Local::now().checked_sub_signed(delta))
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

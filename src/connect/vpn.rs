//! Advisory VPN status check through the Pritunl client
//!
//! Nothing here can stop a connect. A missing or broken client skips the
//! check with a logged warning; a failed validation warns on stderr.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use colored::Colorize;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;

const PRITUNL_APP_PATH: &str = "/Applications/Pritunl.app/Contents/Resources/pritunl-client";
const PRITUNL_BIN: &str = "pritunl-client";
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// One profile as listed by `pritunl-client list -j`
#[derive(Debug, Clone, Deserialize)]
pub struct PritunlConnection {
    pub name: String,
    #[serde(default)]
    pub connected: bool,
}

/// Check the connections against the required VPN name, if any.
///
/// With a requirement, some connected entry's name must contain it.
/// Without one, any connected entry will do.
pub fn validate_connections(
    connections: &[PritunlConnection],
    required: Option<&str>,
) -> Result<(), String> {
    let mut connected = connections.iter().filter(|c| c.connected);

    match required {
        Some(name) => {
            if connected.any(|c| c.name.contains(name)) {
                Ok(())
            } else {
                Err(format!("required VPN profile '{}' is not connected", name))
            }
        }
        None => {
            if connected.next().is_some() {
                Ok(())
            } else {
                Err("no active VPN connection found".to_string())
            }
        }
    }
}

fn locate_client() -> Option<PathBuf> {
    let app = PathBuf::from(PRITUNL_APP_PATH);
    if app.is_file() {
        return Some(app);
    }
    which::which(PRITUNL_BIN).ok()
}

async fn list_connections(bin: &Path) -> Result<Vec<PritunlConnection>, String> {
    let mut command = Command::new(bin);
    command
        .args(["list", "-j"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = timeout(CHECK_TIMEOUT, command.output())
        .await
        .map_err(|_| format!("timed out after {}s", CHECK_TIMEOUT.as_secs()))?
        .map_err(|e| e.to_string())?;

    if !output.status.success() {
        return Err(format!(
            "exit status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    serde_json::from_slice(&output.stdout).map_err(|e| format!("unreadable output: {}", e))
}

/// Result of one advisory check
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Passed,
    /// The status tool could not be used
    Skipped(String),
    /// The tool answered and the VPN is not up
    Failed(String),
}

async fn check(bin: Option<&Path>, required: Option<&str>) -> Outcome {
    let Some(bin) = bin else {
        return Outcome::Skipped(format!("{} not installed", PRITUNL_BIN));
    };

    match list_connections(bin).await {
        Ok(connections) => match validate_connections(&connections, required) {
            Ok(()) => Outcome::Passed,
            Err(reason) => Outcome::Failed(reason),
        },
        Err(e) => Outcome::Skipped(e),
    }
}

/// Warn when the VPN the profile needs does not look connected
pub async fn warn_if_disconnected(profile: &str, required: Option<&str>) {
    let bin = locate_client();

    match check(bin.as_deref(), required).await {
        Outcome::Passed => log::debug!("VPN check passed for profile {}", profile),
        Outcome::Skipped(reason) => log::warn!("VPN check skipped: {}", reason),
        Outcome::Failed(reason) => eprintln!(
            "{} {}",
            "⚠".yellow(),
            format!("VPN check: {} (continuing anyway)", reason).yellow()
        ),
    }
}

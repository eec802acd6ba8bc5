//! Launching an external interactive client
//!
//! The client runs in its own process group and owns the terminal for its
//! whole lifetime; see [`super::terminal`].

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use super::terminal::{ForegroundGuard, TerminalControl};
use crate::client::{Credentials, InstanceRecord};
use crate::error::{Error, Result};

/// Environment variable the PostgreSQL clients read the password from
pub const PASSWORD_ENV: &str = "PGPASSWORD";

/// First client from `candidates` found on `PATH`
pub fn find_client(candidates: &[String]) -> Option<PathBuf> {
    candidates.iter().find_map(|name| which::which(name).ok())
}

/// Connection arguments. The password is not among them.
pub fn client_args(instance: &InstanceRecord, creds: &Credentials, database: &str) -> Vec<String> {
    vec![
        "-h".to_string(),
        instance.host.clone(),
        "-p".to_string(),
        instance.port.to_string(),
        "-U".to_string(),
        creds.username.clone(),
        "-d".to_string(),
        database.to_string(),
    ]
}

/// Command for `bin` bound to the instance, password passed via environment
pub fn client_command(
    bin: &Path,
    instance: &InstanceRecord,
    creds: &Credentials,
    database: &str,
) -> Command {
    let mut command = Command::new(bin);
    command
        .args(client_args(instance, creds, database))
        .env(PASSWORD_ENV, creds.password());
    command
}

/// Run `command` attached to our stdio and wait for it.
///
/// The terminal goes to the child right after it starts and comes back to
/// us on every path out of this function.
pub fn launch(mut command: Command, terminal: &dyn TerminalControl) -> Result<ExitStatus> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let program = command.get_program().to_string_lossy().into_owned();
    let guard = ForegroundGuard::new(terminal);

    let mut child = command
        .spawn()
        .map_err(|e| Error::Launch(format!("{}: {}", program, e)))?;
    guard.hand_to(child.id());

    let status = child
        .wait()
        .map_err(|e| Error::Launch(format!("waiting for {}: {}", program, e)))?;
    drop(guard);

    log::debug!("{} exited with {}", program, status);
    Ok(status)
}

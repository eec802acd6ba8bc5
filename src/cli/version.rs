//! Version information

use std::sync::LazyLock;

/// Commit the binary was built from, set by the release build
const COMMIT: &str = match option_env!("RDS_GIT_COMMIT") {
    Some(commit) => commit,
    None => "none",
};

const BUILD_DATE: &str = match option_env!("RDS_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

static SHORT_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} (commit: {}, built: {})",
        env!("CARGO_PKG_VERSION"),
        COMMIT,
        BUILD_DATE
    )
});

/// Version shown by `rds --version`
pub fn short_version() -> &'static str {
    SHORT_VERSION.as_str()
}

/// Lines printed by `rds version`
pub fn version_lines() -> Vec<String> {
    vec![
        format!("rds version: {}", env!("CARGO_PKG_VERSION")),
        format!("commit:      {}", COMMIT),
        format!("built at:    {}", BUILD_DATE),
        format!(
            "os/arch:     {}/{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
    ]
}

pub fn run() {
    for line in version_lines() {
        println!("{}", line);
    }
}

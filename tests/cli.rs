use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn rds() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rds"));
    cmd.env_remove("RDS_CACHE_DIR")
        .env_remove("RDS_CONFIG")
        .env_remove("RDS_NO_CACHE")
        .env_remove("RDS_DEBUG")
        .env_remove("AWS_PROFILE")
        .env_remove("COMPLETE");
    cmd
}

fn write_inventory(dir: &Path, profile: &str, region: &str, ids: &[&str]) {
    let instances: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"id":"{id}","host":"{id}.local","size":"db.t4g.medium","port":5432,"version":"15.4","source_id":""}}"#
            )
        })
        .collect();
    let body = format!(
        r#"{{"version":"v2","instances":[{}]}}"#,
        instances.join(",")
    );
    fs::write(
        dir.join(format!("{profile}_{region}_instances.json")),
        body,
    )
    .expect("failed to write inventory");
}

#[test]
fn version_prints_build_info() {
    rds()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rds version:"))
        .stdout(predicate::str::contains("os/arch:"));
}

#[test]
fn version_flag_includes_commit_and_build_date() {
    rds()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("commit:"))
        .stdout(predicate::str::contains("built:"));
}

#[test]
fn cache_path_uses_flag() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    rds()
        .arg("cache")
        .arg("path")
        .arg("--cache-dir")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(temp.path().to_string_lossy()));

    Ok(())
}

#[test]
fn cache_path_uses_environment() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    rds()
        .args(["cache", "path"])
        .env("RDS_CACHE_DIR", temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(temp.path().to_string_lossy()));

    Ok(())
}

#[test]
fn cache_path_uses_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let cache_dir = temp.path().join("from-config");
    let config_path = temp.path().join("config.yaml");
    fs::write(&config_path, format!("cache_dir: {}\n", cache_dir.display()))?;

    rds()
        .args(["cache", "path", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("from-config"));

    Ok(())
}

#[test]
fn cache_status_on_empty_dir() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    rds()
        .args(["cache", "status", "--cache-dir"])
        .arg(temp.path().join("never-created"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Instance lists: none"));

    Ok(())
}

#[test]
fn cache_status_lists_inventories_and_markers() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    write_inventory(temp.path(), "dev", "ap-south-1", &["orders", "billing"]);
    fs::write(temp.path().join("dev_ap-south-1_last_connected"), "orders\n")?;

    rds()
        .args(["cache", "status", "--cache-dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ap-south-1"))
        .stdout(predicate::str::contains("2 instances"))
        .stdout(predicate::str::contains("fresh"))
        .stdout(predicate::str::contains("Last used:"))
        .stdout(predicate::str::contains("orders"));

    Ok(())
}

#[test]
fn cache_clear_profile_only_keeps_other_profiles() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    write_inventory(temp.path(), "dev", "ap-south-1", &["orders"]);
    write_inventory(temp.path(), "prod", "ap-south-1", &["orders"]);
    fs::write(temp.path().join("dev_ap-south-1_last_connected"), "orders")?;
    fs::write(temp.path().join("notes.txt"), "not ours")?;

    rds()
        .args(["cache", "clear", "--profile-only", "-p", "dev", "--cache-dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 cache entries for profile dev"));

    assert!(!temp.path().join("dev_ap-south-1_instances.json").exists());
    assert!(!temp.path().join("dev_ap-south-1_last_connected").exists());
    assert!(temp.path().join("prod_ap-south-1_instances.json").exists());
    assert!(temp.path().join("notes.txt").exists());

    Ok(())
}

#[test]
fn cache_clear_all() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    write_inventory(temp.path(), "dev", "ap-south-1", &["orders"]);
    write_inventory(temp.path(), "prod", "us-east-1", &["orders-dr"]);

    rds()
        .args(["cache", "clear", "--cache-dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 cache entries"));

    rds()
        .args(["cache", "clear", "--cache-dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache was already empty"));

    Ok(())
}

#[test]
fn missing_explicit_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let nonexistent_config = temp.path().join("does-not-exist.yaml");

    rds()
        .args(["cache", "status", "--config"])
        .arg(&nonexistent_config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Configuration file not found"));

    Ok(())
}

#[test]
fn invalid_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("config.yaml");
    fs::write(&config_path, "secret_prefix: root/admin\n")?;

    rds()
        .args(["cache", "path", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));

    Ok(())
}

#[test]
fn static_completion_script() {
    rds()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rds"));
}

#[test]
fn dynamic_completion_registration() {
    rds()
        .env("COMPLETE", "bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}

#[test]
fn gen_docs_writes_reference_pages() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let out = temp.path().join("reference");

    rds()
        .args(["gen-docs", "--dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    assert!(out.join("rds.md").is_file());
    assert!(out.join("rds_connect.md").is_file());
    assert!(out.join("rds_cache_status.md").is_file());

    Ok(())
}

#[test]
fn gen_docs_is_hidden_from_help() {
    rds()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gen-docs").not());
}

#[test]
fn connect_help_documents_selection() {
    rds()
        .args(["connect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--last"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    rds()
        .arg("disconnect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

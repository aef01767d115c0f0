use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn setup_repository(contents: Value) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("repository.json");
    fs::write(&path, serde_json::to_string_pretty(&contents).unwrap()).unwrap();
    (temp_dir, path.to_string_lossy().to_string())
}

fn limit_group(path: &str, name: &str) -> Value {
    let document: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    document["limitGroups"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["name"] == name)
        .cloned()
        .unwrap_or(Value::Null)
}

#[test]
fn test_exclude_adds_worker_to_every_named_group() -> Result<()> {
    let (_temp_dir, repository) = setup_repository(json!({
        "limitGroups": [
            { "name": "maya", "listedWorkers": [], "excludedWorkers": ["render-09"] }
        ]
    }));

    Command::cargo_bin("farm-limitgroups")?
        .args(["--limitgroups", "maya", "nuke", "--slave", "render-01", "--exclude"])
        .arg("--repository")
        .arg(&repository)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Added render-01 to excluded workers of maya",
        ));

    assert_eq!(
        limit_group(&repository, "maya")["excludedWorkers"],
        json!(["render-09", "render-01"])
    );
    assert_eq!(
        limit_group(&repository, "nuke")["excludedWorkers"],
        json!(["render-01"])
    );

    Ok(())
}

#[test]
fn test_without_exclude_adds_worker_to_listed_workers() -> Result<()> {
    let (_temp_dir, repository) = setup_repository(json!({
        "limitGroups": [
            { "name": "maya", "listedWorkers": ["render-02"], "excludedWorkers": [] }
        ]
    }));

    Command::cargo_bin("farm-limitgroups")?
        .args(["--slave", "render-01", "--limitgroups", "maya"])
        .arg("--repository")
        .arg(&repository)
        .assert()
        .success();

    let group = limit_group(&repository, "maya");
    assert_eq!(group["listedWorkers"], json!(["render-02", "render-01"]));
    assert_eq!(group["excludedWorkers"], json!([]));

    Ok(())
}

#[test]
fn test_repeated_run_does_not_duplicate_worker() -> Result<()> {
    let (_temp_dir, repository) = setup_repository(json!({ "limitGroups": [] }));

    for _ in 0..2 {
        Command::cargo_bin("farm-limitgroups")?
            .args(["--limitgroups", "houdini", "--slave", "render-05"])
            .arg("--repository")
            .arg(&repository)
            .assert()
            .success();
    }

    assert_eq!(
        limit_group(&repository, "houdini")["listedWorkers"],
        json!(["render-05"])
    );

    Ok(())
}

#[test]
fn test_blank_group_name_is_reported_not_found() -> Result<()> {
    let (_temp_dir, repository) = setup_repository(json!({ "limitGroups": [] }));

    Command::cargo_bin("farm-limitgroups")?
        .args(["--limitgroups", "", "maya", "--slave", "render-01"])
        .arg("--repository")
        .arg(&repository)
        .assert()
        .success()
        .stdout(predicate::str::contains("The limit group  was not found"));

    assert_eq!(
        limit_group(&repository, "maya")["listedWorkers"],
        json!(["render-01"])
    );

    Ok(())
}

#[test]
fn test_corrupt_repository_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let repository = temp_dir.path().join("repository.json");
    fs::write(&repository, "not json")?;

    Command::cargo_bin("farm-limitgroups")?
        .args(["--limitgroups", "maya", "--slave", "render-01"])
        .arg("--repository")
        .arg(&repository)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to update limit groups"));

    Ok(())
}

#[test]
fn test_limitgroups_argument_is_required() -> Result<()> {
    Command::cargo_bin("farm-limitgroups")?
        .args(["--slave", "render-01"])
        .assert()
        .failure();

    Ok(())
}

// ABOUTME: Integration tests for the ecs-release CLI commands.
// ABOUTME: Validates --help output, init, offline render and config errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const TASK_DEFINITION: &str = r#"{
  "taskDefinition": {
    "taskDefinitionArn": "arn:aws:ecs:us-east-1:123456789012:task-definition/api:7",
    "family": "api",
    "revision": 7,
    "status": "ACTIVE",
    "containerDefinitions": [
      { "name": "app", "image": "api:7", "essential": true },
      { "name": "log-router", "image": "fluent-bit:2" }
    ]
  }
}"#;

fn ecs_release_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ecs-release"))
}

#[test]
fn help_shows_commands() {
    ecs_release_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("ecs-release.yml");

    ecs_release_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success();

    assert!(config_path.exists(), "ecs-release.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("mode: rolling"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("ecs-release.yml");

    fs::write(&config_path, "existing: config").unwrap();

    ecs_release_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing: config");
}

#[test]
fn init_force_overwrites() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("ecs-release.yml");
    fs::write(&config_path, "existing: config").unwrap();

    ecs_release_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();

    assert!(fs::read_to_string(&config_path).unwrap().contains("cluster:"));
}

#[test]
fn render_patches_only_the_named_container() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("task.json");
    fs::write(&input, TASK_DEFINITION).unwrap();

    let assert = ecs_release_cmd()
        .arg("render")
        .arg("--task-definition")
        .arg(&input)
        .args(["--container", "app", "--image", "api:8"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let rendered: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rendered["containerDefinitions"][0]["image"], "api:8");
    assert_eq!(rendered["containerDefinitions"][1]["image"], "fluent-bit:2");
    assert!(rendered.get("taskDefinitionArn").is_none());
    assert!(rendered.get("status").is_none());
}

#[test]
fn render_fails_for_unknown_container() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("task.json");
    fs::write(&input, TASK_DEFINITION).unwrap();

    ecs_release_cmd()
        .arg("render")
        .arg("--task-definition")
        .arg(&input)
        .args(["--container", "web", "--image", "api:8"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("container 'web' not found"));
}

#[test]
fn deploy_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    ecs_release_cmd()
        .current_dir(temp_dir.path())
        .env_remove("PLUGIN_MODE")
        .arg("deploy")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn deploy_reports_missing_plugin_settings() {
    let temp_dir = tempfile::tempdir().unwrap();

    ecs_release_cmd()
        .current_dir(temp_dir.path())
        .env("PLUGIN_MODE", "rolling")
        .env_remove("PLUGIN_AWS_REGION")
        .env_remove("PLUGIN_SERVICE")
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLUGIN_AWS_REGION"))
        .stderr(predicate::str::contains("PLUGIN_SERVICE"));
}

#[test]
fn quiet_and_json_conflict() {
    ecs_release_cmd()
        .args(["--quiet", "--json", "init"])
        .assert()
        .failure();
}

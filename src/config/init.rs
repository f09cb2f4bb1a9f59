// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates ecs-release.yml template files.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

const TEMPLATE: &str = r#"# ecs-release configuration
region: us-east-1
cluster: my-cluster
# Container in the task definition whose image is replaced.
container: app

# Non-passing checks before a release is declared timed out.
max_checks: 60
poll_interval: 10s

# rolling | blue-green | blue-green-cluster
mode: rolling
services:
  - my-service
image: my-registry/my-app:latest
rollback: true

# Blue/green instead of rolling:
# mode: blue-green
# blue_service: my-service-blue
# green_service: my-service-green
# image: my-registry/my-app:latest
# checks_to_pass: 3
# settle_delay: 45s
# scale_down:
#   percent: 25
#   interval: 1m
#   wait_period: 2m
"#;

/// Write a template config into `dir`, refusing to overwrite unless `force`.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;
    Ok(config_path)
}

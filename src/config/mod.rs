// ABOUTME: Configuration types and parsing for ecs-release.yml and the plugin environment.
// ABOUTME: Handles YAML parsing, discovery, validation and conversion into release inputs.

mod deserialize;
mod env;
mod init;

pub use env::{MODE_VAR, from_lookup};
pub use init::init_config;

use crate::deploy::{
    BlueGreenRelease, ColorTarget, OffColorRelease, PollPolicy, RollingRelease, ScaleDownSettings,
};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::types::{ImageRef, ServiceName};
use deserialize::{deserialize_image_ref, deserialize_service_name, deserialize_services};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "ecs-release.yml";
pub const CONFIG_FILENAME_ALT: &str = "ecs-release.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".ecs-release/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub region: String,

    #[serde(default)]
    pub assume_role: Option<String>,

    pub cluster: String,

    /// Container whose image is replaced in the task definition.
    pub container: String,

    #[serde(default = "default_max_checks")]
    pub max_checks: u32,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(flatten)]
    pub release: ReleaseConfig,
}

/// Release mode and its mode-specific settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ReleaseConfig {
    Rolling(RollingConfig),
    BlueGreen(BlueGreenConfig),
    BlueGreenCluster(ClusterConfig),
}

impl ReleaseConfig {
    pub fn mode(&self) -> &'static str {
        match self {
            ReleaseConfig::Rolling(_) => "rolling",
            ReleaseConfig::BlueGreen(_) => "blue-green",
            ReleaseConfig::BlueGreenCluster(_) => "blue-green-cluster",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RollingConfig {
    #[serde(deserialize_with = "deserialize_services")]
    pub services: NonEmpty<ServiceName>,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    #[serde(default = "default_rollback")]
    pub rollback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlueGreenConfig {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub blue_service: ServiceName,

    #[serde(deserialize_with = "deserialize_service_name")]
    pub green_service: ServiceName,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    #[serde(default = "default_checks_to_pass")]
    pub checks_to_pass: u32,

    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,

    pub scale_down: ScaleDownConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScaleDownConfig {
    /// Share of the original task count removed per step.
    pub percent: u8,

    /// Pause between two scale-down steps.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Pause between convergence and the first step.
    #[serde(with = "humantime_serde")]
    pub wait_period: Duration,

    #[serde(default = "default_scale_down_poll", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub blue_service: ServiceName,

    #[serde(deserialize_with = "deserialize_service_name")]
    pub green_service: ServiceName,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub blue_image: ImageRef,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub green_image: ImageRef,

    /// Suffix of the secret holding the live color.
    pub secret_service: String,

    pub branch: String,

    #[serde(default = "default_rollback")]
    pub rollback: bool,
}

fn default_max_checks() -> u32 {
    PollPolicy::DEFAULT_MAX_CHECKS
}

fn default_poll_interval() -> Duration {
    PollPolicy::DEFAULT_INTERVAL
}

fn default_rollback() -> bool {
    true
}

fn default_checks_to_pass() -> u32 {
    1
}

fn default_settle_delay() -> Duration {
    BlueGreenRelease::DEFAULT_SETTLE_DELAY
}

fn default_scale_down_poll() -> Duration {
    ScaleDownSettings::DEFAULT_POLL_INTERVAL
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config file");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Build the config from the plugin environment (`PLUGIN_*`).
    pub fn from_env(diag: &mut Diagnostics) -> Result<Self> {
        let config = from_lookup(|name| std::env::var(name).ok(), diag)?;
        config.validate()?;
        Ok(config)
    }

    /// An explicit path, else a discovered file, else the plugin environment.
    pub fn resolve(dir: &Path, explicit: Option<&Path>, diag: &mut Diagnostics) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) if std::env::var_os(MODE_VAR).is_some() => {
                tracing::debug!("no config file, reading plugin environment");
                Self::from_env(diag)
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("region", &self.region),
            ("cluster", &self.cluster),
            ("container", &self.container),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} must not be empty")));
            }
        }

        match &self.release {
            ReleaseConfig::Rolling(_) => Ok(()),
            ReleaseConfig::BlueGreen(bg) => {
                validate_pair(&bg.blue_service, &bg.green_service)?;
                if !(1..=100).contains(&bg.scale_down.percent) {
                    return Err(Error::InvalidConfig(format!(
                        "scale_down.percent must be between 1 and 100, got {}",
                        bg.scale_down.percent
                    )));
                }
                Ok(())
            }
            ReleaseConfig::BlueGreenCluster(cluster) => {
                validate_pair(&cluster.blue_service, &cluster.green_service)?;
                if cluster.secret_service.trim().is_empty() {
                    return Err(Error::InvalidConfig(
                        "secret_service must not be empty".to_string(),
                    ));
                }
                if cluster.branch.trim().is_empty() {
                    return Err(Error::InvalidConfig("branch must not be empty".to_string()));
                }
                Ok(())
            }
        }
    }

    pub fn policy(&self, required_successes: u32) -> PollPolicy {
        PollPolicy::new(self.poll_interval, self.max_checks, required_successes)
    }

    /// Services this config releases, in order.
    pub fn services(&self) -> Vec<&ServiceName> {
        match &self.release {
            ReleaseConfig::Rolling(r) => r.services.iter().collect(),
            ReleaseConfig::BlueGreen(bg) => vec![&bg.blue_service, &bg.green_service],
            ReleaseConfig::BlueGreenCluster(c) => vec![&c.blue_service, &c.green_service],
        }
    }

    pub fn rolling_release(&self, rolling: &RollingConfig) -> RollingRelease {
        RollingRelease {
            services: rolling.services.clone(),
            container: self.container.clone(),
            image: rolling.image.clone(),
            policy: self.policy(1),
            rollback: rolling.rollback,
        }
    }

    pub fn blue_green_release(&self, bg: &BlueGreenConfig) -> BlueGreenRelease {
        BlueGreenRelease {
            blue: bg.blue_service.clone(),
            green: bg.green_service.clone(),
            container: self.container.clone(),
            image: bg.image.clone(),
            policy: self.policy(bg.checks_to_pass),
            settle_delay: bg.settle_delay,
            cooldown: bg.scale_down.wait_period,
            scale_down: ScaleDownSettings {
                percent: bg.scale_down.percent,
                step_interval: bg.scale_down.interval,
                poll_interval: bg.scale_down.poll_interval,
            },
        }
    }

    pub fn off_color_release(&self, cluster: &ClusterConfig) -> OffColorRelease {
        OffColorRelease {
            blue: ColorTarget {
                service: cluster.blue_service.clone(),
                image: cluster.blue_image.clone(),
            },
            green: ColorTarget {
                service: cluster.green_service.clone(),
                image: cluster.green_image.clone(),
            },
            branch: cluster.branch.clone(),
            secret_service: cluster.secret_service.clone(),
            container: self.container.clone(),
            policy: self.policy(1),
            rollback: cluster.rollback,
        }
    }
}

fn validate_pair(blue: &ServiceName, green: &ServiceName) -> Result<()> {
    if blue == green {
        return Err(Error::InvalidConfig(format!(
            "blue and green services must differ, both are '{blue}'"
        )));
    }
    Ok(())
}

// ABOUTME: Plugin environment (PLUGIN_*) configuration source.
// ABOUTME: Collects every missing variable before failing so CI shows them all at once.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use nonempty::NonEmpty;

use super::{
    BlueGreenConfig, ClusterConfig, Config, ReleaseConfig, RollingConfig, ScaleDownConfig,
    default_checks_to_pass, default_max_checks, default_poll_interval, default_rollback,
    default_scale_down_poll, default_settle_delay,
};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::types::{ImageRef, ServiceName};

pub const MODE_VAR: &str = "PLUGIN_MODE";

struct Env<F> {
    lookup: F,
    missing: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&mut self, name: &str) -> String {
        self.optional(name).unwrap_or_else(|| {
            self.missing.push(name.to_string());
            String::new()
        })
    }

    /// First set variable among `names`.
    fn required_any(&mut self, names: &[&str]) -> String {
        match names.iter().find_map(|name| self.optional(name)) {
            Some(value) => value,
            None => {
                self.missing.push(names.join(" or "));
                String::new()
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingSettings(self.missing))
        }
    }
}

/// Build a config from environment-style lookups.
///
/// `lookup` returns the value of a variable; empty values count as unset.
pub fn from_lookup<F>(lookup: F, diag: &mut Diagnostics) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = Env {
        lookup,
        missing: Vec::new(),
    };

    let region = env.required("PLUGIN_AWS_REGION");
    let cluster = env.required("PLUGIN_CLUSTER");
    let container = env.required("PLUGIN_CONTAINER");
    let mode = env.required(MODE_VAR);
    let assume_role = env.optional("PLUGIN_ASSUME_ROLE");
    let max_checks = match env.optional("PLUGIN_MAX_DEPLOY_CHECKS") {
        None => default_max_checks(),
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            diag.warn(Warning::config_default(format!(
                "PLUGIN_MAX_DEPLOY_CHECKS '{raw}' is not a number, using {}",
                default_max_checks()
            )));
            default_max_checks()
        }),
    };

    let release = match mode.as_str() {
        "" => None,
        "rolling" => {
            let services = env.required("PLUGIN_SERVICE");
            let image = env.required("PLUGIN_IMAGE");
            let rollback = env.optional("PLUGIN_ROLLBACK");
            Some(Pending::Rolling {
                services,
                image,
                rollback,
            })
        }
        "blue-green" => Some(Pending::BlueGreen {
            blue: env.required("PLUGIN_BLUE_SERVICE"),
            green: env.required("PLUGIN_GREEN_SERVICE"),
            image: env.required("PLUGIN_IMAGE"),
            percent: env.required("PLUGIN_SCALE_DOWN_PERCENT"),
            interval: env.required("PLUGIN_SCALE_DOWN_INTERVAL"),
            wait_period: env.required("PLUGIN_SCALE_DOWN_WAIT_PERIOD"),
            checks_to_pass: env.required("PLUGIN_CHECKS_TO_PASS"),
        }),
        "blue-green-cluster" => Some(Pending::Cluster {
            blue: env.required("PLUGIN_BLUE_SERVICE"),
            green: env.required("PLUGIN_GREEN_SERVICE"),
            blue_image: env.required("PLUGIN_BLUE_IMAGE"),
            green_image: env.required("PLUGIN_GREEN_IMAGE"),
            secret_service: env.required("PLUGIN_SECRET_SERVICE"),
            branch: env.required_any(&["PLUGIN_BRANCH", "DRONE_BRANCH"]),
            rollback: env.optional("PLUGIN_ROLLBACK"),
        }),
        other => {
            return Err(Error::InvalidConfig(format!(
                "{MODE_VAR} must be one of rolling, blue-green, blue-green-cluster; got '{other}'"
            )));
        }
    };

    env.finish()?;
    let release = release.ok_or_else(|| Error::MissingSettings(vec![MODE_VAR.to_string()]))?;

    Ok(Config {
        region,
        assume_role,
        cluster,
        container,
        max_checks,
        poll_interval: default_poll_interval(),
        release: release.parse(diag)?,
    })
}

/// Raw mode-specific values, parsed once nothing is missing.
enum Pending {
    Rolling {
        services: String,
        image: String,
        rollback: Option<String>,
    },
    BlueGreen {
        blue: String,
        green: String,
        image: String,
        percent: String,
        interval: String,
        wait_period: String,
        checks_to_pass: String,
    },
    Cluster {
        blue: String,
        green: String,
        blue_image: String,
        green_image: String,
        secret_service: String,
        branch: String,
        rollback: Option<String>,
    },
}

impl Pending {
    fn parse(self, diag: &mut Diagnostics) -> Result<ReleaseConfig> {
        match self {
            Pending::Rolling {
                services,
                image,
                rollback,
            } => Ok(ReleaseConfig::Rolling(RollingConfig {
                services: parse_services("PLUGIN_SERVICE", &services)?,
                image: parse_image("PLUGIN_IMAGE", &image)?,
                rollback: parse_rollback(rollback, diag),
            })),
            Pending::BlueGreen {
                blue,
                green,
                image,
                percent,
                interval,
                wait_period,
                checks_to_pass,
            } => {
                let checks_to_pass: u32 = parse_number("PLUGIN_CHECKS_TO_PASS", &checks_to_pass)?;
                Ok(ReleaseConfig::BlueGreen(BlueGreenConfig {
                    blue_service: parse_service("PLUGIN_BLUE_SERVICE", &blue)?,
                    green_service: parse_service("PLUGIN_GREEN_SERVICE", &green)?,
                    image: parse_image("PLUGIN_IMAGE", &image)?,
                    checks_to_pass: checks_to_pass.max(default_checks_to_pass()),
                    settle_delay: default_settle_delay(),
                    scale_down: ScaleDownConfig {
                        percent: parse_number("PLUGIN_SCALE_DOWN_PERCENT", &percent)?,
                        interval: parse_seconds("PLUGIN_SCALE_DOWN_INTERVAL", &interval)?,
                        wait_period: parse_seconds("PLUGIN_SCALE_DOWN_WAIT_PERIOD", &wait_period)?,
                        poll_interval: default_scale_down_poll(),
                    },
                }))
            }
            Pending::Cluster {
                blue,
                green,
                blue_image,
                green_image,
                secret_service,
                branch,
                rollback,
            } => Ok(ReleaseConfig::BlueGreenCluster(ClusterConfig {
                blue_service: parse_service("PLUGIN_BLUE_SERVICE", &blue)?,
                green_service: parse_service("PLUGIN_GREEN_SERVICE", &green)?,
                blue_image: parse_image("PLUGIN_BLUE_IMAGE", &blue_image)?,
                green_image: parse_image("PLUGIN_GREEN_IMAGE", &green_image)?,
                secret_service: secret_service.trim().to_string(),
                branch: branch.trim().to_string(),
                rollback: parse_rollback(rollback, diag),
            })),
        }
    }
}

fn invalid(name: &str, value: &str, err: impl Display) -> Error {
    Error::InvalidConfig(format!("{name}='{value}': {err}"))
}

fn parse_service(name: &str, value: &str) -> Result<ServiceName> {
    ServiceName::new(value).map_err(|e| invalid(name, value, e))
}

fn parse_services(name: &str, value: &str) -> Result<NonEmpty<ServiceName>> {
    let services = ServiceName::parse_list(value).map_err(|e| invalid(name, value, e))?;
    NonEmpty::from_vec(services).ok_or_else(|| invalid(name, value, "no services listed"))
}

fn parse_image(name: &str, value: &str) -> Result<ImageRef> {
    ImageRef::parse(value.trim()).map_err(|e| invalid(name, value, e))
}

fn parse_number<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e| invalid(name, value, e))
}

fn parse_seconds(name: &str, value: &str) -> Result<Duration> {
    parse_number(name, value).map(Duration::from_secs)
}

fn parse_rollback(value: Option<String>, diag: &mut Diagnostics) -> bool {
    let Some(raw) = value else {
        return default_rollback();
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        _ => {
            diag.warn(Warning::config_default(format!(
                "PLUGIN_ROLLBACK '{raw}' is not a boolean, rollbacks stay enabled"
            )));
            default_rollback()
        }
    }
}

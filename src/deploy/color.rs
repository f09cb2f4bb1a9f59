// ABOUTME: Off-color release for clusters that keep blue and green running side by side.
// ABOUTME: Reads the live color from the secret store and rolls the other color's service.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::diagnostics::Diagnostics;
use crate::platform::error::MalformedSecretSnafu;
use crate::platform::{PlatformError, SecretOps, ServiceOps, TaskDefinitionOps};
use crate::types::{Color, ImageRef, ServiceName};

use super::rolling::{RollingOutcome, RollingRelease, run_rolling};
use super::{Delay, DeployContext, DeployError, PollPolicy};

const PRODUCTION_BRANCH: &str = "main";
const PRODUCTION_ENVIRONMENT: &str = "production";

/// The service and image that belong to one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTarget {
    pub service: ServiceName,
    pub image: ImageRef,
}

/// Inputs of an off-color release.
#[derive(Debug, Clone)]
pub struct OffColorRelease {
    pub blue: ColorTarget,
    pub green: ColorTarget,
    pub branch: String,
    pub secret_service: String,
    pub container: String,
    pub policy: PollPolicy,
    pub rollback: bool,
}

impl OffColorRelease {
    pub fn target(&self, color: Color) -> &ColorTarget {
        match color {
            Color::Blue => &self.blue,
            Color::Green => &self.green,
        }
    }
}

/// Result of a successful off-color release.
#[derive(Debug, Clone, Serialize)]
pub struct OffColorOutcome {
    pub color: Color,
    #[serde(flatten)]
    pub rolling: RollingOutcome,
}

#[derive(Debug, Deserialize)]
struct LiveEnvironment {
    #[serde(rename = "CURRENT_LIVE_ENVIRONMENT", default)]
    current: Option<String>,
}

/// `production` for the main branch, the branch name otherwise.
pub fn environment_for_branch(branch: &str) -> &str {
    if branch == PRODUCTION_BRANCH {
        PRODUCTION_ENVIRONMENT
    } else {
        branch
    }
}

/// Secret holding the live color for `branch`.
pub fn secret_id(branch: &str, secret_service: &str) -> String {
    format!("{}-{}", environment_for_branch(branch), secret_service)
}

/// Decode the secret and return the color that is not live.
///
/// Only an explicit `blue` marks blue as live; anything else leaves blue inactive.
pub fn inactive_color(secret_id: &str, secret: &str) -> Result<Color, PlatformError> {
    let live: LiveEnvironment =
        serde_json::from_str(secret).context(MalformedSecretSnafu { secret_id })?;

    Ok(match live.current.as_deref() {
        Some("blue") => Color::Green,
        _ => Color::Blue,
    })
}

/// Look up which color is currently inactive.
pub async fn resolve_off_color<S>(
    secrets: &S,
    branch: &str,
    secret_service: &str,
) -> Result<Color, DeployError>
where
    S: SecretOps + ?Sized,
{
    let id = secret_id(branch, secret_service);
    let value = secrets.get_secret_value(&id).await?;
    let color = inactive_color(&id, &value)?;

    tracing::info!(secret = %id, live = %color.other(), inactive = %color, "resolved live color");
    Ok(color)
}

/// Roll the inactive color's service to that color's image.
pub async fn run_off_color<P, D>(
    ctx: &DeployContext<'_, P, D>,
    release: &OffColorRelease,
    diag: &mut Diagnostics,
) -> Result<OffColorOutcome, DeployError>
where
    P: ServiceOps + TaskDefinitionOps + SecretOps + ?Sized,
    D: Delay + ?Sized,
{
    let color = resolve_off_color(ctx.platform, &release.branch, &release.secret_service).await?;
    let target = release.target(color);

    let rolling = RollingRelease {
        services: NonEmpty::new(target.service.clone()),
        container: release.container.clone(),
        image: target.image.clone(),
        policy: release.policy,
        rollback: release.rollback,
    };

    let outcome = run_rolling(ctx, &rolling, diag).await?;
    Ok(OffColorOutcome {
        color,
        rolling: outcome,
    })
}

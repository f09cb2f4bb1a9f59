// ABOUTME: Gradual scale-down of a retiring service in fixed-size percentage steps.
// ABOUTME: The whole step list is precomputed; each step waits for the service to settle.

use std::time::Duration;

use serde::Serialize;

use crate::platform::{ScalingOps, ServiceOps};
use crate::types::ServiceName;

use super::capacity;
use super::{Delay, DeployContext, DeployError};

/// Tasks removed per step: `percent` of `original`, at least 1.
///
/// Fractions are truncated, not rounded, so a step never removes more than
/// the configured share: 10 tasks at 37 % retire 3 per step, not 4.
pub fn step_size(original: u32, percent: u8) -> u32 {
    let step = u64::from(original) * u64::from(percent) / 100;
    u32::try_from(step).unwrap_or(u32::MAX).max(1)
}

/// The ordered desired counts a scale-down walks through, ending at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleDownPlan {
    step: u32,
    targets: Vec<u32>,
}

impl ScaleDownPlan {
    /// Plan a scale-down from `current` with steps sized against `original`.
    pub fn new(current: u32, original: u32, percent: u8) -> Self {
        if original == 0 || current == 0 {
            return Self {
                step: 0,
                targets: Vec::new(),
            };
        }

        let step = step_size(original, percent);
        let mut targets = Vec::new();
        let mut remaining = current;
        while remaining > 0 {
            remaining = remaining.saturating_sub(step);
            targets.push(remaining);
        }

        Self { step, targets }
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn targets(&self) -> &[u32] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Timing and sizing of a gradual scale-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleDownSettings {
    /// Share of the original count removed per step, 1..=100.
    pub percent: u8,
    /// Pause between two steps.
    pub step_interval: Duration,
    /// Pause between two settle checks within a step.
    pub poll_interval: Duration,
}

impl ScaleDownSettings {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
}

/// Retire `service` step by step until its desired count is 0.
///
/// The settle wait inside each step has no check budget.
pub async fn scale_down_in_steps<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
    uses_autoscaling: bool,
    settings: &ScaleDownSettings,
    current: u32,
    original: u32,
) -> Result<ScaleDownPlan, DeployError>
where
    P: ServiceOps + ScalingOps + ?Sized,
    D: Delay + ?Sized,
{
    let plan = ScaleDownPlan::new(current, original, settings.percent);
    tracing::info!(
        service = %service,
        percent = settings.percent,
        step = plan.step(),
        steps = plan.targets().len(),
        "scaling down"
    );

    for &target in plan.targets() {
        capacity::scale_down(ctx, service, target, target, uses_autoscaling).await?;
        wait_until_settled(ctx, service, settings.poll_interval).await?;
        tracing::info!(service = %service, target, "scale-down step finished");

        if target > 0 {
            ctx.delay.sleep(settings.step_interval).await;
        }
    }

    Ok(plan)
}

async fn wait_until_settled<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
    poll_interval: Duration,
) -> Result<(), DeployError>
where
    P: ServiceOps + ?Sized,
    D: Delay + ?Sized,
{
    loop {
        let status = ctx.platform.describe_service(ctx.cluster, service).await?;
        if status.is_settled() {
            return Ok(());
        }
        tracing::debug!(
            service = %service,
            running = status.running_count,
            desired = status.desired_count,
            "waiting for scale-down to settle"
        );
        ctx.delay.sleep(poll_interval).await;
    }
}

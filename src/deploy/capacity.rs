// ABOUTME: Capacity changes for a service, with or without an autoscaling target.
// ABOUTME: Scale-up mirrors bounds before the count; scale-down sets the count before the bounds.

use crate::platform::{CapacityBounds, ScalingOps, ServiceOps, ServiceUpdate};
use crate::types::{ResourceId, ServiceName};

use super::{DeployContext, DeployError};

/// Bounds of the service's scalable target, or `None` when it is not autoscaled.
pub async fn probe_bounds<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
) -> Result<Option<CapacityBounds>, DeployError>
where
    P: ScalingOps + ?Sized,
    D: ?Sized,
{
    let resource = ResourceId::for_service(ctx.cluster, service.as_str());
    let bounds = ctx.platform.describe_scalable_target(&resource).await?;

    match bounds {
        Some(b) => tracing::info!(
            service = %service,
            min = b.min,
            max = b.max,
            "service uses application autoscaling"
        ),
        None => tracing::debug!(service = %service, "service has no scalable target"),
    }

    Ok(bounds)
}

/// Raise `service` to `desired` tasks.
///
/// With bounds, the scalable target is registered first so autoscaling
/// does not immediately pull the count back down.
pub async fn scale_up<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
    desired: u32,
    bounds: Option<CapacityBounds>,
) -> Result<(), DeployError>
where
    P: ServiceOps + ScalingOps + ?Sized,
    D: ?Sized,
{
    if let Some(bounds) = bounds {
        let resource = ResourceId::for_service(ctx.cluster, service.as_str());
        tracing::info!(
            service = %service,
            min = bounds.min,
            max = bounds.max,
            "setting autoscaling bounds"
        );
        ctx.platform
            .register_scalable_target(&resource, bounds)
            .await?;
    }

    set_desired(ctx, service, desired).await
}

/// Lower `service` to `desired` tasks, then cap its scalable target at `max`.
pub async fn scale_down<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
    desired: u32,
    max: u32,
    uses_autoscaling: bool,
) -> Result<(), DeployError>
where
    P: ServiceOps + ScalingOps + ?Sized,
    D: ?Sized,
{
    set_desired(ctx, service, desired).await?;

    if uses_autoscaling {
        let resource = ResourceId::for_service(ctx.cluster, service.as_str());
        tracing::info!(service = %service, max, "setting autoscaling max capacity");
        ctx.platform
            .register_scalable_target(&resource, CapacityBounds::new(0, max))
            .await?;
    }

    Ok(())
}

async fn set_desired<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
    desired: u32,
) -> Result<(), DeployError>
where
    P: ServiceOps + ?Sized,
    D: ?Sized,
{
    tracing::info!(service = %service, target = desired, "setting desired count");
    ctx.platform
        .update_service(ctx.cluster, service, &ServiceUpdate::desired_count(desired))
        .await?;
    Ok(())
}

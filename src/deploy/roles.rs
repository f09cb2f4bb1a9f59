// ABOUTME: Active/idle role resolution for a blue/green service pair.
// ABOUTME: The service with desired count 0 is idle; any other combination is a reconcile error.

use serde::Serialize;

use crate::platform::ServiceOps;
use crate::types::ServiceName;

use super::{DeployContext, DeployError};

/// Which of the two services currently takes traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roles {
    pub active: ServiceName,
    pub idle: ServiceName,
    /// Desired count of the active service when roles were resolved.
    pub active_count: u32,
}

/// Decide roles from two (name, desired count) pairs.
///
/// Symmetric: swapping the arguments yields the same roles.
pub fn assign_roles(first: (&ServiceName, u32), second: (&ServiceName, u32)) -> Result<Roles, DeployError> {
    let ((first_name, first_count), (second_name, second_count)) = (first, second);

    match (first_count, second_count) {
        (0, n) if n > 0 => Ok(Roles {
            active: second_name.clone(),
            idle: first_name.clone(),
            active_count: n,
        }),
        (n, 0) if n > 0 => Ok(Roles {
            active: first_name.clone(),
            idle: second_name.clone(),
            active_count: n,
        }),
        _ => Err(DeployError::Reconcile {
            first: first_name.clone(),
            first_count,
            second: second_name.clone(),
            second_count,
        }),
    }
}

/// Read both services' desired counts and assign roles. Never mutates.
pub async fn resolve_roles<P, D>(
    ctx: &DeployContext<'_, P, D>,
    first: &ServiceName,
    second: &ServiceName,
) -> Result<Roles, DeployError>
where
    P: ServiceOps + ?Sized,
    D: ?Sized,
{
    let first_status = ctx.platform.describe_service(ctx.cluster, first).await?;
    let second_status = ctx.platform.describe_service(ctx.cluster, second).await?;

    tracing::info!(service = %first, desired = first_status.desired_count, "read desired count");
    tracing::info!(service = %second, desired = second_status.desired_count, "read desired count");

    let roles = assign_roles(
        (first, first_status.desired_count),
        (second, second_status.desired_count),
    )?;

    tracing::info!(active = %roles.active, idle = %roles.idle, "resolved service roles");
    Ok(roles)
}

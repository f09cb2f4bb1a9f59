// ABOUTME: Rolling release of one or more services sharing a task definition family.
// ABOUTME: Registers one revision, updates services in order, rolls back the first failure.

use nonempty::NonEmpty;
use serde::Serialize;

use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::{ServiceOps, ServiceUpdate, TaskDefinitionOps};
use crate::types::{DeploymentId, ImageRef, ServiceName, TaskDefinitionRef};

use super::template::{capture_current, patch_and_register};
use super::watcher::{ConvergenceMode, await_convergence};
use super::{Delay, DeployContext, DeployError, PollPolicy};

/// Inputs of a rolling release.
#[derive(Debug, Clone)]
pub struct RollingRelease {
    pub services: NonEmpty<ServiceName>,
    pub container: String,
    pub image: ImageRef,
    pub policy: PollPolicy,
    /// Restore the previous revision when a service fails to converge.
    pub rollback: bool,
}

/// A service that converged on the new revision.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasedService {
    pub service: ServiceName,
    pub deployment_id: DeploymentId,
}

/// Result of a successful rolling release.
#[derive(Debug, Clone, Serialize)]
pub struct RollingOutcome {
    pub revision: TaskDefinitionRef,
    pub released: Vec<ReleasedService>,
}

/// Run a rolling release, stopping at the first service that fails.
pub async fn run_rolling<P, D>(
    ctx: &DeployContext<'_, P, D>,
    release: &RollingRelease,
    diag: &mut Diagnostics,
) -> Result<RollingOutcome, DeployError>
where
    P: ServiceOps + TaskDefinitionOps + ?Sized,
    D: Delay + ?Sized,
{
    tracing::info!(
        cluster = ctx.cluster,
        services = release.services.len(),
        image = %release.image,
        "starting rolling release"
    );

    let current = capture_current(ctx.platform, ctx.cluster, release.services.first()).await?;
    let registered =
        patch_and_register(ctx.platform, &current, &release.container, &release.image).await?;
    let revision = registered.reference;

    let mut released = Vec::with_capacity(release.services.len());
    for service in release.services.iter() {
        let deployment_id = release_service(ctx, release, service, &revision, diag).await?;
        released.push(ReleasedService {
            service: service.clone(),
            deployment_id,
        });
    }

    Ok(RollingOutcome { revision, released })
}

/// Move one service to `revision`, rolling back on convergence failure.
async fn release_service<P, D>(
    ctx: &DeployContext<'_, P, D>,
    release: &RollingRelease,
    service: &ServiceName,
    revision: &TaskDefinitionRef,
    diag: &mut Diagnostics,
) -> Result<DeploymentId, DeployError>
where
    P: ServiceOps + ?Sized,
    D: Delay + ?Sized,
{
    // Captured before the update; rollback never re-derives it.
    let previous = ctx
        .platform
        .describe_service(ctx.cluster, service)
        .await?
        .task_definition;

    let deployment_id = ctx
        .platform
        .update_service(ctx.cluster, service, &ServiceUpdate::task_definition(revision.clone()))
        .await?;
    tracing::info!(service = %service, deployment = %deployment_id, "started deployment");

    let result = await_convergence(
        ctx,
        service,
        revision,
        &release.policy,
        ConvergenceMode::Rollout,
    )
    .await;

    let Err(err) = result else {
        return Ok(deployment_id);
    };

    if matches!(err, DeployError::Failed { .. }) {
        report_stopped_tasks(ctx, service, &deployment_id, diag).await;
    }

    if release.rollback {
        tracing::warn!(service = %service, target = %previous, error = %err, "rolling back");
        let restored = roll_back(ctx, release, service, &previous).await;
        if let Err(rollback_err) = restored {
            let failure = DeployError::Rollback {
                service: service.clone(),
                target: previous,
                reason: rollback_err.to_string(),
            };
            diag.warn(Warning::rollback(failure.to_string()));
        }
    }

    Err(err)
}

/// Record why the tasks of a failed deployment stopped.
async fn report_stopped_tasks<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
    deployment_id: &DeploymentId,
    diag: &mut Diagnostics,
) where
    P: ServiceOps + ?Sized,
    D: Delay + ?Sized,
{
    tracing::info!(service = %service, deployment = %deployment_id, "checking stopped tasks");

    match ctx.platform.list_stopped_tasks(ctx.cluster, deployment_id).await {
        Ok(tasks) => {
            for task in tasks {
                diag.warn(Warning::stopped_task(format!(
                    "{service}: task {} stopped: {}",
                    task.task_arn, task.stopped_reason
                )));
            }
        }
        Err(e) => {
            tracing::warn!(service = %service, error = %e, "could not list stopped tasks");
        }
    }
}

async fn roll_back<P, D>(
    ctx: &DeployContext<'_, P, D>,
    release: &RollingRelease,
    service: &ServiceName,
    previous: &TaskDefinitionRef,
) -> Result<(), DeployError>
where
    P: ServiceOps + ?Sized,
    D: Delay + ?Sized,
{
    let deployment_id = ctx
        .platform
        .update_service(ctx.cluster, service, &ServiceUpdate::task_definition(previous.clone()))
        .await?;
    tracing::info!(service = %service, deployment = %deployment_id, "started rollback deployment");

    await_convergence(
        ctx,
        service,
        previous,
        &release.policy,
        ConvergenceMode::Rollout,
    )
    .await?;

    tracing::info!(service = %service, target = %previous, "rollback converged");
    Ok(())
}

// ABOUTME: Blue/green cutover between two twin services as a type state machine.
// ABOUTME: Each transition consumes the previous state; failures after pointing idle return it for abort.

use std::time::Duration;

use serde::Serialize;

use crate::diagnostics::{Diagnostics, Warning};
use crate::platform::{ComputePlatform, ScalingOps, ServiceOps, ServiceUpdate, TaskDefinitionOps};
use crate::types::{ImageRef, ServiceName, TaskDefinitionRef};

use super::capacity::{probe_bounds, scale_down, scale_up};
use super::roles::{Roles, resolve_roles};
use super::scale_down::{ScaleDownSettings, scale_down_in_steps};
use super::state::{Completed, Converged, IdlePointed, Registered, Resolved, ScalingUp};
use super::template::{capture_current, patch_and_register};
use super::watcher::{ConvergenceMode, await_convergence};
use super::{Delay, DeployContext, DeployError, PollPolicy};

/// Result type for transitions that may need an abort on failure.
pub type TransitionResult<T, S> = Result<Cutover<T>, (Cutover<S>, DeployError)>;

/// A blue/green cutover in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Cutover<S> {
    roles: Roles,
    state: S,
}

/// Inputs of a blue/green release.
#[derive(Debug, Clone)]
pub struct BlueGreenRelease {
    pub blue: ServiceName,
    pub green: ServiceName,
    pub container: String,
    pub image: ImageRef,
    pub policy: PollPolicy,
    /// Pause after scaling idle up, before the first convergence check.
    pub settle_delay: Duration,
    /// Pause between convergence and the first scale-down step.
    pub cooldown: Duration,
    pub scale_down: ScaleDownSettings,
}

impl BlueGreenRelease {
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(45);
}

/// Result of a successful blue/green release.
#[derive(Debug, Clone, Serialize)]
pub struct BlueGreenOutcome {
    /// The service now serving traffic.
    pub live: ServiceName,
    /// The service scaled down to zero.
    pub retired: ServiceName,
    pub revision: TaskDefinitionRef,
}

impl<S> Cutover<S> {
    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    fn transition<T>(self, state: T) -> Cutover<T> {
        Cutover {
            roles: self.roles,
            state,
        }
    }

    /// Scale the idle service back to zero. A failure is recorded, never raised.
    async fn reset_idle<P, D>(
        &self,
        ctx: &DeployContext<'_, P, D>,
        autoscaled: bool,
        diag: &mut Diagnostics,
    ) where
        P: ServiceOps + ScalingOps + ?Sized,
        D: ?Sized,
    {
        let idle = &self.roles.idle;
        tracing::warn!(service = %idle, "scaling idle service back to zero");

        if let Err(e) = scale_down(ctx, idle, 0, 0, autoscaled).await {
            diag.warn(Warning::idle_reset(format!(
                "failed to scale {idle} back to zero: {e}"
            )));
        }
    }
}

// =============================================================================
// Start -> Resolved
// =============================================================================

impl Cutover<Resolved> {
    /// Work out which of the two services is active. Read-only.
    pub async fn resolve<P, D>(
        ctx: &DeployContext<'_, P, D>,
        blue: &ServiceName,
        green: &ServiceName,
    ) -> Result<Self, DeployError>
    where
        P: ServiceOps + ?Sized,
        D: ?Sized,
    {
        let roles = resolve_roles(ctx, blue, green).await?;
        Ok(Cutover {
            roles,
            state: Resolved,
        })
    }

    /// Register a new revision cloned from the active service's definition.
    #[must_use = "cutover state must be used"]
    pub async fn register<P, D>(
        self,
        ctx: &DeployContext<'_, P, D>,
        container: &str,
        image: &ImageRef,
    ) -> Result<Cutover<Registered>, DeployError>
    where
        P: ServiceOps + TaskDefinitionOps + ?Sized,
        D: ?Sized,
    {
        let current = capture_current(ctx.platform, ctx.cluster, &self.roles.active).await?;
        let registered = patch_and_register(ctx.platform, &current, container, image).await?;

        Ok(self.transition(Registered {
            revision: registered.reference,
        }))
    }
}

// =============================================================================
// Registered -> IdlePointed
// =============================================================================

impl Cutover<Registered> {
    /// Point the idle service at the new revision without changing its count.
    #[must_use = "cutover state must be used"]
    pub async fn point_idle<P, D>(
        self,
        ctx: &DeployContext<'_, P, D>,
    ) -> Result<Cutover<IdlePointed>, DeployError>
    where
        P: ServiceOps + ?Sized,
        D: ?Sized,
    {
        let update = ServiceUpdate::task_definition(self.state.revision.clone());
        ctx.platform
            .update_service(ctx.cluster, &self.roles.idle, &update)
            .await?;

        tracing::info!(
            service = %self.roles.idle,
            revision = %self.state.revision,
            "idle service points at new revision"
        );

        let revision = self.state.revision.clone();
        Ok(self.transition(IdlePointed {
            revision,
            autoscaled: false,
        }))
    }
}

// =============================================================================
// IdlePointed -> ScalingUp
// =============================================================================

impl Cutover<IdlePointed> {
    /// Mirror the active service's capacity onto idle, then wait `settle`.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)` on failure so the caller can abort.
    #[must_use = "cutover state must be used"]
    pub async fn scale_up<P, D>(
        self,
        ctx: &DeployContext<'_, P, D>,
        settle: Duration,
    ) -> TransitionResult<ScalingUp, IdlePointed>
    where
        P: ServiceOps + ScalingOps + ?Sized,
        D: Delay + ?Sized,
    {
        let bounds = match probe_bounds(ctx, &self.roles.active).await {
            Ok(bounds) => bounds,
            Err(e) => return Err((self, e)),
        };

        let desired = self.roles.active_count;
        if let Err(e) = scale_up(ctx, &self.roles.idle, desired, bounds).await {
            let state = IdlePointed {
                revision: self.state.revision.clone(),
                autoscaled: bounds.is_some(),
            };
            return Err((self.transition(state), e));
        }

        tracing::info!(
            service = %self.roles.idle,
            target = desired,
            settle_secs = settle.as_secs(),
            "waiting for the scheduler to place tasks"
        );
        ctx.delay.sleep(settle).await;

        let revision = self.state.revision.clone();
        Ok(self.transition(ScalingUp { revision, bounds }))
    }

    /// Give up: scale idle back to zero, leaving the active service alone.
    pub async fn abort<P, D>(self, ctx: &DeployContext<'_, P, D>, diag: &mut Diagnostics)
    where
        P: ServiceOps + ScalingOps + ?Sized,
        D: ?Sized,
    {
        self.reset_idle(ctx, self.state.autoscaled, diag).await;
    }
}

// =============================================================================
// ScalingUp -> Converged
// =============================================================================

impl Cutover<ScalingUp> {
    /// Poll idle until it has converged for the required number of checks.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)` on timeout or platform failure so the caller can abort.
    #[must_use = "cutover state must be used"]
    pub async fn await_convergence<P, D>(
        self,
        ctx: &DeployContext<'_, P, D>,
        policy: &PollPolicy,
    ) -> TransitionResult<Converged, ScalingUp>
    where
        P: ServiceOps + ?Sized,
        D: Delay + ?Sized,
    {
        let result = await_convergence(
            ctx,
            &self.roles.idle,
            &self.state.revision,
            policy,
            ConvergenceMode::Scaling,
        )
        .await;

        if let Err(e) = result {
            return Err((self, e));
        }

        let state = Converged {
            revision: self.state.revision.clone(),
            uses_autoscaling: self.state.bounds.is_some(),
            original_count: self.roles.active_count,
        };
        Ok(self.transition(state))
    }

    /// Give up: scale idle back to zero, leaving the active service alone.
    pub async fn abort<P, D>(self, ctx: &DeployContext<'_, P, D>, diag: &mut Diagnostics)
    where
        P: ServiceOps + ScalingOps + ?Sized,
        D: ?Sized,
    {
        self.reset_idle(ctx, self.state.bounds.is_some(), diag).await;
    }
}

// =============================================================================
// Converged -> Completed
// =============================================================================

impl Cutover<Converged> {
    /// Wait `cooldown`, then retire the previously active service in steps.
    ///
    /// Idle is serving by now, so a failure here is returned without an abort.
    #[must_use = "cutover state must be used"]
    pub async fn retire_active<P, D>(
        self,
        ctx: &DeployContext<'_, P, D>,
        cooldown: Duration,
        settings: &ScaleDownSettings,
    ) -> Result<Cutover<Completed>, DeployError>
    where
        P: ServiceOps + ScalingOps + ?Sized,
        D: Delay + ?Sized,
    {
        tracing::info!(
            live = %self.roles.idle,
            retiring = %self.roles.active,
            cooldown_secs = cooldown.as_secs(),
            "idle service converged"
        );
        ctx.delay.sleep(cooldown).await;

        let original = self.state.original_count;
        scale_down_in_steps(
            ctx,
            &self.roles.active,
            self.state.uses_autoscaling,
            settings,
            original,
            original,
        )
        .await?;

        let revision = self.state.revision.clone();
        Ok(self.transition(Completed { revision }))
    }

    pub fn original_count(&self) -> u32 {
        self.state.original_count
    }
}

// =============================================================================
// Completed - Terminal State
// =============================================================================

impl Cutover<Completed> {
    /// Consume the cutover. The retired service is the idle twin of the next run.
    pub fn finish(self) -> BlueGreenOutcome {
        BlueGreenOutcome {
            live: self.roles.idle,
            retired: self.roles.active,
            revision: self.state.revision,
        }
    }
}

/// Run a full blue/green release.
pub async fn run_blue_green<P, D>(
    ctx: &DeployContext<'_, P, D>,
    release: &BlueGreenRelease,
    diag: &mut Diagnostics,
) -> Result<BlueGreenOutcome, DeployError>
where
    P: ComputePlatform + ?Sized,
    D: Delay + ?Sized,
{
    tracing::info!(
        cluster = ctx.cluster,
        blue = %release.blue,
        green = %release.green,
        image = %release.image,
        "starting blue/green release"
    );

    let cutover = Cutover::<Resolved>::resolve(ctx, &release.blue, &release.green).await?;
    let cutover = cutover
        .register(ctx, &release.container, &release.image)
        .await?;
    let cutover = cutover.point_idle(ctx).await?;

    let cutover = match cutover.scale_up(ctx, release.settle_delay).await {
        Ok(next) => next,
        Err((failed, e)) => {
            failed.abort(ctx, diag).await;
            return Err(e);
        }
    };

    let cutover = match cutover.await_convergence(ctx, &release.policy).await {
        Ok(next) => next,
        Err((failed, e)) => {
            failed.abort(ctx, diag).await;
            return Err(e);
        }
    };

    let completed = cutover
        .retire_active(ctx, release.cooldown, &release.scale_down)
        .await?;
    Ok(completed.finish())
}

// ABOUTME: Error types for release orchestration.
// ABOUTME: Covers role reconciliation, template patching, convergence and rollback failures.

use crate::platform::PlatformError;
use crate::types::{ServiceName, TaskDefinitionRef};

/// Errors that end a release.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The blue/green pair is not in a state where exactly one side is idle.
    #[error(
        "cannot determine which service is active: {first} has {first_count} desired tasks, \
         {second} has {second_count}; exactly one of them must be 0"
    )]
    Reconcile {
        first: ServiceName,
        first_count: u32,
        second: ServiceName,
        second_count: u32,
    },

    /// The task definition has no container with the configured name.
    #[error("container '{container}' not found in task definition family '{family}'")]
    ContainerNotFound { container: String, family: String },

    /// A platform call failed; propagated unmodified.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The service never converged within the check budget.
    #[error("{service} did not converge after {checks} checks")]
    Timeout { service: ServiceName, checks: u32 },

    /// The platform reported the rollout as failed.
    #[error("deployment of {service} failed: {reason}")]
    Failed { service: ServiceName, reason: String },

    /// Restoring the previous revision failed.
    #[error("rollback of {service} to {target} failed: {reason}")]
    Rollback {
        service: ServiceName,
        target: TaskDefinitionRef,
        reason: String,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Reconcile,
    ContainerNotFound,
    Platform,
    Timeout,
    Failed,
    Rollback,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Reconcile { .. } => DeployErrorKind::Reconcile,
            DeployError::ContainerNotFound { .. } => DeployErrorKind::ContainerNotFound,
            DeployError::Platform(_) => DeployErrorKind::Platform,
            DeployError::Timeout { .. } => DeployErrorKind::Timeout,
            DeployError::Failed { .. } => DeployErrorKind::Failed,
            DeployError::Rollback { .. } => DeployErrorKind::Rollback,
        }
    }

    /// Timeouts and failed rollouts are handled the same way by every controller.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            DeployError::Timeout { .. } | DeployError::Failed { .. }
        )
    }
}

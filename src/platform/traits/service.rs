// ABOUTME: Service operations trait for the compute platform.
// ABOUTME: Describe a service, issue partial UpdateService requests, list stopped tasks.

use super::shared_types::{ServiceStatus, ServiceUpdate, StoppedTask};
use crate::platform::PlatformError;
use crate::types::{DeploymentId, ServiceName};
use async_trait::async_trait;

/// Read and mutate a long-running service.
#[async_trait]
pub trait ServiceOps: Send + Sync {
    /// Current counts, task definition and rollout state of a service.
    async fn describe_service(
        &self,
        cluster: &str,
        service: &ServiceName,
    ) -> Result<ServiceStatus, PlatformError>;

    /// Apply a partial update and return the ID of the resulting deployment.
    async fn update_service(
        &self,
        cluster: &str,
        service: &ServiceName,
        update: &ServiceUpdate,
    ) -> Result<DeploymentId, PlatformError>;

    /// Stopped tasks started by `deployment`, with the scheduler's reason.
    ///
    /// The platform forgets stopped tasks shortly after a rollout ends.
    async fn list_stopped_tasks(
        &self,
        cluster: &str,
        deployment: &DeploymentId,
    ) -> Result<Vec<StoppedTask>, PlatformError>;
}

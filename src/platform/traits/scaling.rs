// ABOUTME: Autoscaling operations trait.
// ABOUTME: Look up and register scalable targets for a service's desired count.

use super::shared_types::CapacityBounds;
use crate::platform::PlatformError;
use crate::types::ResourceId;
use async_trait::async_trait;

/// Application Auto Scaling operations on the ECS desired-count dimension.
#[async_trait]
pub trait ScalingOps: Send + Sync {
    /// Bounds of the scalable target, or `None` if the resource has none.
    async fn describe_scalable_target(
        &self,
        resource: &ResourceId,
    ) -> Result<Option<CapacityBounds>, PlatformError>;

    /// Create or update the scalable target with new bounds.
    async fn register_scalable_target(
        &self,
        resource: &ResourceId,
        bounds: CapacityBounds,
    ) -> Result<(), PlatformError>;
}

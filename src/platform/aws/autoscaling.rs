// ABOUTME: Scalable target operations over aws-sdk-applicationautoscaling.
// ABOUTME: Always targets the ecs namespace and the service DesiredCount dimension.

use async_trait::async_trait;
use aws_sdk_applicationautoscaling::types::{ScalableDimension, ServiceNamespace};

use super::{AwsPlatform, api_error, count_from_sdk, count_to_sdk};
use crate::platform::PlatformError;
use crate::platform::traits::{CapacityBounds, ScalingOps};
use crate::types::ResourceId;

#[async_trait]
impl ScalingOps for AwsPlatform {
    async fn describe_scalable_target(
        &self,
        resource: &ResourceId,
    ) -> Result<Option<CapacityBounds>, PlatformError> {
        let out = self
            .autoscaling
            .describe_scalable_targets()
            .service_namespace(ServiceNamespace::Ecs)
            .scalable_dimension(ScalableDimension::EcsServiceDesiredCount)
            .resource_ids(resource.as_str())
            .send()
            .await
            .map_err(api_error("DescribeScalableTargets"))?;

        // An empty list is the "no autoscaling" answer, not an error.
        Ok(out.scalable_targets().first().map(|target| {
            CapacityBounds::new(
                count_from_sdk(target.min_capacity()),
                count_from_sdk(target.max_capacity()),
            )
        }))
    }

    async fn register_scalable_target(
        &self,
        resource: &ResourceId,
        bounds: CapacityBounds,
    ) -> Result<(), PlatformError> {
        self.autoscaling
            .register_scalable_target()
            .service_namespace(ServiceNamespace::Ecs)
            .scalable_dimension(ScalableDimension::EcsServiceDesiredCount)
            .resource_id(resource.as_str())
            .min_capacity(count_to_sdk(bounds.min))
            .max_capacity(count_to_sdk(bounds.max))
            .send()
            .await
            .map_err(api_error("RegisterScalableTarget"))?;

        Ok(())
    }
}

// ABOUTME: Task definition clone-and-patch.
// ABOUTME: Captures a service's running definition and registers a copy with one image swapped.

use crate::platform::{ServiceOps, TaskDefinitionOps};
use crate::types::{ContainerSpec, ImageRef, ServiceName, TaskDefinition, TaskTemplate};

use super::DeployError;

/// Fetch the task definition a service is currently running.
pub async fn capture_current<P>(
    platform: &P,
    cluster: &str,
    service: &ServiceName,
) -> Result<TaskDefinition<P::Template>, DeployError>
where
    P: ServiceOps + TaskDefinitionOps + ?Sized,
{
    let status = platform.describe_service(cluster, service).await?;
    let definition = platform
        .describe_task_definition(&status.task_definition)
        .await?;

    tracing::debug!(
        service = %service,
        family = %definition.family,
        revision = definition.revision,
        "captured running task definition"
    );

    Ok(definition)
}

/// Copy `template`, replacing the image of the container named `container`.
///
/// Every other field and every sibling container is left as-is.
pub fn patch_container_image<T: TaskTemplate>(
    template: &T,
    container: &str,
    image: &ImageRef,
) -> Result<T, DeployError> {
    let mut patched = template.clone();
    let target = patched
        .containers_mut()
        .iter_mut()
        .find(|c| c.name() == container)
        .ok_or_else(|| DeployError::ContainerNotFound {
            container: container.to_string(),
            family: template.family().to_string(),
        })?;

    target.set_image(image.as_str());
    Ok(patched)
}

/// Patch `current` and register the result as a new revision.
///
/// No registration happens when the container is missing.
pub async fn patch_and_register<P>(
    platform: &P,
    current: &TaskDefinition<P::Template>,
    container: &str,
    image: &ImageRef,
) -> Result<TaskDefinition<P::Template>, DeployError>
where
    P: TaskDefinitionOps + ?Sized,
{
    let patched = patch_container_image(&current.template, container, image)?;
    let registered = platform.register_task_definition(&patched).await?;

    tracing::info!(
        family = %registered.family,
        revision = registered.revision,
        image = %image,
        "registered task definition revision"
    );

    Ok(registered)
}

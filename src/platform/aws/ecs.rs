// ABOUTME: ECS service and task definition operations over aws-sdk-ecs.
// ABOUTME: Native TaskDefinition bodies and their tags are patched in place so every field round-trips.

use async_trait::async_trait;
use aws_sdk_ecs::types::{
    ContainerDefinition, DeploymentRolloutState, DesiredStatus, Tag, TaskDefinition as EcsTaskDefinition,
    TaskDefinitionField,
};

use super::{AwsPlatform, api_error, count_from_sdk, count_to_sdk};
use crate::platform::error::ServiceNotFoundSnafu;
use crate::platform::traits::{
    RolloutState, ServiceOps, ServiceStatus, ServiceUpdate, StoppedTask, TaskDefinitionOps,
};
use crate::platform::PlatformError;
use crate::types::{
    ContainerSpec, DeploymentId, ServiceName, TaskDefinition, TaskDefinitionRef, TaskTemplate,
};

impl ContainerSpec for ContainerDefinition {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    fn image(&self) -> &str {
        self.image.as_deref().unwrap_or_default()
    }

    fn set_image(&mut self, image: &str) {
        self.image = Some(image.to_string());
    }
}

/// A native task definition plus the tags ECS reports beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct EcsTemplate {
    pub definition: EcsTaskDefinition,
    pub tags: Option<Vec<Tag>>,
}

impl TaskTemplate for EcsTemplate {
    type Container = ContainerDefinition;

    fn family(&self) -> &str {
        self.definition.family.as_deref().unwrap_or_default()
    }

    fn containers(&self) -> &[ContainerDefinition] {
        self.definition.container_definitions.as_deref().unwrap_or_default()
    }

    fn containers_mut(&mut self) -> &mut [ContainerDefinition] {
        self.definition
            .container_definitions
            .as_deref_mut()
            .unwrap_or_default()
    }
}

fn into_domain(
    operation: &'static str,
    definition: EcsTaskDefinition,
    tags: Option<Vec<Tag>>,
) -> Result<TaskDefinition<EcsTemplate>, PlatformError> {
    let reference = definition
        .task_definition_arn()
        .map(TaskDefinitionRef::new)
        .ok_or(PlatformError::MissingField {
            operation,
            field: "taskDefinition.taskDefinitionArn",
        })?;

    Ok(TaskDefinition {
        reference,
        family: definition.family().unwrap_or_default().to_string(),
        revision: count_from_sdk(definition.revision()),
        template: EcsTemplate { definition, tags },
    })
}

#[async_trait]
impl ServiceOps for AwsPlatform {
    async fn describe_service(
        &self,
        cluster: &str,
        service: &ServiceName,
    ) -> Result<ServiceStatus, PlatformError> {
        let out = self
            .ecs
            .describe_services()
            .cluster(cluster)
            .services(service.as_str())
            .send()
            .await
            .map_err(api_error("DescribeServices"))?;

        // Deleted services linger as INACTIVE for a while.
        let Some(svc) = out
            .services()
            .iter()
            .find(|s| s.status() != Some("INACTIVE"))
        else {
            return ServiceNotFoundSnafu {
                service: service.as_str(),
                cluster,
            }
            .fail();
        };

        let primary = svc
            .deployments()
            .iter()
            .find(|d| d.status() == Some("PRIMARY"))
            .or_else(|| svc.deployments().first());

        let rollout_state = match primary.and_then(|d| d.rollout_state()) {
            Some(DeploymentRolloutState::Completed) => RolloutState::Completed,
            Some(DeploymentRolloutState::Failed) => RolloutState::Failed,
            _ => RolloutState::InProgress,
        };

        let task_definition = svc
            .task_definition()
            .map(TaskDefinitionRef::new)
            .ok_or(PlatformError::MissingField {
                operation: "DescribeServices",
                field: "service.taskDefinition",
            })?;

        Ok(ServiceStatus {
            name: service.clone(),
            desired_count: count_from_sdk(svc.desired_count()),
            running_count: count_from_sdk(svc.running_count()),
            task_definition,
            rollout_state,
            failed_tasks: primary.map_or(0, |d| count_from_sdk(d.failed_tasks())),
            deployment_id: primary.and_then(|d| d.id()).map(DeploymentId::new),
        })
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &ServiceName,
        update: &ServiceUpdate,
    ) -> Result<DeploymentId, PlatformError> {
        let out = self
            .ecs
            .update_service()
            .cluster(cluster)
            .service(service.as_str())
            .set_task_definition(update.task_definition.as_ref().map(|r| r.to_string()))
            .set_desired_count(update.desired_count.map(count_to_sdk))
            .send()
            .await
            .map_err(api_error("UpdateService"))?;

        // The first deployment in the response is the one this call created.
        out.service()
            .and_then(|s| s.deployments().first())
            .and_then(|d| d.id())
            .map(DeploymentId::new)
            .ok_or(PlatformError::MissingField {
                operation: "UpdateService",
                field: "service.deployments[0].id",
            })
    }

    async fn list_stopped_tasks(
        &self,
        cluster: &str,
        deployment: &DeploymentId,
    ) -> Result<Vec<StoppedTask>, PlatformError> {
        let listed = self
            .ecs
            .list_tasks()
            .cluster(cluster)
            .desired_status(DesiredStatus::Stopped)
            .started_by(deployment.as_str())
            .send()
            .await
            .map_err(api_error("ListTasks"))?;

        // DescribeTasks rejects an empty task list.
        if listed.task_arns().is_empty() {
            return Ok(Vec::new());
        }

        let described = self
            .ecs
            .describe_tasks()
            .cluster(cluster)
            .set_tasks(Some(listed.task_arns().to_vec()))
            .send()
            .await
            .map_err(api_error("DescribeTasks"))?;

        Ok(described
            .tasks()
            .iter()
            .map(|task| StoppedTask {
                task_arn: task.task_arn().unwrap_or_default().to_string(),
                stopped_reason: task.stopped_reason().unwrap_or("unknown").to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl TaskDefinitionOps for AwsPlatform {
    type Template = EcsTemplate;

    async fn describe_task_definition(
        &self,
        reference: &TaskDefinitionRef,
    ) -> Result<TaskDefinition<EcsTemplate>, PlatformError> {
        let out = self
            .ecs
            .describe_task_definition()
            .task_definition(reference.as_str())
            .include(TaskDefinitionField::Tags)
            .send()
            .await
            .map_err(api_error("DescribeTaskDefinition"))?;

        let definition = out.task_definition().cloned().ok_or(PlatformError::MissingField {
            operation: "DescribeTaskDefinition",
            field: "taskDefinition",
        })?;

        // An untagged definition reports an empty list.
        let tags = Some(out.tags().to_vec()).filter(|t| !t.is_empty());
        into_domain("DescribeTaskDefinition", definition, tags)
    }

    async fn register_task_definition(
        &self,
        template: &EcsTemplate,
    ) -> Result<TaskDefinition<EcsTemplate>, PlatformError> {
        let EcsTemplate { definition: t, tags } = template.clone();
        // Every registrable field of the described revision is forwarded.
        // Read-only fields (ARN, revision, status, timestamps) are dropped.
        let out = self
            .ecs
            .register_task_definition()
            .set_family(t.family)
            .set_container_definitions(t.container_definitions)
            .set_task_role_arn(t.task_role_arn)
            .set_execution_role_arn(t.execution_role_arn)
            .set_network_mode(t.network_mode)
            .set_volumes(t.volumes)
            .set_placement_constraints(t.placement_constraints)
            .set_requires_compatibilities(t.requires_compatibilities)
            .set_cpu(t.cpu)
            .set_memory(t.memory)
            .set_pid_mode(t.pid_mode)
            .set_ipc_mode(t.ipc_mode)
            .set_proxy_configuration(t.proxy_configuration)
            .set_inference_accelerators(t.inference_accelerators)
            .set_ephemeral_storage(t.ephemeral_storage)
            .set_runtime_platform(t.runtime_platform)
            .set_enable_fault_injection(t.enable_fault_injection)
            .set_tags(tags.clone())
            .send()
            .await
            .map_err(api_error("RegisterTaskDefinition"))?;

        let definition = out.task_definition().cloned().ok_or(PlatformError::MissingField {
            operation: "RegisterTaskDefinition",
            field: "taskDefinition",
        })?;

        let tags = Some(out.tags().to_vec()).filter(|t| !t.is_empty()).or(tags);
        into_domain("RegisterTaskDefinition", definition, tags)
    }
}

// ABOUTME: Task definition operations trait for the compute platform.
// ABOUTME: Fetch a registered revision and register a new one from a template body.

use crate::platform::PlatformError;
use crate::types::{TaskDefinition, TaskDefinitionRef, TaskTemplate};
use async_trait::async_trait;

/// Task definition registry.
#[async_trait]
pub trait TaskDefinitionOps: Send + Sync {
    /// The platform's native task definition body.
    type Template: TaskTemplate + 'static;

    /// Fetch the full definition behind a reference.
    async fn describe_task_definition(
        &self,
        reference: &TaskDefinitionRef,
    ) -> Result<TaskDefinition<Self::Template>, PlatformError>;

    /// Register `template` as a new revision of its family.
    async fn register_task_definition(
        &self,
        template: &Self::Template,
    ) -> Result<TaskDefinition<Self::Template>, PlatformError>;
}

// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Phantom-typed IDs, service names, image references and task definition views.

mod color;
mod id;
mod image_ref;
mod service_name;
mod task_definition;

pub use color::Color;
pub use id::{DeploymentId, Id, ResourceId, TaskDefinitionRef};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use service_name::{ServiceName, ServiceNameError};
pub use task_definition::{
    ContainerSpec, JsonContainer, JsonTemplate, READ_ONLY_FIELDS, TaskDefinition, TaskTemplate,
};

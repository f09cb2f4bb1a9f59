// ABOUTME: Composable capability traits for the compute platform.
// ABOUTME: Defines ServiceOps, TaskDefinitionOps, ScalingOps, SecretOps and ComputePlatform.

mod scaling;
mod secrets;
mod service;
mod shared_types;
mod task_definition;

pub use scaling::ScalingOps;
pub use secrets::SecretOps;
pub use service::ServiceOps;
pub use shared_types::*;
pub use task_definition::TaskDefinitionOps;

/// Everything a release controller needs from the platform.
///
/// Implemented automatically for any type providing the three capabilities.
pub trait ComputePlatform: ServiceOps + TaskDefinitionOps + ScalingOps {}

impl<T: ServiceOps + TaskDefinitionOps + ScalingOps> ComputePlatform for T {}

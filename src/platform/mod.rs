// ABOUTME: Compute platform access: capability traits, errors and the AWS implementation.
// ABOUTME: Release controllers depend only on the traits; AwsPlatform satisfies them in production.

mod aws;
pub mod error;
pub mod traits;

pub use aws::{AwsPlatform, EcsTemplate};
pub use error::{PlatformError, PlatformErrorKind};
pub use traits::{
    CapacityBounds, ComputePlatform, RolloutState, ScalingOps, SecretOps, ServiceOps,
    ServiceStatus, ServiceUpdate, StoppedTask, TaskDefinitionOps,
};

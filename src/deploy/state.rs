// ABOUTME: Cutover state types for the blue/green type state pattern.
// ABOUTME: Each state carries only the data that exists once it has been reached.

use crate::platform::CapacityBounds;
use crate::types::TaskDefinitionRef;

/// Roles resolved; nothing has been mutated yet.
/// Available actions: `register()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolved;

/// New revision registered from the active service's definition.
/// Available actions: `point_idle()`
#[derive(Debug, Clone)]
pub struct Registered {
    pub(crate) revision: TaskDefinitionRef,
}

/// Idle service now runs the new revision, still at zero tasks.
/// Available actions: `scale_up()`, `abort()`
#[derive(Debug, Clone)]
pub struct IdlePointed {
    pub(crate) revision: TaskDefinitionRef,
    /// Whether the idle service's scalable target may have been touched.
    pub(crate) autoscaled: bool,
}

/// Idle service asked to run as many tasks as the active one.
/// Available actions: `await_convergence()`, `abort()`
#[derive(Debug, Clone)]
pub struct ScalingUp {
    pub(crate) revision: TaskDefinitionRef,
    pub(crate) bounds: Option<CapacityBounds>,
}

/// Idle service converged and is serving.
/// Available actions: `retire_active()`
#[derive(Debug, Clone)]
pub struct Converged {
    pub(crate) revision: TaskDefinitionRef,
    pub(crate) uses_autoscaling: bool,
    /// Active's desired count at the start; basis for scale-down steps.
    pub(crate) original_count: u32,
}

/// Previously active service retired to zero.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) revision: TaskDefinitionRef,
}

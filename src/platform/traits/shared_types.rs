// ABOUTME: Shared types used across platform trait definitions.
// ABOUTME: Service snapshots, partial updates, stopped tasks and capacity bounds.

use crate::types::{DeploymentId, ServiceName, TaskDefinitionRef};
use serde::Serialize;
use std::fmt;

/// Rollout state of a service's primary deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutState {
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for RolloutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RolloutState::InProgress => f.write_str("in_progress"),
            RolloutState::Completed => f.write_str("completed"),
            RolloutState::Failed => f.write_str("failed"),
        }
    }
}

/// Snapshot of a service as reported by `DescribeServices`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub name: ServiceName,
    pub desired_count: u32,
    pub running_count: u32,
    pub task_definition: TaskDefinitionRef,
    pub rollout_state: RolloutState,
    /// Failed tasks in the current rollout.
    pub failed_tasks: u32,
    /// ID of the primary deployment, when the platform reports one.
    pub deployment_id: Option<DeploymentId>,
}

impl ServiceStatus {
    /// Running count has caught up with desired count.
    pub fn is_settled(&self) -> bool {
        self.running_count == self.desired_count
    }
}

/// A task of a deployment that the scheduler stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoppedTask {
    pub task_arn: String,
    pub stopped_reason: String,
}

/// A partial `UpdateService` request. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUpdate {
    pub task_definition: Option<TaskDefinitionRef>,
    pub desired_count: Option<u32>,
}

impl ServiceUpdate {
    pub fn task_definition(reference: TaskDefinitionRef) -> Self {
        Self {
            task_definition: Some(reference),
            desired_count: None,
        }
    }

    pub fn desired_count(count: u32) -> Self {
        Self {
            task_definition: None,
            desired_count: Some(count),
        }
    }
}

/// Min/max capacity of an autoscaling scalable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityBounds {
    pub min: u32,
    pub max: u32,
}

impl CapacityBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

// ABOUTME: Phantom-typed identifiers for platform references.
// ABOUTME: Keeps task definition ARNs, deployment IDs and scaling resources apart at compile time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Empty enums cannot be instantiated and need no trait bounds.
pub enum TaskDefinitionMarker {}
pub enum DeploymentMarker {}
pub enum ScalableResourceMarker {}

/// An opaque platform identifier tagged with the kind of thing it names.
///
/// Passing a `DeploymentId` where a `TaskDefinitionRef` is expected is a
/// compile error rather than a silently wrong `UpdateService` call.
#[must_use = "identifiers reference platform resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// Manual impls: T is only a marker and implements nothing.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// A task definition ARN (or `family:revision`).
pub type TaskDefinitionRef = Id<TaskDefinitionMarker>;
/// The ID of an ECS service deployment created by `UpdateService`.
pub type DeploymentId = Id<DeploymentMarker>;
/// An Application Auto Scaling resource ID.
pub type ResourceId = Id<ScalableResourceMarker>;

impl ResourceId {
    /// Resource ID of the desired-count dimension of an ECS service.
    ///
    /// `service` may be a service ARN; only its trailing name is used.
    pub fn for_service(cluster: &str, service: &str) -> Self {
        let name = service.rsplit('/').next().unwrap_or(service);
        Self::new(format!("service/{cluster}/{name}"))
    }
}

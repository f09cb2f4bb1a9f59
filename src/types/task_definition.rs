// ABOUTME: Platform-neutral view of a registered task definition.
// ABOUTME: Bodies stay opaque behind TaskTemplate so unknown fields survive a clone-and-patch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::TaskDefinitionRef;

/// A single container entry inside a task definition body.
pub trait ContainerSpec: Clone + Send + Sync {
    fn name(&self) -> &str;
    fn image(&self) -> &str;
    fn set_image(&mut self, image: &str);
}

/// The registrable body of a task definition.
///
/// Implementations own every field the platform knows about; the deploy
/// logic only ever touches the container list.
pub trait TaskTemplate: Clone + Send + Sync {
    type Container: ContainerSpec;

    fn family(&self) -> &str;
    fn containers(&self) -> &[Self::Container];
    fn containers_mut(&mut self) -> &mut [Self::Container];
}

/// A registered, immutable task definition revision.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition<T> {
    pub reference: TaskDefinitionRef,
    pub family: String,
    pub revision: u32,
    pub template: T,
}

impl<T: TaskTemplate> TaskDefinition<T> {
    pub fn container(&self, name: &str) -> Option<&T::Container> {
        self.template.containers().iter().find(|c| c.name() == name)
    }
}

// =============================================================================
// JSON representation
// =============================================================================

/// Task definition body in the JSON shape used by the ECS API and CLI.
///
/// Everything except `family` and `containerDefinitions` is carried in
/// `settings` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTemplate {
    pub family: String,
    pub container_definitions: Vec<JsonContainer>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// A container definition with name and image lifted out of the field bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonContainer {
    pub name: String,
    pub image: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JsonContainer {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            fields: Map::new(),
        }
    }
}

impl ContainerSpec for JsonContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn set_image(&mut self, image: &str) {
        self.image = image.to_string();
    }
}

impl TaskTemplate for JsonTemplate {
    type Container = JsonContainer;

    fn family(&self) -> &str {
        &self.family
    }

    fn containers(&self) -> &[JsonContainer] {
        &self.container_definitions
    }

    fn containers_mut(&mut self) -> &mut [JsonContainer] {
        &mut self.container_definitions
    }
}

/// Fields `DescribeTaskDefinition` returns that `RegisterTaskDefinition` rejects.
pub const READ_ONLY_FIELDS: &[&str] = &[
    "taskDefinitionArn",
    "revision",
    "status",
    "requiresAttributes",
    "compatibilities",
    "registeredAt",
    "registeredBy",
    "deregisteredAt",
];

impl JsonTemplate {
    /// Parse either a bare task definition or a `describe-task-definition`
    /// response wrapping it under `taskDefinition`.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        let mut value: Value = serde_json::from_str(input)?;
        if let Some(inner) = value.get_mut("taskDefinition").map(Value::take) {
            value = inner;
        }
        serde_json::from_value(value)
    }

    /// Drop platform-assigned fields so the body can be registered again.
    pub fn strip_read_only(&mut self) {
        for field in READ_ONLY_FIELDS {
            self.settings.remove(*field);
        }
    }
}

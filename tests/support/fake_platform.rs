// ABOUTME: In-memory stand-in for ECS, Application Auto Scaling and Secrets Manager.
// ABOUTME: Records every call and serves scripted observations so release flows are deterministic.

use async_trait::async_trait;
use ecs_release::deploy::{Delay, DeployContext};
use ecs_release::platform::{
    CapacityBounds, PlatformError, RolloutState, ScalingOps, SecretOps, ServiceOps, ServiceStatus,
    ServiceUpdate, StoppedTask, TaskDefinitionOps,
};
use ecs_release::types::{
    DeploymentId, JsonContainer, JsonTemplate, ResourceId, ServiceName, TaskDefinition,
    TaskDefinitionRef,
};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub const CLUSTER: &str = "prod";
pub const CONTAINER: &str = "app";

pub fn service(name: &str) -> ServiceName {
    ServiceName::new(name).unwrap()
}

/// A two-container web task definition: `app` plus an `envoy` sidecar.
pub fn web_template(family: &str, image: &str) -> JsonTemplate {
    let mut app = JsonContainer::new(CONTAINER, image);
    app.fields.insert("essential".into(), json!(true));
    app.fields
        .insert("portMappings".into(), json!([{ "containerPort": 8080 }]));

    let mut sidecar = JsonContainer::new("envoy", "envoyproxy/envoy:v1.29");
    sidecar.fields.insert("essential".into(), json!(false));

    let mut settings = Map::new();
    settings.insert("cpu".into(), Value::String("256".into()));
    settings.insert("memory".into(), Value::String("512".into()));
    settings.insert("networkMode".into(), Value::String("awsvpc".into()));

    JsonTemplate {
        family: family.to_string(),
        container_definitions: vec![app, sidecar],
        settings,
    }
}

/// What a single `describe_service` reports beyond desired count and task definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Running equals desired and the rollout completed.
    Settled,
    /// One task short of desired, rollout in progress.
    Pending,
    /// Tasks failed to start during the rollout.
    FailedTasks(u32),
    /// The rollout itself reports failure.
    RolloutFailed,
}

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DescribeService(String),
    UpdateService { service: String, update: ServiceUpdate },
    DescribeTaskDefinition(String),
    RegisterTaskDefinition(String),
    DescribeScalableTarget(String),
    RegisterScalableTarget { resource: String, bounds: CapacityBounds },
    GetSecretValue(String),
    ListStoppedTasks(String),
}

#[derive(Debug, Clone)]
struct FakeService {
    desired: u32,
    task_definition: TaskDefinitionRef,
    stalled: bool,
    observations: VecDeque<Observation>,
    scripts: VecDeque<Vec<Observation>>,
    updates: usize,
    fail_on_update: Option<(usize, String)>,
}

#[derive(Default)]
struct State {
    services: HashMap<String, FakeService>,
    definitions: HashMap<String, TaskDefinition<JsonTemplate>>,
    targets: HashMap<String, CapacityBounds>,
    secrets: HashMap<String, String>,
    stopped_tasks: HashMap<String, Vec<StoppedTask>>,
    calls: Vec<Call>,
    deployments: u32,
}

/// Deterministic platform fake. Services converge on the first check unless scripted.
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registered revision without recording a call.
    pub fn add_task_definition(&self, template: JsonTemplate) -> TaskDefinitionRef {
        let mut state = self.state.lock();
        store_definition(&mut state, template).reference
    }

    /// Seed a service running `task_definition` at `desired` tasks.
    pub fn add_service(&self, name: &str, desired: u32, task_definition: &TaskDefinitionRef) {
        self.state.lock().services.insert(
            name.to_string(),
            FakeService {
                desired,
                task_definition: task_definition.clone(),
                stalled: false,
                observations: VecDeque::new(),
                scripts: VecDeque::new(),
                updates: 0,
                fail_on_update: None,
            },
        );
    }

    pub fn set_scalable_target(&self, name: &str, bounds: CapacityBounds) {
        let resource = ResourceId::for_service(CLUSTER, name);
        self.state
            .lock()
            .targets
            .insert(resource.into_inner(), bounds);
    }

    pub fn set_secret(&self, id: &str, value: &str) {
        self.state
            .lock()
            .secrets
            .insert(id.to_string(), value.to_string());
    }

    /// Report `(task_arn, reason)` pairs as the stopped tasks of `deployment`.
    pub fn stop_tasks(&self, deployment: &str, tasks: &[(&str, &str)]) {
        self.state.lock().stopped_tasks.insert(
            deployment.to_string(),
            tasks
                .iter()
                .map(|(arn, reason)| StoppedTask {
                    task_arn: arn.to_string(),
                    stopped_reason: reason.to_string(),
                })
                .collect(),
        );
    }

    /// Never converge: every unscripted check reports `Pending`.
    pub fn stall(&self, name: &str) {
        self.with_service(name, |s| s.stalled = true);
    }

    /// Serve these observations on the next checks, starting now.
    pub fn observe(&self, name: &str, observations: &[Observation]) {
        self.with_service(name, |s| s.observations.extend(observations.iter().copied()));
    }

    /// Serve these observations once the next `update_service` lands.
    pub fn observe_after_update(&self, name: &str, observations: &[Observation]) {
        self.with_service(name, |s| s.scripts.push_back(observations.to_vec()));
    }

    /// Reject the `nth` (1-based) update of this service.
    pub fn fail_update(&self, name: &str, nth: usize, message: &str) {
        self.with_service(name, |s| s.fail_on_update = Some((nth, message.to_string())));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Every update issued against `name`, in order.
    pub fn updates(&self, name: &str) -> Vec<ServiceUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::UpdateService { service, update } if service == name => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn registrations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::RegisterTaskDefinition(_)))
            .count()
    }

    pub fn describe_count(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::DescribeService(s) if s == name))
            .count()
    }

    /// True when nothing but reads has been issued.
    pub fn is_untouched(&self) -> bool {
        self.calls().iter().all(|c| {
            matches!(
                c,
                Call::DescribeService(_)
                    | Call::DescribeTaskDefinition(_)
                    | Call::DescribeScalableTarget(_)
                    | Call::GetSecretValue(_)
                    | Call::ListStoppedTasks(_)
            )
        })
    }

    pub fn desired_count(&self, name: &str) -> u32 {
        self.state.lock().services[name].desired
    }

    pub fn task_definition_of(&self, name: &str) -> TaskDefinitionRef {
        self.state.lock().services[name].task_definition.clone()
    }

    pub fn scalable_target(&self, name: &str) -> Option<CapacityBounds> {
        let resource = ResourceId::for_service(CLUSTER, name);
        self.state.lock().targets.get(resource.as_str()).copied()
    }

    pub fn definition(&self, reference: &TaskDefinitionRef) -> TaskDefinition<JsonTemplate> {
        self.state.lock().definitions[reference.as_str()].clone()
    }

    fn with_service(&self, name: &str, f: impl FnOnce(&mut FakeService)) {
        let mut state = self.state.lock();
        let service = state
            .services
            .get_mut(name)
            .unwrap_or_else(|| panic!("unknown fake service {name}"));
        f(service);
    }
}

fn store_definition(state: &mut State, template: JsonTemplate) -> TaskDefinition<JsonTemplate> {
    let revision = state
        .definitions
        .values()
        .filter(|d| d.family == template.family)
        .map(|d| d.revision)
        .max()
        .unwrap_or(0)
        + 1;
    let reference = TaskDefinitionRef::new(format!(
        "arn:aws:ecs:us-east-1:123456789012:task-definition/{}:{revision}",
        template.family
    ));
    let definition = TaskDefinition {
        reference: reference.clone(),
        family: template.family.clone(),
        revision,
        template,
    };
    state
        .definitions
        .insert(reference.into_inner(), definition.clone());
    definition
}

#[async_trait]
impl ServiceOps for FakePlatform {
    async fn describe_service(
        &self,
        cluster: &str,
        service: &ServiceName,
    ) -> Result<ServiceStatus, PlatformError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::DescribeService(service.to_string()));

        let Some(fake) = state.services.get_mut(service.as_str()) else {
            return Err(PlatformError::ServiceNotFound {
                service: service.to_string(),
                cluster: cluster.to_string(),
            });
        };

        let observation = fake.observations.pop_front().unwrap_or(if fake.stalled {
            Observation::Pending
        } else {
            Observation::Settled
        });

        let desired = fake.desired;
        let (running, rollout_state, failed_tasks) = match observation {
            Observation::Settled => (desired, RolloutState::Completed, 0),
            Observation::Pending => (desired.saturating_sub(1), RolloutState::InProgress, 0),
            Observation::FailedTasks(n) => (desired.saturating_sub(1), RolloutState::InProgress, n),
            Observation::RolloutFailed => (desired.saturating_sub(1), RolloutState::Failed, 0),
        };

        Ok(ServiceStatus {
            name: service.clone(),
            desired_count: desired,
            running_count: running,
            task_definition: fake.task_definition.clone(),
            rollout_state,
            failed_tasks,
            deployment_id: None,
        })
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &ServiceName,
        update: &ServiceUpdate,
    ) -> Result<DeploymentId, PlatformError> {
        let mut state = self.state.lock();
        state.calls.push(Call::UpdateService {
            service: service.to_string(),
            update: update.clone(),
        });
        state.deployments += 1;
        let deployment = DeploymentId::new(format!("ecs-svc/{}", state.deployments));

        let Some(fake) = state.services.get_mut(service.as_str()) else {
            return Err(PlatformError::ServiceNotFound {
                service: service.to_string(),
                cluster: cluster.to_string(),
            });
        };

        fake.updates += 1;
        if let Some((nth, message)) = &fake.fail_on_update
            && *nth == fake.updates
        {
            return Err(PlatformError::api("UpdateService", message.clone()));
        }

        if let Some(task_definition) = &update.task_definition {
            fake.task_definition = task_definition.clone();
        }
        if let Some(desired) = update.desired_count {
            fake.desired = desired;
        }
        if let Some(script) = fake.scripts.pop_front() {
            fake.observations = script.into();
        }

        Ok(deployment)
    }

    async fn list_stopped_tasks(
        &self,
        _cluster: &str,
        deployment: &DeploymentId,
    ) -> Result<Vec<StoppedTask>, PlatformError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::ListStoppedTasks(deployment.to_string()));
        Ok(state
            .stopped_tasks
            .get(deployment.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TaskDefinitionOps for FakePlatform {
    type Template = JsonTemplate;

    async fn describe_task_definition(
        &self,
        reference: &TaskDefinitionRef,
    ) -> Result<TaskDefinition<JsonTemplate>, PlatformError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::DescribeTaskDefinition(reference.to_string()));
        state
            .definitions
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| PlatformError::api("DescribeTaskDefinition", "unknown task definition"))
    }

    async fn register_task_definition(
        &self,
        template: &JsonTemplate,
    ) -> Result<TaskDefinition<JsonTemplate>, PlatformError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::RegisterTaskDefinition(template.family.clone()));
        Ok(store_definition(&mut state, template.clone()))
    }
}

#[async_trait]
impl ScalingOps for FakePlatform {
    async fn describe_scalable_target(
        &self,
        resource: &ResourceId,
    ) -> Result<Option<CapacityBounds>, PlatformError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::DescribeScalableTarget(resource.to_string()));
        Ok(state.targets.get(resource.as_str()).copied())
    }

    async fn register_scalable_target(
        &self,
        resource: &ResourceId,
        bounds: CapacityBounds,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        state.calls.push(Call::RegisterScalableTarget {
            resource: resource.to_string(),
            bounds,
        });
        state.targets.insert(resource.to_string(), bounds);
        Ok(())
    }
}

#[async_trait]
impl SecretOps for FakePlatform {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, PlatformError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::GetSecretValue(secret_id.to_string()));
        state
            .secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| PlatformError::api("GetSecretValue", "secret not found"))
    }
}

/// A delay that returns at once and remembers what it was asked to wait.
#[derive(Default)]
pub struct RecordingDelay {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

pub fn context<'a>(
    platform: &'a FakePlatform,
    delay: &'a RecordingDelay,
) -> DeployContext<'a, FakePlatform, RecordingDelay> {
    DeployContext::new(platform, delay, CLUSTER)
}

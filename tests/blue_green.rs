// ABOUTME: Integration tests for the blue/green cutover state machine.
// ABOUTME: Covers role resolution, capacity mirroring, stepwise retirement and aborts.

mod support;

use ecs_release::deploy::{
    BlueGreenRelease, Cutover, DeployErrorKind, PollPolicy, Resolved, ScaleDownSettings,
    run_blue_green,
};
use ecs_release::diagnostics::{Diagnostics, WarningKind};
use ecs_release::platform::{CapacityBounds, ServiceUpdate};
use ecs_release::types::{ImageRef, TaskDefinitionRef};
use std::time::Duration;
use support::fake_platform::{
    CONTAINER, Call, FakePlatform, RecordingDelay, context, service, web_template,
};

const BLUE: &str = "web-blue";
const GREEN: &str = "web-green";

fn setup(blue_count: u32, green_count: u32) -> (FakePlatform, TaskDefinitionRef) {
    support::init_tracing();
    let platform = FakePlatform::new();
    let current = platform.add_task_definition(web_template("web", "registry.example.com/web:1.0"));
    platform.add_service(BLUE, blue_count, &current);
    platform.add_service(GREEN, green_count, &current);
    (platform, current)
}

fn release(max_checks: u32, checks_to_pass: u32) -> BlueGreenRelease {
    BlueGreenRelease {
        blue: service(BLUE),
        green: service(GREEN),
        container: CONTAINER.to_string(),
        image: ImageRef::parse("registry.example.com/web:2.0").unwrap(),
        policy: PollPolicy::new(Duration::from_secs(10), max_checks, checks_to_pass),
        settle_delay: Duration::from_secs(45),
        cooldown: Duration::from_secs(120),
        scale_down: ScaleDownSettings {
            percent: 50,
            step_interval: Duration::from_secs(30),
            poll_interval: Duration::from_secs(15),
        },
    }
}

fn register_calls(platform: &FakePlatform) -> Vec<(String, CapacityBounds)> {
    platform
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::RegisterScalableTarget { resource, bounds } => Some((resource, bounds)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn cuts_over_to_idle_and_retires_active_in_steps() {
    let (platform, _) = setup(4, 0);
    platform.set_scalable_target(BLUE, CapacityBounds::new(2, 8));
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    let outcome = run_blue_green(&context(&platform, &delay), &release(5, 2), &mut diag)
        .await
        .unwrap();

    assert_eq!(outcome.live.as_str(), GREEN);
    assert_eq!(outcome.retired.as_str(), BLUE);
    assert!(outcome.revision.as_str().ends_with("web:2"));

    assert_eq!(
        platform.updates(GREEN),
        vec![
            ServiceUpdate::task_definition(outcome.revision.clone()),
            ServiceUpdate::desired_count(4),
        ]
    );
    assert_eq!(
        platform.updates(BLUE),
        vec![
            ServiceUpdate::desired_count(2),
            ServiceUpdate::desired_count(0)
        ]
    );

    assert_eq!(
        register_calls(&platform),
        vec![
            ("service/prod/web-green".to_string(), CapacityBounds::new(2, 8)),
            ("service/prod/web-blue".to_string(), CapacityBounds::new(0, 2)),
            ("service/prod/web-blue".to_string(), CapacityBounds::new(0, 0)),
        ]
    );

    // settle, one poll between two passing checks, cooldown, one step interval
    assert_eq!(
        delay.sleeps(),
        vec![
            Duration::from_secs(45),
            Duration::from_secs(10),
            Duration::from_secs(120),
            Duration::from_secs(30),
        ]
    );
    assert!(!diag.has_warnings());
}

#[tokio::test]
async fn scalable_target_is_registered_before_the_count_is_raised() {
    let (platform, _) = setup(3, 0);
    platform.set_scalable_target(BLUE, CapacityBounds::new(1, 6));
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    run_blue_green(&context(&platform, &delay), &release(5, 1), &mut diag)
        .await
        .unwrap();

    let calls = platform.calls();
    let register = calls
        .iter()
        .position(|c| {
            matches!(c, Call::RegisterScalableTarget { resource, .. } if resource.ends_with(GREEN))
        })
        .unwrap();
    let raise = calls
        .iter()
        .position(|c| {
            matches!(c, Call::UpdateService { service, update }
                if service == GREEN && update.desired_count == Some(3))
        })
        .unwrap();
    assert!(register < raise);
}

#[tokio::test]
async fn green_active_makes_blue_the_new_live_service() {
    let (platform, _) = setup(0, 3);
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    let outcome = run_blue_green(&context(&platform, &delay), &release(5, 1), &mut diag)
        .await
        .unwrap();

    assert_eq!(outcome.live.as_str(), BLUE);
    assert_eq!(platform.desired_count(BLUE), 3);
    assert_eq!(platform.desired_count(GREEN), 0);
    assert!(register_calls(&platform).is_empty());
}

#[tokio::test]
async fn timeout_scales_idle_back_and_leaves_active_alone() {
    let (platform, _) = setup(4, 0);
    platform.set_scalable_target(BLUE, CapacityBounds::new(2, 8));
    platform.stall(GREEN);
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    let err = run_blue_green(&context(&platform, &delay), &release(2, 1), &mut diag)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Timeout);
    assert!(platform.updates(BLUE).is_empty());
    assert_eq!(platform.desired_count(BLUE), 4);
    assert_eq!(platform.scalable_target(BLUE), Some(CapacityBounds::new(2, 8)));

    assert_eq!(platform.desired_count(GREEN), 0);
    assert_eq!(platform.scalable_target(GREEN), Some(CapacityBounds::new(0, 0)));
    assert!(!diag.has_warnings());
}

#[tokio::test]
async fn abort_without_autoscaling_only_resets_the_count() {
    let (platform, _) = setup(4, 0);
    platform.stall(GREEN);
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    run_blue_green(&context(&platform, &delay), &release(1, 1), &mut diag)
        .await
        .unwrap_err();

    let updates = platform.updates(GREEN);
    assert_eq!(updates.len(), 3);
    assert_eq!(updates[2], ServiceUpdate::desired_count(0));
    assert!(register_calls(&platform).is_empty());
}

#[tokio::test]
async fn failed_scale_up_still_resets_idle() {
    let (platform, _) = setup(4, 0);
    platform.set_scalable_target(BLUE, CapacityBounds::new(2, 8));
    platform.fail_update(GREEN, 2, "insufficient capacity");
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    let err = run_blue_green(&context(&platform, &delay), &release(5, 1), &mut diag)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Platform);
    assert!(err.to_string().contains("insufficient capacity"));
    assert_eq!(platform.desired_count(GREEN), 0);
    assert_eq!(platform.scalable_target(GREEN), Some(CapacityBounds::new(0, 0)));
    assert!(platform.updates(BLUE).is_empty());
}

#[tokio::test]
async fn failed_idle_reset_is_a_warning() {
    let (platform, _) = setup(4, 0);
    platform.stall(GREEN);
    platform.fail_update(GREEN, 3, "throttled");
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    let err = run_blue_green(&context(&platform, &delay), &release(1, 1), &mut diag)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Timeout);
    let warnings = diag.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::IdleReset);
    assert!(warnings[0].message.contains(GREEN));
}

#[tokio::test]
async fn both_services_running_is_a_reconcile_error_without_mutation() {
    let (platform, _) = setup(2, 3);
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    let err = run_blue_green(&context(&platform, &delay), &release(5, 1), &mut diag)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Reconcile);
    assert_eq!(
        platform.calls(),
        vec![
            Call::DescribeService(BLUE.to_string()),
            Call::DescribeService(GREEN.to_string()),
        ]
    );
}

#[tokio::test]
async fn both_services_idle_is_a_reconcile_error() {
    let (platform, _) = setup(0, 0);
    let delay = RecordingDelay::new();
    let mut diag = Diagnostics::default();

    let err = run_blue_green(&context(&platform, &delay), &release(5, 1), &mut diag)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Reconcile);
    assert!(platform.is_untouched());
}

#[tokio::test]
async fn transitions_can_be_driven_step_by_step() {
    let (platform, _) = setup(6, 0);
    let delay = RecordingDelay::new();
    let ctx = context(&platform, &delay);
    let release = release(5, 1);

    let cutover = Cutover::<Resolved>::resolve(&ctx, &release.blue, &release.green)
        .await
        .unwrap();
    assert_eq!(cutover.roles().active.as_str(), BLUE);
    assert_eq!(cutover.roles().active_count, 6);

    let cutover = cutover
        .register(&ctx, CONTAINER, &release.image)
        .await
        .unwrap()
        .point_idle(&ctx)
        .await
        .unwrap();
    assert_eq!(platform.desired_count(GREEN), 0);

    let cutover = match cutover.scale_up(&ctx, Duration::ZERO).await {
        Ok(next) => next,
        Err((_, e)) => panic!("scale up failed: {e}"),
    };
    let converged = match cutover.await_convergence(&ctx, &release.policy).await {
        Ok(next) => next,
        Err((_, e)) => panic!("convergence failed: {e}"),
    };
    assert_eq!(converged.original_count(), 6);

    let outcome = converged
        .retire_active(&ctx, Duration::ZERO, &release.scale_down)
        .await
        .unwrap()
        .finish();
    assert_eq!(outcome.live.as_str(), GREEN);
    assert_eq!(platform.desired_count(BLUE), 0);
    assert_eq!(
        platform.updates(BLUE),
        vec![
            ServiceUpdate::desired_count(3),
            ServiceUpdate::desired_count(0)
        ]
    );
}

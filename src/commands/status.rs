// ABOUTME: Status command implementation.
// ABOUTME: Prints counts, task definition and rollout state of the configured services.

use ecs_release::config::Config;
use ecs_release::error::Result;
use ecs_release::output::Output;
use ecs_release::platform::{AwsPlatform, ServiceOps};

pub async fn status(config: Config, output: Output) -> Result<()> {
    let platform = AwsPlatform::connect(&config.region, config.assume_role.as_deref()).await;

    output.progress(&format!("Cluster: {}", config.cluster));
    for service in config.services() {
        let status = platform.describe_service(&config.cluster, service).await?;
        output.report("service", &status);
        output.success(&format!(
            "{}: {}/{} running, {} ({})",
            status.name,
            status.running_count,
            status.desired_count,
            status.task_definition,
            status.rollout_state
        ));
    }
    Ok(())
}

// ABOUTME: Deploy command implementation.
// ABOUTME: Connects to AWS and runs the rolling, blue/green or off-color release.

use ecs_release::config::{Config, ReleaseConfig};
use ecs_release::deploy::{DeployContext, TokioDelay, run_blue_green, run_off_color, run_rolling};
use ecs_release::diagnostics::Diagnostics;
use ecs_release::error::Result;
use ecs_release::output::Output;
use ecs_release::platform::AwsPlatform;

/// Run the release described by `config`.
pub async fn deploy(config: Config, mut diag: Diagnostics, mut output: Output) -> Result<()> {
    output.start_timer();

    let platform = AwsPlatform::connect(&config.region, config.assume_role.as_deref()).await;
    let delay = TokioDelay;
    let ctx = DeployContext::new(&platform, &delay, &config.cluster);

    output.progress(&format!(
        "Releasing to cluster {} ({} mode)",
        config.cluster,
        config.release.mode()
    ));

    let result = match &config.release {
        ReleaseConfig::Rolling(rolling) => {
            let release = config.rolling_release(rolling);
            output.progress(&format!(
                "  → Rolling {} service(s) to {}",
                release.services.len(),
                release.image
            ));
            run_rolling(&ctx, &release, &mut diag).await.map(|outcome| {
                output.report("rolling", &outcome);
                format!(
                    "Released {} to {} service(s)",
                    outcome.revision,
                    outcome.released.len()
                )
            })
        }
        ReleaseConfig::BlueGreen(bg) => {
            let release = config.blue_green_release(bg);
            output.progress(&format!(
                "  → Blue/green between {} and {} with {}",
                release.blue, release.green, release.image
            ));
            run_blue_green(&ctx, &release, &mut diag)
                .await
                .map(|outcome| {
                    output.report("blue_green", &outcome);
                    format!(
                        "{} is live on {}, {} scaled down",
                        outcome.live, outcome.revision, outcome.retired
                    )
                })
        }
        ReleaseConfig::BlueGreenCluster(cluster) => {
            let release = config.off_color_release(cluster);
            output.progress(&format!(
                "  → Off-color release for branch {}",
                release.branch
            ));
            run_off_color(&ctx, &release, &mut diag)
                .await
                .map(|outcome| {
                    output.report("off_color", &outcome);
                    format!(
                        "Released {} to the {} color",
                        outcome.rolling.revision, outcome.color
                    )
                })
        }
    };

    // Warnings are printed whether or not the release succeeded
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let message = result?;
    output.success(&message);
    Ok(())
}

// ABOUTME: AWS SDK implementation of the platform capability traits.
// ABOUTME: Builds ECS, Application Auto Scaling and Secrets Manager clients from one SdkConfig.

mod autoscaling;
mod ecs;
mod secrets;

pub use ecs::EcsTemplate;

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ecs::error::DisplayErrorContext;

use super::PlatformError;

const SESSION_NAME: &str = "ecs-release";

/// Production platform backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct AwsPlatform {
    ecs: aws_sdk_ecs::Client,
    autoscaling: aws_sdk_applicationautoscaling::Client,
    secrets: aws_sdk_secretsmanager::Client,
}

impl AwsPlatform {
    /// Load credentials from the default chain, optionally assuming a role.
    ///
    /// Credential errors are deferred by the SDK and show up on the first call.
    pub async fn connect(region: &str, assume_role: Option<&str>) -> Self {
        let region = Region::new(region.to_string());
        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(region.clone())
            .load()
            .await;

        let config = match assume_role {
            Some(role_arn) => {
                tracing::debug!(role_arn, "assuming role");
                let provider = AssumeRoleProvider::builder(role_arn)
                    .session_name(SESSION_NAME)
                    .configure(&base)
                    .build()
                    .await;
                aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(provider)
                    .load()
                    .await
            }
            None => base,
        };

        Self::from_conf(&config)
    }

    pub fn from_conf(config: &SdkConfig) -> Self {
        Self {
            ecs: aws_sdk_ecs::Client::new(config),
            autoscaling: aws_sdk_applicationautoscaling::Client::new(config),
            secrets: aws_sdk_secretsmanager::Client::new(config),
        }
    }
}

/// Map an SDK error to a platform error, keeping the full cause chain.
fn api_error<E: std::error::Error>(operation: &'static str) -> impl FnOnce(E) -> PlatformError {
    move |e| PlatformError::api(operation, DisplayErrorContext(&e).to_string())
}

/// The SDK models counts as `i32`; negative values never occur in practice.
fn count_from_sdk(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn count_to_sdk(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

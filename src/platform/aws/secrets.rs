// ABOUTME: Secret lookups over aws-sdk-secretsmanager.
// ABOUTME: The off-color mode reads the live color from a JSON secret string.

use async_trait::async_trait;

use super::{AwsPlatform, api_error};
use crate::platform::PlatformError;
use crate::platform::error::EmptySecretSnafu;
use crate::platform::traits::SecretOps;

#[async_trait]
impl SecretOps for AwsPlatform {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, PlatformError> {
        let out = self
            .secrets
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(api_error("GetSecretValue"))?;

        match out.secret_string() {
            Some(value) => Ok(value.to_string()),
            None => EmptySecretSnafu { secret_id }.fail(),
        }
    }
}

// ABOUTME: Secret store trait.
// ABOUTME: Only the off-color cluster mode reads secrets.

use crate::platform::PlatformError;
use async_trait::async_trait;

#[async_trait]
pub trait SecretOps: Send + Sync {
    /// The string value of a secret.
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, PlatformError>;
}

// ABOUTME: Injectable delay capability used between polls and scale steps.
// ABOUTME: TokioDelay sleeps for real; tests substitute a recorder that returns immediately.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current release for a duration.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Delay backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

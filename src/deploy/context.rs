// ABOUTME: Shared context passed to every release step.
// ABOUTME: Bundles the platform, the delay capability, the cluster name and polling policy.

use std::time::Duration;

/// Everything a release step needs besides its own arguments.
#[derive(Debug)]
pub struct DeployContext<'a, P: ?Sized, D: ?Sized> {
    pub platform: &'a P,
    pub delay: &'a D,
    pub cluster: &'a str,
}

impl<'a, P: ?Sized, D: ?Sized> DeployContext<'a, P, D> {
    pub fn new(platform: &'a P, delay: &'a D, cluster: &'a str) -> Self {
        Self {
            platform,
            delay,
            cluster,
        }
    }
}

// Manual impls: P and D are only borrowed.
impl<P: ?Sized, D: ?Sized> Clone for DeployContext<'_, P, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized, D: ?Sized> Copy for DeployContext<'_, P, D> {}

/// How a convergence wait polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between two checks.
    pub interval: Duration,
    /// Non-passing checks tolerated before timing out.
    pub max_checks: u32,
    /// Consecutive passing checks required; 0 behaves like 1.
    pub required_successes: u32,
}

impl PollPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_CHECKS: u32 = 60;

    pub fn new(interval: Duration, max_checks: u32, required_successes: u32) -> Self {
        Self {
            interval,
            max_checks,
            required_successes,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Self::DEFAULT_MAX_CHECKS, 1)
    }
}

// ABOUTME: Convergence polling with a check budget and a consecutive-success threshold.
// ABOUTME: DeploymentAttempt holds the counters; await_convergence drives it against the platform.

use serde::Serialize;

use crate::platform::{RolloutState, ServiceOps, ServiceStatus};
use crate::types::{ServiceName, TaskDefinitionRef};

use super::{Delay, DeployContext, DeployError, PollPolicy};

/// What counts as a passing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceMode {
    /// Running count equals desired count.
    Scaling,
    /// Counts match and the rollout completed; a failed rollout or any
    /// failed task ends the wait immediately.
    Rollout,
}

/// Classification of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Passing,
    Pending,
    Failed(String),
}

impl ConvergenceMode {
    pub fn classify(self, status: &ServiceStatus) -> Tick {
        match self {
            ConvergenceMode::Scaling => {
                if status.is_settled() {
                    Tick::Passing
                } else {
                    Tick::Pending
                }
            }
            ConvergenceMode::Rollout => {
                if status.rollout_state == RolloutState::Failed {
                    return Tick::Failed("rollout state is failed".to_string());
                }
                if status.failed_tasks > 0 {
                    return Tick::Failed(format!(
                        "{} task(s) failed to start",
                        status.failed_tasks
                    ));
                }
                if status.is_settled() && status.rollout_state == RolloutState::Completed {
                    Tick::Passing
                } else {
                    Tick::Pending
                }
            }
        }
    }
}

/// What the watcher does after recording a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Converged,
    TimedOut,
    Failed(String),
}

/// Counters for one wait on one service.
#[derive(Debug, Clone)]
pub struct DeploymentAttempt {
    service: ServiceName,
    target: TaskDefinitionRef,
    max_checks: u32,
    required_successes: u32,
    elapsed_checks: u32,
    consecutive_successes: u32,
    outcome: Option<Verdict>,
}

impl DeploymentAttempt {
    pub fn new(service: ServiceName, target: TaskDefinitionRef, policy: &PollPolicy) -> Self {
        Self {
            service,
            target,
            max_checks: policy.max_checks,
            required_successes: policy.required_successes.max(1),
            elapsed_checks: 0,
            consecutive_successes: 0,
            outcome: None,
        }
    }

    /// Fold one check into the counters.
    ///
    /// A non-passing check resets the success streak and spends one unit of
    /// the check budget; the budget is exhausted once it is exceeded.
    pub fn record(&mut self, tick: Tick) -> Verdict {
        let verdict = match tick {
            Tick::Failed(reason) => Verdict::Failed(reason),
            Tick::Passing => {
                self.consecutive_successes += 1;
                if self.consecutive_successes >= self.required_successes {
                    Verdict::Converged
                } else {
                    Verdict::Continue
                }
            }
            Tick::Pending => {
                self.consecutive_successes = 0;
                self.elapsed_checks += 1;
                if self.elapsed_checks > self.max_checks {
                    Verdict::TimedOut
                } else {
                    Verdict::Continue
                }
            }
        };

        if verdict != Verdict::Continue {
            self.outcome = Some(verdict.clone());
        }
        verdict
    }

    pub fn service(&self) -> &ServiceName {
        &self.service
    }

    pub fn target(&self) -> &TaskDefinitionRef {
        &self.target
    }

    pub fn elapsed_checks(&self) -> u32 {
        self.elapsed_checks
    }

    pub fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    /// Terminal verdict, once one has been reached.
    pub fn outcome(&self) -> Option<&Verdict> {
        self.outcome.as_ref()
    }
}

/// Poll `service` until it converges, fails, or exhausts the check budget.
pub async fn await_convergence<P, D>(
    ctx: &DeployContext<'_, P, D>,
    service: &ServiceName,
    target: &TaskDefinitionRef,
    policy: &PollPolicy,
    mode: ConvergenceMode,
) -> Result<(), DeployError>
where
    P: ServiceOps + ?Sized,
    D: Delay + ?Sized,
{
    let mut attempt = DeploymentAttempt::new(service.clone(), target.clone(), policy);
    let mut check = 0u32;

    loop {
        check += 1;
        let status = ctx.platform.describe_service(ctx.cluster, service).await?;
        let tick = mode.classify(&status);

        tracing::debug!(
            service = %service,
            check,
            running = status.running_count,
            desired = status.desired_count,
            rollout = %status.rollout_state,
            "convergence check"
        );

        match attempt.record(tick) {
            Verdict::Continue => ctx.delay.sleep(policy.interval).await,
            Verdict::Converged => {
                tracing::info!(service = %service, target = %target, check, "service converged");
                return Ok(());
            }
            Verdict::TimedOut => {
                tracing::warn!(service = %service, check, "check budget exhausted");
                return Err(DeployError::Timeout {
                    service: service.clone(),
                    checks: check,
                });
            }
            Verdict::Failed(reason) => {
                return Err(DeployError::Failed {
                    service: service.clone(),
                    reason,
                });
            }
        }
    }
}

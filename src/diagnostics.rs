// ABOUTME: Diagnostics accumulator for non-fatal warnings during a release.
// ABOUTME: Collects warnings that shouldn't replace the release outcome but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during release operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a release.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Restoring the previous revision after a failed rolling release failed.
    pub fn rollback(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Rollback,
            message: message.into(),
        }
    }

    /// Scaling the idle service back to zero after a failed cutover failed.
    pub fn idle_reset(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::IdleReset,
            message: message.into(),
        }
    }

    /// A task of a failed deployment was stopped by the scheduler.
    pub fn stopped_task(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StoppedTask,
            message: message.into(),
        }
    }

    /// A setting could not be parsed and its default was used.
    pub fn config_default(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ConfigDefault,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Rollback did not converge; the service may still run the new revision.
    Rollback,
    /// Idle service may still have tasks running.
    IdleReset,
    /// Why a task of a failed deployment stopped.
    StoppedTask,
    /// Fell back to a default value.
    ConfigDefault,
}

// ABOUTME: Release orchestration: rolling, blue/green and off-color controllers.
// ABOUTME: Exports the building blocks, the Cutover type state machine and controller entry points.

mod blue_green;
pub mod capacity;
mod color;
mod context;
mod delay;
mod error;
mod roles;
mod rolling;
mod scale_down;
mod state;
pub mod template;
mod watcher;

pub use blue_green::{BlueGreenOutcome, BlueGreenRelease, Cutover, TransitionResult, run_blue_green};
pub use color::{
    ColorTarget, OffColorOutcome, OffColorRelease, environment_for_branch, inactive_color,
    resolve_off_color, run_off_color, secret_id,
};
pub use context::{DeployContext, PollPolicy};
pub use delay::{Delay, TokioDelay};
pub use error::{DeployError, DeployErrorKind};
pub use roles::{Roles, assign_roles, resolve_roles};
pub use rolling::{ReleasedService, RollingOutcome, RollingRelease, run_rolling};
pub use scale_down::{ScaleDownPlan, ScaleDownSettings, scale_down_in_steps, step_size};
pub use state::{Completed, Converged, IdlePointed, Registered, Resolved, ScalingUp};
pub use watcher::{ConvergenceMode, DeploymentAttempt, Tick, Verdict, await_convergence};

// ABOUTME: Command module aggregator for the ecs-release CLI.
// ABOUTME: Re-exports deploy, status and render command handlers.

mod deploy;
mod render;
mod status;

pub use deploy::deploy;
pub use render::render;
pub use status::status;

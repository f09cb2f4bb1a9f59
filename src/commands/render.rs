// ABOUTME: Render command implementation.
// ABOUTME: Patches an exported task definition offline and prints registrable JSON.

use ecs_release::deploy::template::patch_container_image;
use ecs_release::error::{Error, Result};
use ecs_release::types::{ImageRef, JsonTemplate};
use std::path::Path;

pub fn render(task_definition: &Path, container: &str, image: &str) -> Result<()> {
    let image = ImageRef::parse(image).map_err(|e| Error::InvalidConfig(e.to_string()))?;

    let input = std::fs::read_to_string(task_definition)?;
    let mut template = JsonTemplate::from_json(&input)?;
    template.strip_read_only();

    let patched = patch_container_image(&template, container, &image)?;
    println!("{}", serde_json::to_string_pretty(&patched)?);
    Ok(())
}

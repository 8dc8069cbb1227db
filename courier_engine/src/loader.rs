//! Loader utilities for building a `CourierWorld` from serialized data.
//!
//! Campaign content is loaded from RON, engine settings from TOML.

pub mod campaign;
pub mod config;

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::data_paths::data_path;
use crate::loader::campaign::{build_world, load_campaign};
use crate::loader::config::load_config;
use crate::world::CourierWorld;

/// Load the `CourierWorld` from the campaign and settings in the data directory.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, or fatal validation problems.
pub fn load_world() -> Result<CourierWorld> {
    load_world_from(&data_path("campaign.ron"), &data_path("courier.toml"))
}

/// Load a `CourierWorld` from explicit file paths.
///
/// # Errors
/// See [`load_world`]. A missing settings file is not an error.
pub fn load_world_from(campaign_path: &Path, config_path: &Path) -> Result<CourierWorld> {
    let config = load_config(config_path);
    let def = load_campaign(campaign_path).context("while loading campaign from file")?;
    let world = build_world(&def, config).context("while building world from campaign")?;
    info!(
        "campaign \"{}\" loaded: {} tasks, {} letters",
        world.campaign_title,
        world.tracker.tasks().len(),
        world.letters.len()
    );
    Ok(world)
}

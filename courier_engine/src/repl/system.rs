//! `repl::system` module
//!
//! Handlers for commands that are not part of play itself: help, tasks, pause, saves.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use log::{info, warn};

use crate::COURIER_VERSION;
use crate::repl::ReplControl;
use crate::repl::hud::TaskHud;
use crate::repl::input::set_completion_save_dir;
use crate::save_files::{
    SAVE_DIR, SaveFileStatus, build_save_entries, find_save_slot, format_modified, is_valid_slot_name,
    load_save_file, save_dir_for_world, write_save_file,
};
use crate::style::GameStyle;
use crate::world::CourierWorld;

const HELP_LINES: &[(&str, &str)] = &[
    ("look", "describe where you are"),
    ("take letter [from <mailbox>]", "empty a mailbox into your bag"),
    ("talk to <name>", "talk to someone here"),
    ("next", "advance the conversation (or just press enter)"),
    ("give <n>", "hand over letter n while your bag is open"),
    ("cancel", "close your letter bag"),
    ("inventory", "list carried letters"),
    ("read <n>", "read letter n"),
    ("tasks", "show your tasks"),
    ("go <scene> | go next | go back", "travel"),
    ("pause", "pause or resume"),
    ("save <slot> | load <slot> | saves", "manage saved games"),
    ("quit", "leave the game"),
];

/// Save folder for the running campaign.
pub fn current_save_dir(world: &CourierWorld) -> PathBuf {
    save_dir_for_world(Path::new(SAVE_DIR), world)
}

pub fn help_handler() {
    println!("{}", "Commands".subheading_style());
    for (command, what) in HELP_LINES {
        println!("  {:<36} {}", command.bold(), what.dimmed());
    }
}

/// Leave the game with a short tally.
pub fn quit_handler(world: &CourierWorld) -> ReplControl {
    let done = world.tracker.state().completed_count();
    let total = world.tracker.tasks().len();
    info!(
        "player quit with {} deliveries and {done}/{total} tasks complete",
        world.ledger.delivered_count()
    );
    println!(
        "\nLetters delivered: {}   Tasks complete: {done}/{total}",
        world.ledger.delivered_count().to_string().bold()
    );
    println!("{}", "Safe travels, courier.".italic());
    ReplControl::Quit
}

/// List tasks with their progress.
pub fn tasks_handler(world: &CourierWorld) {
    println!("{}", "Tasks".subheading_style());
    let tracker = &world.tracker;
    if tracker.tasks().is_empty() {
        println!("{}", "No tasks in this campaign.".italic().dimmed());
        return;
    }
    let active_id = tracker.active_task().map(|task| task.id.as_str());
    for (idx, task) in tracker.tasks().iter().enumerate() {
        let progress = format!("{}/{}", tracker.progress(&task.id), task.target);
        if tracker.is_completed(&task.id) {
            println!("  {} {}", task.title.task_complete_style(), progress.dimmed());
        } else if Some(task.id.as_str()) == active_id || !tracker.is_sequential() {
            println!("  {} {progress}", task.title.task_active_style());
            if !task.description.is_empty() {
                println!("    {}", task.description.description_style());
            }
        } else if tracker.active_index().is_some_and(|active| idx > active) {
            println!("  {}", "???".dimmed());
        } else {
            println!("  {} {}", task.title.as_str().dimmed(), progress.dimmed());
        }
    }
}

pub fn pause_handler(world: &mut CourierWorld) {
    if world.toggle_pause() {
        println!("{}", "-- paused --".notice_style());
    } else {
        println!("{}", "-- resumed --".notice_style());
    }
}

/// Save the game to `slot`.
///
/// # Errors
/// Serialization or file IO failures.
pub fn save_handler(world: &CourierWorld, slot: &str) -> Result<()> {
    if !is_valid_slot_name(slot) {
        println!("{}", format!("'{slot}' can't be used as a save name.").error_style());
        return Ok(());
    }
    let path = write_save_file(&current_save_dir(world), slot, world)?;
    println!("Game saved as {}", slot.underline());
    info!("player saved game to \"{}\"", path.display());
    Ok(())
}

/// Replace the running world with a saved one.
pub fn load_handler(world: &mut CourierWorld, hud: &mut TaskHud, slot: &str) {
    let dir = current_save_dir(world);
    let found = match find_save_slot(&dir, slot) {
        Ok(found) => found,
        Err(err) => {
            warn!("failed to search saves in {}: {err:#}", dir.display());
            None
        },
    };
    let Some(save) = found else {
        println!("Unable to find a {} save. Load aborted.", slot.error_style());
        return;
    };
    match load_save_file(&save.path) {
        Ok(loaded) => {
            if loaded.version != COURIER_VERSION {
                warn!(
                    "player loaded '{slot}' (v{}), current version is v{COURIER_VERSION}",
                    loaded.version
                );
                println!(
                    "{}: '{slot}' was saved by v{} -- this is v{COURIER_VERSION}.",
                    "WARNING".bold().yellow(),
                    loaded.version.error_style()
                );
            }
            let config = world.config().clone();
            hud.detach(world);
            *world = loaded;
            world.configure(config);
            world.resume();
            hud.attach(world);
            set_completion_save_dir(current_save_dir(world));
            println!("Saved game {} loaded. Back on the route.", slot.underline().green());
            info!("player reloaded CourierWorld from '{}'", save.path.display());
        },
        Err(err) => {
            warn!("player attempted to load '{slot}': {err:#}");
            println!(
                "Unable to load the {} save file. It may be damaged or from an older engine.",
                slot.error_style()
            );
        },
    }
}

/// List saves for this campaign.
pub fn list_saves_handler(world: &CourierWorld) {
    let dir = current_save_dir(world);
    let entries = match build_save_entries(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("failed to list saves in {}: {err:#}", dir.display());
            println!("{}", "Couldn't read the save folder.".error_style());
            return;
        },
    };
    if entries.is_empty() {
        println!("{}", "No saved games yet.".italic().dimmed());
        return;
    }
    println!("{}", "Saved games".subheading_style());
    for entry in entries {
        let when = entry.modified.map(format_modified).unwrap_or_default();
        let detail = match (&entry.status, &entry.summary) {
            (SaveFileStatus::Corrupted { message }, _) => message.error_style().to_string(),
            (status, Some(summary)) => {
                let mut text = format!(
                    "{} | {} delivered | {}/{} tasks",
                    summary.scene.as_deref().unwrap_or("?"),
                    summary.delivered,
                    summary.completed_tasks,
                    summary.total_tasks
                );
                if let SaveFileStatus::VersionMismatch { save_version, .. } = status {
                    text.push_str(&format!(" | v{save_version}"));
                }
                text
            },
            (_, None) => String::new(),
        };
        println!("  {:<12} {} {}", entry.slot.bold(), detail, when.dimmed());
    }
}

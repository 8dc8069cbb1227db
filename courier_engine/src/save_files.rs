//! Save-game discovery and serialization helpers.
//!
//! Saves live under `saved_games/<campaign-slug>/` as `<slot>-courier-<version>.ron`, each
//! holding a whole serialized [`CourierWorld`].

use crate::slug::sanitize_slug;
use crate::{COURIER_VERSION, CourierWorld};
use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const SAVE_DIR: &str = "saved_games";
const SLOT_MARKER: &str = "-courier-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub file_name: String,
    pub modified: Option<SystemTime>,
}

/// What a save holds, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub campaign_title: String,
    pub campaign_version: String,
    pub scene: Option<String>,
    pub delivered: usize,
    pub completed_tasks: usize,
    pub total_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFileStatus {
    Ready,
    VersionMismatch { save_version: String, current_version: String },
    Corrupted { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFileEntry {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub file_name: String,
    pub modified: Option<SystemTime>,
    pub summary: Option<SaveSummary>,
    pub status: SaveFileStatus,
}

/// Per-campaign save directory under `root`.
pub fn save_dir_for_world(root: &Path, world: &CourierWorld) -> PathBuf {
    let raw = if world.campaign_slug.trim().is_empty() {
        world.campaign_title.as_str()
    } else {
        world.campaign_slug.as_str()
    };
    root.join(sanitize_slug(raw))
}

/// File name for `slot` written by this engine version.
pub fn save_file_name(slot: &str) -> String {
    format!("{slot}{SLOT_MARKER}{COURIER_VERSION}.ron")
}

/// Whether `slot` can be used as part of a save file name.
pub fn is_valid_slot_name(slot: &str) -> bool {
    let slot = slot.trim();
    !slot.is_empty() && !slot.contains(['/', '\\']) && !slot.contains(SLOT_MARKER)
}

/// Serialize `world` into `dir`, creating the directory if needed.
///
/// # Errors
/// - an empty or path-like slot name
/// - serialization or file IO failures
pub fn write_save_file(dir: &Path, slot: &str, world: &CourierWorld) -> Result<PathBuf> {
    let slot = slot.trim();
    if !is_valid_slot_name(slot) {
        bail!("'{slot}' is not a usable save slot name");
    }
    let ron = ron::ser::to_string_pretty(world, ron::ser::PrettyConfig::default())
        .context("error converting CourierWorld to 'ron' format")?;
    fs::create_dir_all(dir).with_context(|| format!("creating save folder {}", dir.display()))?;
    let path = dir.join(save_file_name(slot));
    fs::write(&path, ron).with_context(|| format!("writing save file {}", path.display()))?;
    info!("game saved to {}", path.display());
    Ok(path)
}

/// Find the newest file for `slot` in `dir`, preferring one from this engine version.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn find_save_slot(dir: &Path, slot: &str) -> Result<Option<SaveSlot>> {
    let mut matches = collect_save_slots(dir)?
        .into_iter()
        .filter(|candidate| candidate.slot == slot)
        .collect::<Vec<_>>();
    matches.sort_by(|a, b| {
        (b.version == COURIER_VERSION)
            .cmp(&(a.version == COURIER_VERSION))
            .then(b.modified.cmp(&a.modified))
    });
    Ok(matches.into_iter().next())
}

/// Discover save slot files stored in `dir`.
///
/// # Errors
/// Returns an error if the directory contents cannot be read or enumerated.
pub fn collect_save_slots(dir: &Path) -> Result<Vec<SaveSlot>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut slots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", dir.display()))?;
        if let Some(slot) = slot_from_entry(&entry) {
            slots.push(slot);
        }
    }
    slots.sort_by(|a, b| a.slot.cmp(&b.slot).then(a.version.cmp(&b.version)));
    Ok(slots)
}

/// Build descriptive entries for save files located in `dir`, newest first.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn build_save_entries(dir: &Path) -> Result<Vec<SaveFileEntry>> {
    let slots = collect_save_slots(dir)?;
    let mut entries: Vec<_> = slots.into_iter().map(entry_for_slot).collect();
    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.slot.cmp(&b.slot)));
    Ok(entries)
}

/// Load a save file from disk and deserialize its world state.
///
/// The returned world has no observers and no engine settings; the caller re-subscribes
/// and calls [`CourierWorld::configure`] and [`CourierWorld::resume`].
///
/// # Errors
/// Returns an error if the file cannot be read or deserialized.
pub fn load_save_file(path: &Path) -> Result<CourierWorld> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading save file {}", path.display()))?;
    ron::from_str::<CourierWorld>(&raw).with_context(|| format!("parsing save file {}", path.display()))
}

/// Format a human-friendly modified time relative to now.
pub fn format_modified(modified: SystemTime) -> String {
    match SystemTime::now().duration_since(modified) {
        Ok(delta) => format_duration(delta),
        Err(_) => "in the future".to_string(),
    }
}

fn entry_for_slot(slot: SaveSlot) -> SaveFileEntry {
    let mut version = slot.version.clone();
    let parsed = fs::read_to_string(&slot.path)
        .map_err(|err| format!("read error: {}", trim_error(&err)))
        .and_then(|raw| ron::from_str::<CourierWorld>(&raw).map_err(|err| format!("parse error: {}", trim_error(&err))));

    let (summary, status) = match parsed {
        Ok(world) => {
            version.clone_from(&world.version);
            let status = if world.version == COURIER_VERSION {
                SaveFileStatus::Ready
            } else {
                SaveFileStatus::VersionMismatch {
                    save_version: world.version.clone(),
                    current_version: COURIER_VERSION.to_string(),
                }
            };
            (Some(summarize(&world)), status)
        },
        Err(message) => {
            warn!("unusable save '{}' ({}): {message}", slot.slot, slot.path.display());
            (None, SaveFileStatus::Corrupted { message })
        },
    };

    SaveFileEntry {
        slot: slot.slot,
        version,
        path: slot.path,
        file_name: slot.file_name,
        modified: slot.modified,
        summary,
        status,
    }
}

fn summarize(world: &CourierWorld) -> SaveSummary {
    SaveSummary {
        campaign_title: world.campaign_title.clone(),
        campaign_version: world.campaign_version.clone(),
        scene: world.current_scene().map(|id| world.scene_name(id).to_string()),
        delivered: world.ledger.delivered_count(),
        completed_tasks: world.tracker.state().completed_count(),
        total_tasks: world.tracker.tasks().len(),
    }
}

fn slot_from_entry(entry: &fs::DirEntry) -> Option<SaveSlot> {
    let path = entry.path();
    if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
        return None;
    }
    let file_name = path.file_name().and_then(|name| name.to_str())?.to_string();
    let stem = path.file_stem().and_then(|stem| stem.to_str())?;
    let (slot, version) = stem.rsplit_once(SLOT_MARKER)?;
    if slot.is_empty() {
        return None;
    }
    let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
    Some(SaveSlot {
        slot: slot.to_string(),
        version: version.to_string(),
        path,
        file_name,
        modified,
    })
}

/// Convert a duration into a compact "time ago" string.
fn format_duration(duration: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;
    const WEEK: u64 = DAY * 7;

    let secs = duration.as_secs();
    match secs {
        s if s < 30 => "just now".to_string(),
        s if s < MINUTE => format!("{s}s ago"),
        s if s < HOUR => format!("{}m ago", s / MINUTE),
        s if s < DAY => format!("{}h ago", s / HOUR),
        s if s < WEEK => format!("{}d ago", s / DAY),
        s => format!("{}w ago", s / WEEK),
    }
}

/// Clamp verbose error messages to a readable length.
fn trim_error(err: &impl ToString) -> String {
    let message = err.to_string();
    if message.chars().count() <= 120 {
        return message;
    }
    let mut trimmed: String = message.chars().take(117).collect();
    trimmed.push_str("...");
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::DeliveryLedger;
    use crate::letter::Letter;
    use anyhow::Result;
    use tempfile::tempdir;

    fn sample_world() -> CourierWorld {
        let mut world = CourierWorld::new_empty();
        world.campaign_title = "Harbor Route".into();
        world.campaign_slug = "harbor-route".into();
        let mut ledger = DeliveryLedger::new();
        let letter = Letter {
            id: "l5".into(),
            house_id: 5,
            title: String::new(),
            sender: String::new(),
            receiver: String::new(),
            content: String::new(),
        };
        assert!(ledger.attempt_deliver(Some(&letter), 5));
        world.ledger = ledger;
        world
    }

    #[test]
    fn collect_save_slots_handles_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        assert!(collect_save_slots(&dir.path().join("missing"))?.is_empty());
        Ok(())
    }

    #[test]
    fn collect_save_slots_skips_foreign_files() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path();
        fs::write(path.join("alpha-courier-0.3.0.ron"), "()")?;
        fs::write(path.join("alpha-postbox-0.3.0.ron"), "()")?;
        fs::write(path.join("notes.txt"), "ignore me")?;
        fs::create_dir_all(path.join("nested"))?;

        let slots = collect_save_slots(path)?;
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].slot, "alpha");
        assert_eq!(slots[0].version, "0.3.0");
        Ok(())
    }

    #[test]
    fn write_then_load_keeps_progress() -> Result<()> {
        let dir = tempdir()?;
        let world = sample_world();
        let save_dir = save_dir_for_world(dir.path(), &world);
        let path = write_save_file(&save_dir, "quick", &world)?;
        assert!(path.ends_with(format!("harbor-route/quick-courier-{COURIER_VERSION}.ron")));

        let loaded = load_save_file(&path)?;
        assert!(loaded.ledger.is_delivered(5));
        assert_eq!(loaded.campaign_title, "Harbor Route");

        let found = find_save_slot(&save_dir, "quick")?.expect("slot exists");
        assert_eq!(found.path, path);
        assert!(find_save_slot(&save_dir, "other")?.is_none());
        Ok(())
    }

    #[test]
    fn bad_slot_names_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let world = sample_world();
        assert!(write_save_file(dir.path(), "  ", &world).is_err());
        assert!(write_save_file(dir.path(), "../escape", &world).is_err());
        Ok(())
    }

    #[test]
    fn build_save_entries_reports_status_variants() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path();
        let world = sample_world();
        write_save_file(path, "alpha", &world)?;

        let mut old_world = sample_world();
        old_world.version = "0.0.1".into();
        fs::write(path.join("beta-courier-0.0.1.ron"), ron::ser::to_string(&old_world)?)?;
        fs::write(path.join(save_file_name("gamma")), "this is not valid ron")?;

        let entries = build_save_entries(path)?;
        let find = |slot: &str| entries.iter().find(|entry| entry.slot == slot).expect("entry present");

        let alpha = find("alpha");
        assert_eq!(alpha.status, SaveFileStatus::Ready);
        let summary = alpha.summary.as_ref().expect("summary");
        assert_eq!(summary.campaign_title, "Harbor Route");
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.scene, None);

        let beta = find("beta");
        assert!(matches!(beta.status, SaveFileStatus::VersionMismatch { .. }));
        assert_eq!(beta.version, "0.0.1");

        let gamma = find("gamma");
        assert!(matches!(gamma.status, SaveFileStatus::Corrupted { .. }));
        assert!(gamma.summary.is_none());
        Ok(())
    }

    #[test]
    fn durations_read_naturally() {
        assert_eq!(format_duration(Duration::from_secs(5)), "just now");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s ago");
        assert_eq!(format_duration(Duration::from_secs(7200)), "2h ago");
        assert_eq!(format_duration(Duration::from_secs(86_400 * 15)), "2w ago");
    }

    #[test]
    fn long_errors_are_trimmed() {
        let long = "x".repeat(300);
        let trimmed = trim_error(&long);
        assert_eq!(trimmed.chars().count(), 120);
        assert!(trimmed.ends_with("..."));
    }
}

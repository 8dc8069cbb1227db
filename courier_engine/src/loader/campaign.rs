//! Campaign loader and conversion helpers.
//!
//! Converts the serialized `CampaignDef` data model into a ready-to-play `CourierWorld`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use courier_data::CampaignDef;
use log::{info, warn};

use crate::letter::Letter;
use crate::loader::config::EngineConfig;
use crate::mailbox::Mailbox;
use crate::npc::Npc;
use crate::scene::{SceneChanger, SceneObject};
use crate::slug::sanitize_slug;
use crate::task::TaskRegistry;
use crate::world::{CourierWorld, SceneInfo};

/// Load a `CampaignDef` from a RON file.
///
/// # Errors
/// The file can't be read or isn't a valid campaign.
pub fn load_campaign(path: &Path) -> Result<CampaignDef> {
    let text = fs::read_to_string(path).with_context(|| format!("reading campaign from '{}'", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing campaign RON from '{}'", path.display()))
}

/// Validate a campaign, failing only on problems that make it unplayable.
///
/// Task problems are logged and the affected tasks are dealt with when the registry is
/// built.
///
/// # Errors
/// One aggregated error listing every fatal problem.
pub fn check_campaign(def: &CampaignDef) -> Result<()> {
    let (fatal, warnings): (Vec<_>, Vec<_>) = courier_data::validate_campaign(def)
        .into_iter()
        .partition(courier_data::ValidationError::is_fatal);
    for warning in &warnings {
        warn!("campaign data: {warning}");
    }
    if fatal.is_empty() {
        return Ok(());
    }
    let details = fatal
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("campaign validation failed:\n{details}");
}

/// Convert a `CampaignDef` into a populated `CourierWorld`.
///
/// Tasks are initialized and the start scene's load is queued; tick the world to finish it.
///
/// # Errors
/// Fatal validation problems, or a start scene that can't be loaded.
pub fn build_world(def: &CampaignDef, config: EngineConfig) -> Result<CourierWorld> {
    check_campaign(def)?;
    let mut world = CourierWorld::new_empty();

    world.campaign_title.clone_from(&def.game.title);
    world.campaign_slug = if def.game.slug.trim().is_empty() {
        sanitize_slug(&def.game.title)
    } else {
        sanitize_slug(&def.game.slug)
    };
    world.campaign_version.clone_from(&def.game.version);
    world.intro.clone_from(&def.game.intro);

    for scene in &def.scenes {
        world.scene_info.insert(
            scene.id.clone(),
            SceneInfo {
                name: scene.name.clone(),
                description: scene.desc.clone(),
                bgm: scene.bgm.clone().filter(|clip| !clip.trim().is_empty()),
            },
        );
    }
    world.scenes = SceneChanger::new(
        def.scenes.iter().map(|scene| scene.id.clone()).collect(),
        config.fade_duration,
        config.lock_during_load,
    );

    for object in &def.objects {
        world.objects.insert(
            &object.id,
            SceneObject {
                scene: object.scene.clone(),
                desc: object.desc.clone(),
                active: object.active,
            },
        );
    }
    world.letters = def
        .letters
        .iter()
        .map(|letter| (letter.id.clone(), Letter::from(letter)))
        .collect();
    world.mailboxes = def
        .mailboxes
        .iter()
        .map(|mailbox| (mailbox.id.clone(), Mailbox::from(mailbox)))
        .collect();
    world.npcs = def.npcs.iter().map(|npc| (npc.id.clone(), Npc::from(npc))).collect();
    info!("{} scenes added to CourierWorld", world.scene_info.len());
    info!("{} letters added to CourierWorld", world.letters.len());
    info!("{} mailboxes added to CourierWorld", world.mailboxes.len());
    info!("{} NPCs added to CourierWorld", world.npcs.len());

    world.configure(config);

    let registry = TaskRegistry::from_defs(&def.tasks, &def.bindings);
    world
        .tracker
        .initialize(registry, def.game.sequential, def.game.start_index);

    if def.scenes.is_empty() {
        bail!("campaign has no scenes");
    }
    let last = i64::try_from(def.scenes.len() - 1).unwrap_or(i64::MAX);
    let start = usize::try_from(def.game.start_scene.clamp(0, last)).unwrap_or(0);
    world
        .scenes
        .load_scene(start)
        .with_context(|| format!("starting scene #{start}"))?;
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_data::{GameDef, LetterDef, MailboxDef, SceneDef};

    fn scene(id: &str) -> SceneDef {
        SceneDef {
            id: id.into(),
            name: id.to_uppercase(),
            desc: String::new(),
            bgm: None,
        }
    }

    #[test]
    fn fatal_problems_abort_the_build() {
        let def = CampaignDef {
            game: GameDef {
                title: "Broken".into(),
                ..GameDef::default()
            },
            scenes: vec![scene("village")],
            mailboxes: vec![MailboxDef {
                id: "box".into(),
                scene: "village".into(),
                letter: "ghost".into(),
            }],
            ..CampaignDef::default()
        };
        let err = build_world(&def, EngineConfig::default()).unwrap_err();
        assert!(format!("{err}").contains("validation failed"));
    }

    #[test]
    fn task_problems_are_tolerated() {
        let def = CampaignDef {
            game: GameDef {
                title: "Loose Tasks".into(),
                ..GameDef::default()
            },
            scenes: vec![scene("village")],
            tasks: vec![None],
            ..CampaignDef::default()
        };
        let world = build_world(&def, EngineConfig::default()).unwrap();
        assert!(world.tracker.tasks().is_empty());
    }

    #[test]
    fn start_scene_is_clamped_and_slug_derived() {
        let def = CampaignDef {
            game: GameDef {
                title: "Harbor Route!".into(),
                start_scene: 9,
                ..GameDef::default()
            },
            scenes: vec![scene("village"), scene("harbor")],
            letters: vec![LetterDef {
                id: "l1".into(),
                house_id: 1,
                title: "One".into(),
                sender: String::new(),
                receiver: String::new(),
                content: String::new(),
            }],
            ..CampaignDef::default()
        };
        let mut world = build_world(&def, EngineConfig::default()).unwrap();
        assert_eq!(world.campaign_slug, "harbor-route");
        assert_eq!(world.letters.len(), 1);
        while world.scenes.is_loading() {
            world.tick(0.1);
        }
        assert_eq!(world.current_scene(), Some("harbor"));
    }
}

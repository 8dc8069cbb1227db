//! Data structures representing the running campaign.
//!
//! [`CourierWorld`] owns the quest state (tracker, ledger, letter bag), the scene state
//! (current scene, object flags, mailboxes) and the runtime-only presentation state
//! (dialogue, music, the delivery window). Player actions come in through its methods and
//! time advances through [`CourierWorld::tick`]. Everything a host should print is queued
//! as [`WorldNotice`]s or published on the tracker's event bus.

use std::collections::BTreeMap;

use courier_data::HouseId;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::COURIER_VERSION;
use crate::dialogue::{DialogueRunner, DialogueStep};
use crate::fade::BgmPlayer;
use crate::ledger::DeliveryLedger;
use crate::letter::{Letter, LetterInventory};
use crate::loader::config::EngineConfig;
use crate::mailbox::Mailbox;
use crate::npc::{Npc, select_npc};
use crate::scene::{SceneChanger, SceneError, SceneEvent, SceneObjects};
use crate::task::Task;
use crate::tracker::{SceneEffects, TaskProgressTracker};

/// Player actions the world refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("the game is paused")]
    Paused,
    #[error("someone is still talking")]
    DialogueActive,
    #[error("the letter bag is open; give a letter or cancel first")]
    WindowOpen,
    #[error("the letter bag is not open")]
    NoWindow,
    #[error("nobody called '{0}' is here")]
    NpcNotHere(String),
    #[error("there is no mailbox like that here")]
    NoMailbox,
    #[error("mailbox '{0}' is empty")]
    MailboxEmpty(String),
    #[error("letter '{0}' is not part of this campaign")]
    UnknownLetter(String),
    #[error("you are not carrying a letter #{}", .0 + 1)]
    NoSuchLetter(usize),
    #[error("you can't leave while the letter bag is open")]
    MovementLocked,
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Which set of controls is live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMap {
    #[default]
    Player,
    Ui,
}

/// What happens when an NPC's opening lines finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueCompletion {
    OfferDelivery { npc_id: String },
}

/// The letter bag, opened for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryWindow {
    pub npc_id: String,
    pub npc_name: String,
    pub recipient: HouseId,
    pub scene: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClose {
    Delivered,
    Refused,
    Cancelled,
    /// The player left the recipient's scene.
    ForceClosed,
}

/// Things the host should tell the player about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldNotice {
    LetterTaken { letter: String, mailbox: String },
    ObjectChanged { object: String, active: bool },
    TaskCompleted { title: String, message: Option<String> },
    DeliveryOpened { npc: String },
    DeliveryClosed { npc: String, reason: WindowClose },
    SceneEntered { scene: String, name: String },
}

/// Where a travel request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneTarget {
    Named(String),
    Next,
    Previous,
}

/// Display data for a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneInfo {
    pub name: String,
    pub description: String,
    pub bgm: Option<String>,
}

/// Complete state of a running campaign.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CourierWorld {
    pub version: String,
    pub campaign_title: String,
    pub campaign_slug: String,
    pub campaign_version: String,
    pub intro: String,
    pub tracker: TaskProgressTracker,
    pub ledger: DeliveryLedger,
    pub inventory: LetterInventory,
    pub letters: BTreeMap<String, Letter>,
    pub mailboxes: BTreeMap<String, Mailbox>,
    pub npcs: BTreeMap<String, Npc>,
    pub objects: SceneObjects,
    pub scenes: SceneChanger,
    pub scene_info: BTreeMap<String, SceneInfo>,
    #[serde(skip)]
    pub bgm: BgmPlayer,
    #[serde(skip)]
    dialogue: DialogueRunner<DialogueCompletion>,
    #[serde(skip)]
    window: Option<DeliveryWindow>,
    #[serde(skip)]
    input_map: InputMap,
    #[serde(skip)]
    config: EngineConfig,
    #[serde(skip)]
    notices: Vec<WorldNotice>,
    #[serde(skip)]
    pending_scene: Option<String>,
}

/// Completion effects routed into the world's own fields.
struct WorldEffects<'a> {
    objects: &'a mut SceneObjects,
    notices: &'a mut Vec<WorldNotice>,
    pending_scene: &'a mut Option<String>,
}

impl SceneEffects for WorldEffects<'_> {
    fn set_object_active(&mut self, object_id: &str, active: bool) {
        if self.objects.set_active(object_id, active) {
            self.notices.push(WorldNotice::ObjectChanged {
                object: object_id.to_string(),
                active,
            });
        }
    }

    fn task_completed(&mut self, task: &Task) {
        self.notices.push(WorldNotice::TaskCompleted {
            title: task.title.clone(),
            message: task.on_complete.clone(),
        });
    }

    fn request_scene_load(&mut self, scene: &str) {
        if let Some(previous) = self.pending_scene.replace(scene.to_string()) {
            debug!("scene request '{previous}' replaced by '{scene}'");
        }
    }
}

impl CourierWorld {
    pub fn new_empty() -> CourierWorld {
        let world = Self {
            version: COURIER_VERSION.to_string(),
            ..Self::default()
        };
        info!("new, empty 'CourierWorld' created");
        world
    }

    /// Apply engine settings to the runtime parts.
    pub fn configure(&mut self, config: EngineConfig) {
        self.dialogue.set_typing_delay(config.typing_delay);
        self.scenes.configure(config.fade_duration, config.lock_during_load);
        self.bgm.set_fade_rate(config.bgm_fade_rate);
        self.config = config;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Restart presentation state after this world was read from a save file.
    pub fn resume(&mut self) {
        self.dialogue.cancel();
        self.window = None;
        self.input_map = InputMap::Player;
        self.pending_scene = None;
        if let Some(clip) = self.current_scene_info().and_then(|info| info.bgm.clone()) {
            self.bgm.change(&clip);
        }
        info!("world resumed at scene {:?}", self.current_scene());
    }

    /// Id of the scene the player is in.
    pub fn current_scene(&self) -> Option<&str> {
        self.scenes.current_name()
    }

    pub fn current_scene_info(&self) -> Option<&SceneInfo> {
        self.current_scene().and_then(|id| self.scene_info.get(id))
    }

    /// Display name for a scene id, falling back to the id.
    pub fn scene_name<'a>(&'a self, scene_id: &'a str) -> &'a str {
        self.scene_info
            .get(scene_id)
            .map_or(scene_id, |info| info.name.as_str())
    }

    pub fn npcs_here(&self) -> impl Iterator<Item = &Npc> {
        let scene = self.current_scene().unwrap_or_default();
        self.npcs.values().filter(move |npc| npc.scene == scene)
    }

    pub fn mailboxes_here(&self) -> impl Iterator<Item = &Mailbox> {
        let scene = self.current_scene().unwrap_or_default();
        self.mailboxes.values().filter(move |mailbox| mailbox.scene == scene)
    }

    pub fn is_paused(&self) -> bool {
        self.input_map == InputMap::Ui
    }

    pub fn input_map(&self) -> InputMap {
        self.input_map
    }

    /// Flip between gameplay and menu controls. Returns true if now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.input_map = match self.input_map {
            InputMap::Player => InputMap::Ui,
            InputMap::Ui => InputMap::Player,
        };
        info!("input map switched to {:?}", self.input_map);
        self.is_paused()
    }

    pub fn dialogue(&self) -> &DialogueRunner<DialogueCompletion> {
        &self.dialogue
    }

    pub fn delivery_window(&self) -> Option<&DeliveryWindow> {
        self.window.as_ref()
    }

    /// Travel is blocked while the letter bag is open.
    pub fn movement_locked(&self) -> bool {
        self.window.is_some()
    }

    /// Take the letter from a mailbox in the current scene.
    ///
    /// With no query the first full mailbox here is used.
    ///
    /// # Errors
    /// The player is busy, no mailbox matches, or the matching mailbox is empty.
    pub fn pickup_letter(&mut self, query: Option<&str>) -> Result<Letter, ActionError> {
        self.ensure_free()?;
        let scene = self.current_scene().ok_or(ActionError::NoMailbox)?.to_string();
        let query = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());
        let candidates = self
            .mailboxes
            .values()
            .filter(|mailbox| mailbox.scene == scene)
            .filter(|mailbox| query.as_ref().is_none_or(|q| mailbox.id.to_lowercase().contains(q.as_str())))
            .map(|mailbox| (mailbox.id.clone(), mailbox.active))
            .collect::<Vec<_>>();
        let Some((mailbox_id, _)) = candidates.iter().find(|(_, active)| *active) else {
            return Err(candidates
                .first()
                .map_or(ActionError::NoMailbox, |(id, _)| ActionError::MailboxEmpty(id.clone())));
        };
        let mailbox = self.mailboxes.get_mut(mailbox_id).ok_or(ActionError::NoMailbox)?;
        let letter = self
            .letters
            .get(&mailbox.letter_id)
            .cloned()
            .ok_or_else(|| ActionError::UnknownLetter(mailbox.letter_id.clone()))?;
        mailbox.active = false;
        info!("letter '{}' taken from mailbox '{}'", letter.id, mailbox.id);
        self.notices.push(WorldNotice::LetterTaken {
            letter: letter.title.clone(),
            mailbox: mailbox.id.clone(),
        });
        self.inventory.add(letter.clone());
        Ok(letter)
    }

    /// Talk to an NPC in the current scene.
    ///
    /// The talk counts toward matching tasks first. A recipient who already has their letter
    /// says their "already given" lines; anyone else says their opening lines and then the
    /// letter bag opens for them.
    ///
    /// # Errors
    /// The player is busy or nobody here matches `query`.
    pub fn interact(&mut self, query: &str) -> Result<DialogueStep<DialogueCompletion>, ActionError> {
        self.ensure_free()?;
        let scene = self.current_scene().unwrap_or_default();
        let npc = select_npc(&self.npcs, scene, query)
            .cloned()
            .ok_or_else(|| ActionError::NpcNotHere(query.trim().to_string()))?;
        info!("talked to NPC \"{}\" ({}, house {})", npc.name, npc.id, npc.house_id);

        let mut effects = WorldEffects {
            objects: &mut self.objects,
            notices: &mut self.notices,
            pending_scene: &mut self.pending_scene,
        };
        self.tracker.notify_talk(&npc.name, Some(npc.house_id), &mut effects);

        let step = if self.ledger.is_delivered(npc.house_id) {
            self.dialogue.start(npc.already_given_lines, None, Some(npc.name))
        } else {
            let offer = DialogueCompletion::OfferDelivery { npc_id: npc.id };
            self.dialogue.start(npc.start_lines, Some(offer), Some(npc.name))
        };
        let step = self.handle_step(step);
        self.apply_pending_scene();
        Ok(step)
    }

    /// The "advance" input for dialogue.
    pub fn advance_dialogue(&mut self) -> DialogueStep<DialogueCompletion> {
        if self.is_paused() {
            return DialogueStep::Inactive;
        }
        let step = self.dialogue.advance();
        self.handle_step(step)
    }

    /// Give carried letter `index` to the recipient the bag is open for.
    ///
    /// Returns whether the delivery went through. Either way the bag closes and the NPC
    /// reacts.
    ///
    /// # Errors
    /// Paused, no open bag, or no letter at `index`. The bag stays open on error.
    pub fn give_letter(&mut self, index: usize) -> Result<bool, ActionError> {
        if self.is_paused() {
            return Err(ActionError::Paused);
        }
        let window = self.window.clone().ok_or(ActionError::NoWindow)?;
        let letter = self
            .inventory
            .get(index)
            .cloned()
            .ok_or(ActionError::NoSuchLetter(index))?;

        let delivered = self.ledger.attempt_deliver(Some(&letter), window.recipient);
        if delivered {
            self.inventory.remove(&letter.id);
            let mut effects = WorldEffects {
                objects: &mut self.objects,
                notices: &mut self.notices,
                pending_scene: &mut self.pending_scene,
            };
            self.tracker.notify_delivery(window.recipient, Some(&letter), &mut effects);
        }
        self.close_window(if delivered { WindowClose::Delivered } else { WindowClose::Refused });

        if let Some(npc) = self.npcs.get(&window.npc_id) {
            let lines = npc.delivery_reaction(delivered).to_vec();
            let step = self.dialogue.start(lines, None, Some(npc.name.clone()));
            self.handle_step(step);
        }
        self.apply_pending_scene();
        Ok(delivered)
    }

    /// Close the letter bag without giving anything.
    ///
    /// # Errors
    /// Paused or no open bag.
    pub fn cancel_delivery(&mut self) -> Result<(), ActionError> {
        if self.is_paused() {
            return Err(ActionError::Paused);
        }
        if self.window.is_none() {
            return Err(ActionError::NoWindow);
        }
        self.close_window(WindowClose::Cancelled);
        Ok(())
    }

    /// Start a scene transition.
    ///
    /// # Errors
    /// Paused, mid-conversation, movement locked, or the scene changer refused the request.
    pub fn travel(&mut self, target: &SceneTarget) -> Result<(), ActionError> {
        if self.is_paused() {
            return Err(ActionError::Paused);
        }
        if self.dialogue.is_active() {
            return Err(ActionError::DialogueActive);
        }
        if self.movement_locked() {
            return Err(ActionError::MovementLocked);
        }
        let wrap = self.config.wrap_scenes;
        match target {
            SceneTarget::Named(query) => {
                let index = self
                    .find_scene(query)
                    .ok_or_else(|| SceneError::UnknownScene(query.clone()))?;
                self.scenes.load_scene(index)?;
            },
            SceneTarget::Next => self.scenes.load_next(wrap)?,
            SceneTarget::Previous => self.scenes.load_previous(wrap)?,
        }
        Ok(())
    }

    /// Add to a task's counter directly (for custom tasks).
    pub fn increment_task(&mut self, task_id: &str, amount: u32) {
        let mut effects = WorldEffects {
            objects: &mut self.objects,
            notices: &mut self.notices,
            pending_scene: &mut self.pending_scene,
        };
        self.tracker.increment(task_id, amount, &mut effects);
        self.apply_pending_scene();
    }

    /// Advance dialogue typing, scene fades and music by `dt` seconds. Frozen while paused.
    pub fn tick(&mut self, dt: f32) {
        if self.is_paused() {
            return;
        }
        self.dialogue.tick(dt);
        self.scenes.tick(dt);
        for event in self.scenes.drain_events() {
            self.on_scene_event(event);
        }
        self.bgm.tick(dt);
    }

    /// True when nothing is animating.
    pub fn is_settled(&self) -> bool {
        self.is_paused() || !(self.scenes.is_loading() || self.dialogue.is_typing() || self.bgm.is_fading())
    }

    /// Take the notices produced since the last drain.
    pub fn drain_notices(&mut self) -> Vec<WorldNotice> {
        std::mem::take(&mut self.notices)
    }

    fn ensure_free(&self) -> Result<(), ActionError> {
        if self.is_paused() {
            Err(ActionError::Paused)
        } else if self.dialogue.is_active() {
            Err(ActionError::DialogueActive)
        } else if self.window.is_some() {
            Err(ActionError::WindowOpen)
        } else {
            Ok(())
        }
    }

    fn find_scene(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        let lower = query.to_lowercase();
        self.scenes.index_of(query).or_else(|| {
            self.scenes.scenes().iter().position(|id| {
                self.scene_info
                    .get(id)
                    .is_some_and(|info| info.name.to_lowercase() == lower)
            })
        })
    }

    fn handle_step(&mut self, step: DialogueStep<DialogueCompletion>) -> DialogueStep<DialogueCompletion> {
        if let DialogueStep::Finished(Some(DialogueCompletion::OfferDelivery { npc_id })) = &step {
            self.open_window(npc_id);
        }
        step
    }

    fn open_window(&mut self, npc_id: &str) {
        let Some(npc) = self.npcs.get(npc_id) else {
            warn!("delivery offered by unknown NPC '{npc_id}'");
            return;
        };
        if self.scenes.is_loading() || self.current_scene() != Some(npc.scene.as_str()) {
            warn!("letter bag for {} not opened: player is no longer in '{}'", npc.name, npc.scene);
            return;
        }
        info!("letter bag opened for {} (house {})", npc.name, npc.house_id);
        self.notices.push(WorldNotice::DeliveryOpened { npc: npc.name.clone() });
        self.window = Some(DeliveryWindow {
            npc_id: npc.id.clone(),
            npc_name: npc.name.clone(),
            recipient: npc.house_id,
            scene: npc.scene.clone(),
        });
    }

    fn close_window(&mut self, reason: WindowClose) {
        if let Some(window) = self.window.take() {
            info!("letter bag for {} closed ({reason:?})", window.npc_name);
            self.notices.push(WorldNotice::DeliveryClosed {
                npc: window.npc_name,
                reason,
            });
        }
    }

    fn apply_pending_scene(&mut self) {
        if let Some(scene) = self.pending_scene.take()
            && let Err(err) = self.scenes.load_scene_by_name(&scene)
        {
            warn!("scene load '{scene}' requested by a task failed: {err}");
        }
    }

    /// Whether the running dialogue ends by offering a delivery to someone in `scene`.
    fn offer_pending_in(&self, scene: &str) -> bool {
        match self.dialogue.pending_completion() {
            Some(DialogueCompletion::OfferDelivery { npc_id }) => {
                self.npcs.get(npc_id).is_none_or(|npc| npc.scene == scene)
            },
            None => false,
        }
    }

    fn on_scene_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::BeforeChange { name: Some(old), .. } => {
                if self.window.as_ref().is_some_and(|window| window.scene == old) {
                    self.close_window(WindowClose::ForceClosed);
                }
                if self.offer_pending_in(&old) {
                    info!("conversation in '{old}' dropped by scene change");
                    self.dialogue.cancel();
                }
            },
            SceneEvent::BeforeChange { name: None, .. } => {},
            SceneEvent::AfterLoad { name, .. } => {
                let info = self.scene_info.get(&name).cloned().unwrap_or_default();
                self.notices.push(WorldNotice::SceneEntered {
                    scene: name.clone(),
                    name: if info.name.is_empty() { name } else { info.name },
                });
                if let Some(clip) = info.bgm {
                    self.bgm.change(&clip);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::campaign::build_world;
    use courier_data::{
        CampaignDef, GameDef, LetterDef, MailboxDef, NpcDef, SceneDef, SceneObjectDef, TaskDef, TaskKind,
    };

    fn campaign() -> CampaignDef {
        CampaignDef {
            game: GameDef {
                title: "Test Route".into(),
                ..GameDef::default()
            },
            scenes: vec![
                SceneDef {
                    id: "village".into(),
                    name: "Village".into(),
                    desc: String::new(),
                    bgm: Some("village_theme".into()),
                },
                SceneDef {
                    id: "harbor".into(),
                    name: "Harbor".into(),
                    desc: String::new(),
                    bgm: None,
                },
            ],
            objects: vec![SceneObjectDef {
                id: "bridge".into(),
                scene: "village".into(),
                desc: String::new(),
                active: false,
            }],
            letters: vec![LetterDef {
                id: "to_mara".into(),
                house_id: 5,
                title: "For Mara".into(),
                sender: "Post".into(),
                receiver: "Mara".into(),
                content: "Hi".into(),
            }],
            mailboxes: vec![MailboxDef {
                id: "village_box".into(),
                scene: "village".into(),
                letter: "to_mara".into(),
            }],
            npcs: vec![NpcDef {
                id: "mara".into(),
                name: "Mara".into(),
                scene: "village".into(),
                house_id: 5,
                desc: String::new(),
                start_lines: vec!["Hello".into()],
                after_success_lines: vec!["Thanks".into()],
                after_fail_lines: vec!["Not mine".into()],
                already_given_lines: vec!["Got it already".into()],
            }],
            tasks: vec![Some(TaskDef {
                id: "deliver_mara".into(),
                title: "Deliver to Mara".into(),
                kind: TaskKind::DeliverLetters,
                house_id: Some(5),
                activate_on_complete: vec!["bridge".into()],
                ..TaskDef::default()
            })],
            bindings: Vec::new(),
        }
    }

    fn settle(world: &mut CourierWorld) {
        let mut ticks = 0;
        while !world.is_settled() && ticks < 10_000 {
            world.tick(1.0 / 60.0);
            ticks += 1;
        }
    }

    fn started_world() -> CourierWorld {
        let mut world = build_world(&campaign(), EngineConfig::default()).expect("campaign builds");
        settle(&mut world);
        world
    }

    fn finish_dialogue(world: &mut CourierWorld) {
        while world.dialogue().is_active() {
            world.advance_dialogue();
        }
    }

    #[test]
    fn pickup_empties_mailbox() {
        let mut world = started_world();
        let letter = world.pickup_letter(None).expect("mailbox has a letter");
        assert_eq!(letter.id, "to_mara");
        assert_eq!(world.inventory.len(), 1);
        assert_eq!(
            world.pickup_letter(Some("village")),
            Err(ActionError::MailboxEmpty("village_box".into()))
        );
        assert_eq!(world.pickup_letter(Some("nowhere")), Err(ActionError::NoMailbox));
    }

    #[test]
    fn talking_opens_the_bag_after_lines() {
        let mut world = started_world();
        world.interact("mara").expect("Mara is here");
        assert!(world.delivery_window().is_none());
        assert_eq!(world.pickup_letter(None), Err(ActionError::DialogueActive));
        finish_dialogue(&mut world);
        assert_eq!(world.delivery_window().map(|w| w.recipient), Some(5));
        assert!(world.movement_locked());
        assert_eq!(
            world.travel(&SceneTarget::Named("harbor".into())),
            Err(ActionError::MovementLocked)
        );
    }

    #[test]
    fn successful_delivery_completes_task_and_toggles_object() {
        let mut world = started_world();
        world.pickup_letter(None).expect("letter");
        world.interact("mara").expect("Mara is here");
        finish_dialogue(&mut world);
        world.drain_notices();

        assert_eq!(world.give_letter(0), Ok(true));
        assert!(world.inventory.is_empty());
        assert!(world.ledger.is_delivered(5));
        assert!(world.tracker.is_completed("deliver_mara"));
        assert!(world.objects.is_active("bridge"));
        assert!(world.delivery_window().is_none());
        assert_eq!(world.dialogue().full_line(), "Thanks");

        let notices = world.drain_notices();
        assert!(notices.contains(&WorldNotice::ObjectChanged {
            object: "bridge".into(),
            active: true
        }));
        assert!(notices.contains(&WorldNotice::DeliveryClosed {
            npc: "Mara".into(),
            reason: WindowClose::Delivered
        }));

        finish_dialogue(&mut world);
        world.interact("mara").expect("Mara is here");
        assert_eq!(world.dialogue().full_line(), "Got it already");
    }

    #[test]
    fn missing_letter_index_keeps_bag_open() {
        let mut world = started_world();
        world.interact("mara").expect("Mara is here");
        finish_dialogue(&mut world);
        assert_eq!(world.give_letter(0), Err(ActionError::NoSuchLetter(0)));
        assert!(world.delivery_window().is_some());
        assert_eq!(world.cancel_delivery(), Ok(()));
        assert_eq!(world.cancel_delivery(), Err(ActionError::NoWindow));
    }

    #[test]
    fn pause_freezes_actions() {
        let mut world = started_world();
        assert!(world.toggle_pause());
        assert_eq!(world.input_map(), InputMap::Ui);
        assert_eq!(world.interact("mara"), Err(ActionError::Paused));
        assert!(!world.toggle_pause());
        assert!(world.interact("mara").is_ok());
    }

    #[test]
    fn travel_plays_scene_music() {
        let mut world = started_world();
        assert_eq!(world.current_scene(), Some("village"));
        assert_eq!(world.bgm.clip(), Some("village_theme"));
        world.travel(&SceneTarget::Named("Harbor".into())).expect("known scene");
        settle(&mut world);
        assert_eq!(world.current_scene(), Some("harbor"));
        assert_eq!(
            world.travel(&SceneTarget::Named("moon".into())),
            Err(ActionError::Scene(SceneError::UnknownScene("moon".into())))
        );
    }

    fn campaign_with_scene_jump() -> CampaignDef {
        let mut def = campaign();
        def.tasks = vec![Some(TaskDef {
            id: "greet_mara".into(),
            title: "Greet Mara".into(),
            kind: TaskKind::TalkToNpc,
            npc_name: Some("Mara".into()),
            scene_to_load: Some("harbor".into()),
            ..TaskDef::default()
        })];
        def
    }

    #[test]
    fn travel_waits_for_the_conversation() {
        let mut world = started_world();
        world.interact("mara").expect("Mara is here");
        assert_eq!(world.travel(&SceneTarget::Next), Err(ActionError::DialogueActive));
        settle(&mut world);
        assert_eq!(world.current_scene(), Some("village"));

        finish_dialogue(&mut world);
        assert_eq!(world.delivery_window().map(|w| w.scene.as_str()), Some("village"));
    }

    #[test]
    fn task_scene_change_ends_the_offer() {
        let mut world = build_world(&campaign_with_scene_jump(), EngineConfig::default()).expect("campaign builds");
        settle(&mut world);
        world.interact("mara").expect("Mara is here");
        assert!(world.tracker.is_completed("greet_mara"));
        assert!(world.scenes.is_loading());

        settle(&mut world);
        assert_eq!(world.current_scene(), Some("harbor"));
        assert!(!world.dialogue().is_active());
        finish_dialogue(&mut world);
        assert!(world.delivery_window().is_none());
        assert!(!world.movement_locked());
    }

    #[test]
    fn bag_stays_shut_when_dialogue_ends_mid_transition() {
        let mut world = build_world(&campaign_with_scene_jump(), EngineConfig::default()).expect("campaign builds");
        settle(&mut world);
        world.interact("mara").expect("Mara is here");
        finish_dialogue(&mut world);
        assert!(world.delivery_window().is_none());

        settle(&mut world);
        assert_eq!(world.current_scene(), Some("harbor"));
        assert!(world.delivery_window().is_none());
    }
}

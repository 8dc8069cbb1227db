use serde::{Deserialize, Serialize};

/// Stable identifier used across `CampaignDef` references.
pub type Id = String;

/// Integer key identifying a delivery recipient (a house), distinct from an NPC's display name.
pub type HouseId = i32;

/// Top-level authored campaign loaded by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CampaignDef {
    pub game: GameDef,
    #[serde(default)]
    pub scenes: Vec<SceneDef>,
    #[serde(default)]
    pub objects: Vec<SceneObjectDef>,
    #[serde(default)]
    pub letters: Vec<LetterDef>,
    #[serde(default)]
    pub mailboxes: Vec<MailboxDef>,
    #[serde(default)]
    pub npcs: Vec<NpcDef>,
    /// Ordered task list. Empty slots (`None`) are tolerated and skipped at load.
    #[serde(default)]
    pub tasks: Vec<Option<TaskDef>>,
    #[serde(default)]
    pub bindings: Vec<TaskSceneBindingDef>,
}

/// Campaign-level metadata and startup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDef {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub intro: String,
    /// Only one task is active at a time when set.
    #[serde(default = "default_sequential")]
    pub sequential: bool,
    /// Index of the first active task in sequential mode (clamped into range).
    #[serde(default)]
    pub start_index: i64,
    /// Index into `scenes` of the scene the player starts in (clamped into range).
    #[serde(default)]
    pub start_scene: i64,
}

fn default_sequential() -> bool {
    true
}

impl Default for GameDef {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            author: String::new(),
            version: String::new(),
            intro: String::new(),
            sequential: default_sequential(),
            start_index: 0,
            start_scene: 0,
        }
    }
}

/// A scene the player can travel to. Order in the campaign list is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    /// Background music clip started when the scene finishes loading.
    #[serde(default)]
    pub bgm: Option<String>,
}

/// A named scene object whose visibility can be toggled by task completion effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObjectDef {
    pub id: Id,
    pub scene: Id,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A letter the player can carry and deliver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterDef {
    pub id: Id,
    /// The house this letter is addressed to. The only thing a delivery checks.
    pub house_id: HouseId,
    pub title: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub content: String,
}

/// A mailbox holding a single letter for pickup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxDef {
    pub id: Id,
    pub scene: Id,
    pub letter: Id,
}

/// An NPC that can be talked to and can receive a letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcDef {
    pub id: Id,
    pub name: String,
    pub scene: Id,
    pub house_id: HouseId,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub start_lines: Vec<String>,
    #[serde(default)]
    pub after_success_lines: Vec<String>,
    #[serde(default)]
    pub after_fail_lines: Vec<String>,
    #[serde(default)]
    pub already_given_lines: Vec<String>,
}

/// What kind of gameplay signal advances a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    DeliverLetters,
    TalkToNpc,
    /// Advanced only through explicit increments.
    #[default]
    Custom,
}

/// Authored task definition. Scene-independent; scene-local effects go in bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDef {
    /// Must be unique and non-empty to be tracked.
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: TaskKind,
    /// Values below 1 are treated as 1.
    #[serde(default = "default_target")]
    pub target_count: i32,
    /// Recipient filter for deliveries and talks.
    #[serde(default)]
    pub house_id: Option<HouseId>,
    /// NPC name filter for talks.
    #[serde(default)]
    pub npc_name: Option<String>,
    #[serde(default)]
    pub activate_on_complete: Vec<Id>,
    #[serde(default)]
    pub deactivate_on_complete: Vec<Id>,
    #[serde(default)]
    pub scene_to_load: Option<Id>,
    /// Message shown when the task completes.
    #[serde(default)]
    pub on_complete: Option<String>,
}

fn default_target() -> i32 {
    1
}

impl Default for TaskDef {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            kind: TaskKind::default(),
            target_count: default_target(),
            house_id: None,
            npc_name: None,
            activate_on_complete: Vec::new(),
            deactivate_on_complete: Vec::new(),
            scene_to_load: None,
            on_complete: None,
        }
    }
}

/// Scene-local completion effects for a task, matched by task id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskSceneBindingDef {
    pub task_id: Id,
    #[serde(default)]
    pub activate_on_complete: Vec<Id>,
    #[serde(default)]
    pub deactivate_on_complete: Vec<Id>,
}

use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in a `CampaignDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
    /// Problem in task data. Tasks are designer-authored and tolerated at runtime.
    TaskWarning { task: String, context: String },
}

impl ValidationError {
    /// Whether the campaign can't be built at all with this problem present.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ValidationError::TaskWarning { .. })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
            ValidationError::TaskWarning { task, context } => {
                write!(f, "task '{task}': {context}")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a `CampaignDef`.
///
/// ```
/// use courier_data::{CampaignDef, GameDef, SceneDef, validate_campaign};
///
/// let campaign = CampaignDef {
///     game: GameDef {
///         title: "Demo".into(),
///         ..GameDef::default()
///     },
///     scenes: vec![SceneDef {
///         id: "village".into(),
///         name: "Village".into(),
///         desc: String::new(),
///         bgm: None,
///     }],
///     ..CampaignDef::default()
/// };
/// assert!(validate_campaign(&campaign).is_empty());
/// ```
pub fn validate_campaign(campaign: &CampaignDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut scenes = HashSet::new();
    let mut objects = HashSet::new();
    let mut letters = HashSet::new();
    let mut mailboxes = HashSet::new();
    let mut npcs = HashSet::new();

    track_ids(
        "scene",
        campaign.scenes.iter().map(|s| s.id.as_str()),
        &mut scenes,
        &mut errors,
    );
    track_ids(
        "object",
        campaign.objects.iter().map(|o| o.id.as_str()),
        &mut objects,
        &mut errors,
    );
    track_ids(
        "letter",
        campaign.letters.iter().map(|l| l.id.as_str()),
        &mut letters,
        &mut errors,
    );
    track_ids(
        "mailbox",
        campaign.mailboxes.iter().map(|m| m.id.as_str()),
        &mut mailboxes,
        &mut errors,
    );
    track_ids("npc", campaign.npcs.iter().map(|n| n.id.as_str()), &mut npcs, &mut errors);

    let tasks: HashSet<&str> = campaign
        .tasks
        .iter()
        .flatten()
        .map(|t| t.id.as_str())
        .filter(|id| !id.is_empty())
        .collect();

    if campaign.scenes.is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "campaign has no scenes".to_string(),
        });
    }

    for object in &campaign.objects {
        check_ref(
            "scene",
            &object.scene,
            &scenes,
            format!("object '{}'", object.id),
            &mut errors,
        );
    }

    for mailbox in &campaign.mailboxes {
        let context = format!("mailbox '{}'", mailbox.id);
        check_ref("scene", &mailbox.scene, &scenes, context.clone(), &mut errors);
        check_ref("letter", &mailbox.letter, &letters, context, &mut errors);
    }

    for npc in &campaign.npcs {
        check_ref("scene", &npc.scene, &scenes, format!("npc '{}'", npc.id), &mut errors);
        if npc.name.trim().is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("npc '{}' has an empty name", npc.id),
            });
        }
    }

    for (idx, slot) in campaign.tasks.iter().enumerate() {
        let Some(task) = slot else {
            errors.push(ValidationError::TaskWarning {
                task: format!("#{idx}"),
                context: "empty task slot".to_string(),
            });
            continue;
        };
        validate_task(task, idx, &scenes, &objects, &mut errors);
    }

    for binding in &campaign.bindings {
        if !tasks.contains(binding.task_id.as_str()) {
            errors.push(ValidationError::TaskWarning {
                task: binding.task_id.clone(),
                context: "scene binding references no known task".to_string(),
            });
        }
        for object in binding.activate_on_complete.iter().chain(&binding.deactivate_on_complete) {
            warn_missing_object(&binding.task_id, object, &objects, "binding", &mut errors);
        }
    }

    errors
}

fn validate_task(
    task: &TaskDef,
    idx: usize,
    scenes: &HashSet<String>,
    objects: &HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    let label = if task.id.is_empty() {
        format!("#{idx}")
    } else {
        task.id.clone()
    };
    if task.id.trim().is_empty() {
        errors.push(ValidationError::TaskWarning {
            task: label.clone(),
            context: format!("task '{}' has no id and will not be tracked", task.title),
        });
    }
    if task.target_count < 1 {
        errors.push(ValidationError::TaskWarning {
            task: label.clone(),
            context: format!("target count {} will be treated as 1", task.target_count),
        });
    }
    if task.kind == TaskKind::Custom && (task.house_id.is_some() || task.npc_name.is_some()) {
        errors.push(ValidationError::TaskWarning {
            task: label.clone(),
            context: "custom task filters are never consulted".to_string(),
        });
    }
    if let Some(scene) = &task.scene_to_load
        && !scenes.contains(scene)
    {
        errors.push(ValidationError::TaskWarning {
            task: label.clone(),
            context: format!("scene to load '{scene}' does not exist"),
        });
    }
    for object in task.activate_on_complete.iter().chain(&task.deactivate_on_complete) {
        warn_missing_object(&label, object, objects, "task", errors);
    }
}

fn warn_missing_object(
    task: &str,
    object: &str,
    objects: &HashSet<String>,
    source: &str,
    errors: &mut Vec<ValidationError>,
) {
    if !objects.contains(object) {
        errors.push(ValidationError::TaskWarning {
            task: task.to_string(),
            context: format!("{source} toggles unknown object '{object}'"),
        });
    }
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if !set.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, set: &HashSet<String>, context: String, errors: &mut Vec<ValidationError>) {
    if !set.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: &str) -> SceneDef {
        SceneDef {
            id: id.to_string(),
            name: format!("Scene {id}"),
            desc: String::new(),
            bgm: None,
        }
    }

    fn letter(id: &str, house_id: HouseId) -> LetterDef {
        LetterDef {
            id: id.to_string(),
            house_id,
            title: format!("Letter {id}"),
            sender: "Postmaster".into(),
            receiver: "Resident".into(),
            content: String::new(),
        }
    }

    fn base_campaign() -> CampaignDef {
        CampaignDef {
            game: GameDef {
                title: "Demo".into(),
                ..GameDef::default()
            },
            scenes: vec![scene("village")],
            letters: vec![letter("l5", 5)],
            ..CampaignDef::default()
        }
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let mut campaign = base_campaign();
        campaign.letters = vec![letter("same", 1), letter("same", 2)];

        let errors = validate_campaign(&campaign);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ValidationError::DuplicateId { kind, id } if *kind == "letter" && id == "same"))
        );
    }

    #[test]
    fn missing_letter_reference_is_fatal() {
        let mut campaign = base_campaign();
        campaign.mailboxes = vec![MailboxDef {
            id: "box".into(),
            scene: "village".into(),
            letter: "missing".into(),
        }];

        let errors = validate_campaign(&campaign);
        let missing = errors
            .iter()
            .find(|err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "letter" && id == "missing"))
            .expect("missing letter reported");
        assert!(missing.is_fatal());
    }

    #[test]
    fn task_problems_are_warnings_only() {
        let mut campaign = base_campaign();
        campaign.tasks = vec![
            None,
            Some(TaskDef {
                id: String::new(),
                title: "Nameless".into(),
                ..TaskDef::default()
            }),
            Some(TaskDef {
                id: "deliver".into(),
                kind: TaskKind::DeliverLetters,
                target_count: 0,
                scene_to_load: Some("nowhere".into()),
                activate_on_complete: vec!["ghost".into()],
                ..TaskDef::default()
            }),
        ];
        campaign.bindings = vec![TaskSceneBindingDef {
            task_id: "unknown".into(),
            ..TaskSceneBindingDef::default()
        }];

        let errors = validate_campaign(&campaign);
        assert_eq!(errors.len(), 6);
        assert!(errors.iter().all(|err| !err.is_fatal()));
    }

    #[test]
    fn campaign_without_scenes_is_invalid() {
        let mut campaign = base_campaign();
        campaign.scenes.clear();
        let errors = validate_campaign(&campaign);
        assert!(errors.iter().any(|err| matches!(err, ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn defaults_fill_omitted_task_fields() {
        let task: TaskDef = ron::from_str(r#"(id: "t", kind: DeliverLetters)"#).expect("parse task");
        assert_eq!(task.target_count, 1);
        assert!(task.house_id.is_none());
        assert!(task.activate_on_complete.is_empty());

        let game: GameDef = ron::from_str(r#"(title: "T")"#).expect("parse game");
        assert!(game.sequential);
    }
}

//! module: task
//!
//! Runtime task definitions and their scene-local completion bindings.

use courier_data::{HouseId, TaskDef, TaskSceneBindingDef};
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub use courier_data::TaskKind;

/// A unit of quest progress. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: TaskKind,
    /// Always at least 1.
    pub target: u32,
    pub house_filter: Option<HouseId>,
    pub npc_filter: Option<String>,
    pub activate_on_complete: Vec<String>,
    pub deactivate_on_complete: Vec<String>,
    pub scene_to_load: Option<String>,
    pub on_complete: Option<String>,
}

impl Task {
    /// Build a runtime task from its authored definition.
    ///
    /// Returns `None` for definitions without an id; those can't be tracked.
    pub fn from_def(def: &TaskDef) -> Option<Task> {
        let id = def.id.trim();
        if id.is_empty() {
            return None;
        }
        Some(Task {
            id: id.to_string(),
            title: def.title.clone(),
            description: def.description.clone(),
            kind: def.kind,
            target: clamp_target(def.target_count),
            house_filter: def.house_id,
            npc_filter: def.npc_name.clone().filter(|name| !name.trim().is_empty()),
            activate_on_complete: def.activate_on_complete.clone(),
            deactivate_on_complete: def.deactivate_on_complete.clone(),
            scene_to_load: def.scene_to_load.clone().filter(|scene| !scene.trim().is_empty()),
            on_complete: def.on_complete.clone(),
        })
    }

    /// Whether a delivery to `recipient` counts toward this task.
    pub fn accepts_delivery(&self, recipient: HouseId) -> bool {
        self.kind == TaskKind::DeliverLetters && self.house_filter.is_none_or(|house| house == recipient)
    }

    /// Whether talking to `npc_name` (optionally at `house`) counts toward this task.
    ///
    /// A house filter wins when both the task and the event carry a house. Otherwise the name
    /// filter decides, and a task with neither filter accepts any talk.
    pub fn accepts_talk(&self, npc_name: &str, house: Option<HouseId>) -> bool {
        if self.kind != TaskKind::TalkToNpc {
            return false;
        }
        match (self.house_filter, house, &self.npc_filter) {
            (Some(wanted), Some(actual), _) => wanted == actual,
            (_, _, Some(name)) => name == npc_name,
            _ => true,
        }
    }
}

/// Scene-local objects to toggle when a task completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBinding {
    pub task_id: String,
    pub activate_on_complete: Vec<String>,
    pub deactivate_on_complete: Vec<String>,
}

impl From<&TaskSceneBindingDef> for SceneBinding {
    fn from(def: &TaskSceneBindingDef) -> Self {
        Self {
            task_id: def.task_id.trim().to_string(),
            activate_on_complete: def.activate_on_complete.clone(),
            deactivate_on_complete: def.deactivate_on_complete.clone(),
        }
    }
}

/// Ordered task definitions plus their scene bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRegistry {
    pub tasks: Vec<Task>,
    pub bindings: Vec<SceneBinding>,
}

impl TaskRegistry {
    /// Build a registry from authored data, skipping empty slots and id-less definitions.
    pub fn from_defs(defs: &[Option<TaskDef>], bindings: &[TaskSceneBindingDef]) -> TaskRegistry {
        let mut tasks = Vec::with_capacity(defs.len());
        for (idx, slot) in defs.iter().enumerate() {
            let Some(def) = slot else {
                warn!("task slot #{idx} is empty; skipping");
                continue;
            };
            match Task::from_def(def) {
                Some(task) => tasks.push(task),
                None => warn!("task '{}' (slot #{idx}) has no id; it will not be tracked", def.title),
            }
        }
        let bindings = bindings
            .iter()
            .map(SceneBinding::from)
            .filter(|binding| !binding.task_id.is_empty())
            .collect::<Vec<_>>();
        info!("{} tasks and {} scene bindings registered", tasks.len(), bindings.len());
        TaskRegistry { tasks, bindings }
    }

    /// First definition carrying `task_id`.
    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// First scene binding for `task_id`.
    pub fn binding_for(&self, task_id: &str) -> Option<&SceneBinding> {
        self.bindings.iter().find(|binding| binding.task_id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Authored targets below 1 count as 1.
pub fn clamp_target(target_count: i32) -> u32 {
    u32::try_from(target_count.max(1)).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn talk_task(house: Option<HouseId>, name: Option<&str>) -> Task {
        Task::from_def(&TaskDef {
            id: "talk".into(),
            kind: TaskKind::TalkToNpc,
            house_id: house,
            npc_name: name.map(str::to_string),
            ..TaskDef::default()
        })
        .expect("task has id")
    }

    #[test]
    fn registry_skips_empty_slots_and_blank_ids() {
        let defs = vec![
            None,
            Some(TaskDef {
                id: String::new(),
                ..TaskDef::default()
            }),
            Some(TaskDef {
                id: "kept".into(),
                ..TaskDef::default()
            }),
        ];
        let bindings = vec![TaskSceneBindingDef {
            task_id: "kept".into(),
            activate_on_complete: vec!["gate".into()],
            ..TaskSceneBindingDef::default()
        }];
        let registry = TaskRegistry::from_defs(&defs, &bindings);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("kept").is_some());
        assert_eq!(
            registry.binding_for("kept").map(|b| b.activate_on_complete.clone()),
            Some(vec!["gate".to_string()])
        );
    }

    #[test]
    fn empty_id_is_not_tracked() {
        let def = TaskDef {
            id: "   ".into(),
            ..TaskDef::default()
        };
        assert!(Task::from_def(&def).is_none());
    }

    #[test]
    fn non_positive_targets_clamp_to_one() {
        assert_eq!(clamp_target(0), 1);
        assert_eq!(clamp_target(-4), 1);
        assert_eq!(clamp_target(3), 3);
    }

    #[test]
    fn talk_house_filter_beats_name_filter() {
        let task = talk_task(Some(5), Some("Mara"));
        assert!(task.accepts_talk("Someone Else", Some(5)));
        assert!(!task.accepts_talk("Mara", Some(7)));
        // no house on the event: fall back to the name
        assert!(task.accepts_talk("Mara", None));
        assert!(!task.accepts_talk("Jon", None));
    }

    #[test]
    fn unfiltered_talk_task_accepts_anyone() {
        let task = talk_task(None, None);
        assert!(task.accepts_talk("anyone", None));
        assert!(task.accepts_talk("anyone", Some(3)));
    }

    #[test]
    fn delivery_filter_checks_recipient() {
        let task = Task::from_def(&TaskDef {
            id: "deliver".into(),
            kind: TaskKind::DeliverLetters,
            house_id: Some(5),
            ..TaskDef::default()
        })
        .expect("task has id");
        assert!(task.accepts_delivery(5));
        assert!(!task.accepts_delivery(7));
        assert!(!talk_task(None, None).accepts_delivery(5));
    }
}

//! Task progress tracker
//!
//! Owns the progress counters and the completed set for every registered task and drives
//! sequential activation. All state changes are reported on the tracker's [`TaskEventBus`].
//!
//! Gameplay signals (a letter delivered, an NPC talked to) are matched against the registry
//! here. Each notification increments any given task id at most once, even when several
//! definitions share that id. Completion side effects (object toggles, the completion hook,
//! a scene load request) go out through the [`SceneEffects`] collaborator passed into each
//! call.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use courier_data::HouseId;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::events::{SubscriptionId, TaskEvent, TaskEventBus, TaskObserver};
use crate::letter::Letter;
use crate::task::{Task, TaskKind, TaskRegistry};

/// Host-side effects of a task completing.
pub trait SceneEffects {
    /// Show or hide a named scene object.
    fn set_object_active(&mut self, object_id: &str, active: bool);
    /// Completion hook, called once per completed task after object toggles.
    fn task_completed(&mut self, task: &Task) {
        let _ = task;
    }
    /// Ask the host to move to another scene.
    fn request_scene_load(&mut self, scene: &str);
}

/// Effects sink that only logs. For hosts (and tests) with no scene to touch.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEffects;

impl SceneEffects for NoEffects {
    fn set_object_active(&mut self, object_id: &str, active: bool) {
        debug!("ignored object toggle '{object_id}' -> {active}");
    }
    fn request_scene_load(&mut self, scene: &str) {
        debug!("ignored scene load request '{scene}'");
    }
}

/// Counters and the write-once completed set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    counters: BTreeMap<String, u32>,
    completed: BTreeSet<String>,
}

impl ProgressState {
    pub fn progress(&self, task_id: &str) -> u32 {
        self.counters.get(task_id).copied().unwrap_or(0)
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.completed.contains(task_id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

/// Quest progression engine.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskProgressTracker {
    registry: TaskRegistry,
    sequential: bool,
    state: ProgressState,
    active_index: Option<usize>,
    all_completed_emitted: bool,
    #[serde(skip)]
    bus: TaskEventBus,
}

impl TaskProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all progress and load `registry`.
    ///
    /// In sequential mode `start_index` is clamped into range and that task is activated.
    /// Otherwise every task is announced as active. Subscribed observers stay subscribed and
    /// hear the activation events.
    pub fn initialize(&mut self, registry: TaskRegistry, sequential: bool, start_index: i64) {
        self.registry = registry;
        self.sequential = sequential;
        self.state = ProgressState::default();
        self.active_index = None;
        self.all_completed_emitted = false;

        for task in &self.registry.tasks {
            self.state.counters.entry(task.id.clone()).or_insert(0);
        }
        info!(
            "task tracker initialized: {} tasks, {} mode",
            self.registry.len(),
            if sequential { "sequential" } else { "free" }
        );

        if sequential {
            if self.registry.is_empty() {
                return;
            }
            let last = i64::try_from(self.registry.len() - 1).unwrap_or(i64::MAX);
            let index = usize::try_from(start_index.clamp(0, last)).unwrap_or(0);
            self.active_index = Some(index);
            self.activate(index);
        } else {
            let announcements = self
                .registry
                .tasks
                .iter()
                .map(|task| TaskEvent::Activated {
                    id: task.id.clone(),
                    title: task.title.clone(),
                    target: task.target,
                })
                .collect::<Vec<_>>();
            for event in &announcements {
                self.bus.emit(event);
            }
        }
    }

    /// Add `amount` to a task's counter, completing it when the target is reached.
    ///
    /// Unknown ids, completed tasks and zero amounts are ignored without emitting anything.
    pub fn increment(&mut self, task_id: &str, amount: u32, effects: &mut dyn SceneEffects) {
        let Some(target) = self.registry.get(task_id).map(|task| task.target) else {
            debug!("increment for unknown task '{task_id}' ignored");
            return;
        };
        if self.state.is_completed(task_id) {
            debug!("increment for completed task '{task_id}' ignored");
            return;
        }
        if amount == 0 {
            debug!("zero increment for task '{task_id}' ignored");
            return;
        }

        let counter = self.state.counters.entry(task_id.to_string()).or_insert(0);
        let current = counter.saturating_add(amount).min(target);
        *counter = current;
        info!("task progress: {task_id} -> {current}/{target}");
        self.bus.emit(&TaskEvent::Progress {
            id: task_id.to_string(),
            current,
            target,
        });

        if current >= target {
            self.complete(task_id, effects);
        }
    }

    /// A letter was delivered to `recipient`.
    ///
    /// Counts toward matching `DeliverLetters` tasks: the active one in sequential mode,
    /// every incomplete one otherwise.
    pub fn notify_delivery(&mut self, recipient: HouseId, letter: Option<&Letter>, effects: &mut dyn SceneEffects) {
        let Some(letter) = letter else {
            return;
        };
        debug!("delivery signal: letter '{}' to house {recipient}", letter.id);
        let matching = self.candidates(|task| task.accepts_delivery(recipient));
        self.increment_each_once(matching, effects);
    }

    /// The player talked to `npc_name`, optionally standing at `house`.
    pub fn notify_talk(&mut self, npc_name: &str, house: Option<HouseId>, effects: &mut dyn SceneEffects) {
        if npc_name.trim().is_empty() && house.is_none() {
            return;
        }
        debug!("talk signal: '{npc_name}' at {house:?}");
        let matching = self.candidates(|task| task.accepts_talk(npc_name, house));
        self.increment_each_once(matching, effects);
    }

    pub fn progress(&self, task_id: &str) -> u32 {
        self.state.progress(task_id)
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.state.is_completed(task_id)
    }

    pub fn is_sequential(&self) -> bool {
        self.sequential
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// The task a HUD should show: the cursor task in sequential mode, otherwise the first
    /// incomplete one (or the first task when everything is done).
    pub fn active_task(&self) -> Option<&Task> {
        if self.sequential {
            return self.active_index.and_then(|idx| self.registry.tasks.get(idx));
        }
        self.registry
            .tasks
            .iter()
            .find(|task| !self.state.is_completed(&task.id))
            .or_else(|| self.registry.tasks.first())
    }

    pub fn all_completed(&self) -> bool {
        self.all_completed_emitted
    }

    pub fn tasks(&self) -> &[Task] {
        &self.registry.tasks
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn subscribe(&mut self, observer: Box<dyn TaskObserver>) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Ids of incomplete tasks a signal may advance, snapshotted before any increment runs.
    fn candidates(&self, accepts: impl Fn(&Task) -> bool) -> Vec<String> {
        let in_scope = |idx: usize| !self.sequential || self.active_index == Some(idx);
        self.registry
            .tasks
            .iter()
            .enumerate()
            .filter(|(idx, task)| in_scope(*idx) && task.kind != TaskKind::Custom && accepts(task))
            .filter(|(_, task)| !self.state.is_completed(&task.id))
            .map(|(_, task)| task.id.clone())
            .collect()
    }

    fn increment_each_once(&mut self, ids: Vec<String>, effects: &mut dyn SceneEffects) {
        let mut incremented = HashSet::new();
        for id in ids {
            if incremented.insert(id.clone()) {
                self.increment(&id, 1, effects);
            }
        }
    }

    fn complete(&mut self, task_id: &str, effects: &mut dyn SceneEffects) {
        if !self.state.completed.insert(task_id.to_string()) {
            return;
        }
        if let Some(task) = self.registry.get(task_id).cloned() {
            self.apply_completion_effects(&task, effects);
            info!("task completed: {} ({})", task.id, task.title);
        }
        self.bus.emit(&TaskEvent::Completed {
            id: task_id.to_string(),
        });

        if self.sequential {
            self.advance_cursor(task_id);
        }
    }

    fn apply_completion_effects(&self, task: &Task, effects: &mut dyn SceneEffects) {
        for object in &task.activate_on_complete {
            effects.set_object_active(object, true);
        }
        for object in &task.deactivate_on_complete {
            effects.set_object_active(object, false);
        }
        if let Some(binding) = self.registry.binding_for(&task.id) {
            for object in &binding.activate_on_complete {
                effects.set_object_active(object, true);
            }
            for object in &binding.deactivate_on_complete {
                effects.set_object_active(object, false);
            }
        }
        effects.task_completed(task);
        if let Some(scene) = &task.scene_to_load {
            effects.request_scene_load(scene);
        }
    }

    /// Move the cursor past a just-completed active task.
    fn advance_cursor(&mut self, completed_id: &str) {
        let Some(active) = self.active_index else {
            return;
        };
        if self.registry.tasks.get(active).is_none_or(|task| task.id != completed_id) {
            return;
        }
        let next = (active + 1..self.registry.len()).find(|&idx| !self.state.is_completed(&self.registry.tasks[idx].id));
        match next {
            Some(idx) => {
                self.active_index = Some(idx);
                self.activate(idx);
            },
            None if !self.all_completed_emitted => {
                self.all_completed_emitted = true;
                info!("all sequential tasks completed");
                self.bus.emit(&TaskEvent::AllCompleted);
            },
            None => {},
        }
    }

    fn activate(&mut self, idx: usize) {
        let Some(task) = self.registry.tasks.get(idx) else {
            return;
        };
        info!("activating task {} - {}", task.id, task.title);
        let activated = TaskEvent::Activated {
            id: task.id.clone(),
            title: task.title.clone(),
            target: task.target,
        };
        let progress = TaskEvent::Progress {
            id: task.id.clone(),
            current: self.state.progress(&task.id),
            target: task.target,
        };
        self.bus.emit(&activated);
        self.bus.emit(&progress);
    }
}

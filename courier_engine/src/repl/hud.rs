//! Task HUD: collects tracker events and prints them after each command.

use std::collections::HashMap;

use colored::Colorize;

use crate::events::{EventLog, SubscriptionId, TaskEvent};
use crate::style::GameStyle;
use crate::world::CourierWorld;

/// Subscribes to a world's tracker and renders what it reports.
///
/// A loaded save is a new world with no observers, so the HUD has to be attached again.
#[derive(Debug, Default)]
pub struct TaskHud {
    log: EventLog,
    subscription: Option<SubscriptionId>,
    titles: HashMap<String, String>,
}

impl TaskHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, world: &mut CourierWorld) {
        self.detach(world);
        self.titles = world
            .tracker
            .tasks()
            .iter()
            .map(|task| (task.id.clone(), task.title.clone()))
            .collect();
        self.subscription = Some(world.tracker.subscribe(Box::new(self.log.clone())));
    }

    pub fn detach(&mut self, world: &mut CourierWorld) {
        if let Some(id) = self.subscription.take() {
            world.tracker.unsubscribe(id);
        }
        self.log.take();
    }

    /// Render and clear pending events.
    pub fn flush(&self) -> Vec<String> {
        self.log.take().iter().filter_map(|event| self.render(event)).collect()
    }

    fn render(&self, event: &TaskEvent) -> Option<String> {
        match event {
            TaskEvent::Activated { title, target, .. } => Some(format!(
                "{} {} {}",
                "New task:".subheading_style(),
                title.task_active_style(),
                format!("(0/{target})").dimmed()
            )),
            // activation re-announces progress; only report real steps
            TaskEvent::Progress { current: 0, .. } => None,
            TaskEvent::Progress { id, current, target } => Some(format!(
                "{} {current}/{target}",
                self.title(id).task_active_style()
            )),
            TaskEvent::Completed { id } => Some(format!(
                "{} {}",
                "Task complete:".subheading_style(),
                self.title(id).task_complete_style()
            )),
            TaskEvent::AllCompleted => Some("Every task is done. The route is complete!".notice_style().bold().to_string()),
        }
    }

    fn title<'a>(&'a self, id: &'a str) -> &'a str {
        self.titles.get(id).map_or(id, String::as_str)
    }
}

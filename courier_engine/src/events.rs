//! Task event bus.
//!
//! The tracker reports every state change as a [`TaskEvent`] on a [`TaskEventBus`]. Observers
//! (the HUD, tests, anything else that wants to react) subscribe explicitly and get back a
//! [`SubscriptionId`] that must be handed back to `unsubscribe` when the observer goes away.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};

/// Notifications emitted by the task tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskEvent {
    Activated { id: String, title: String, target: u32 },
    Progress { id: String, current: u32, target: u32 },
    Completed { id: String },
    AllCompleted,
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskEvent::Activated { id, title, target } => write!(f, "activated {id} \"{title}\" (target {target})"),
            TaskEvent::Progress { id, current, target } => write!(f, "progress {id} {current}/{target}"),
            TaskEvent::Completed { id } => write!(f, "completed {id}"),
            TaskEvent::AllCompleted => write!(f, "all tasks completed"),
        }
    }
}

/// Something that wants to hear about task events.
pub trait TaskObserver {
    fn on_event(&mut self, event: &TaskEvent);
}

/// Handle returned by [`TaskEventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// Ordered list of observers. Events are delivered in subscription order.
#[derive(Default)]
pub struct TaskEventBus {
    observers: Vec<(SubscriptionId, Box<dyn TaskObserver>)>,
    next_id: usize,
}

impl fmt::Debug for TaskEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskEventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TaskEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn TaskObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        debug!("task observer {id:?} subscribed");
        id
    }

    /// Remove an observer. Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        let removed = self.observers.len() != before;
        if removed {
            debug!("task observer {id:?} unsubscribed");
        }
        removed
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn emit(&mut self, event: &TaskEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_event(event);
        }
    }
}

/// Observer that records every event into a shared buffer.
///
/// Clones share the same buffer, so one clone can be subscribed while another is kept for
/// inspection.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<TaskEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<TaskEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl TaskObserver for EventLog {
    fn on_event(&mut self, event: &TaskEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsubscribed_observers_stop_receiving() {
        let mut bus = TaskEventBus::new();
        let first = EventLog::new();
        let second = EventLog::new();
        let first_id = bus.subscribe(Box::new(first.clone()));
        bus.subscribe(Box::new(second.clone()));

        bus.emit(&TaskEvent::Completed { id: "a".into() });
        assert!(bus.unsubscribe(first_id));
        assert!(!bus.unsubscribe(first_id));
        bus.emit(&TaskEvent::AllCompleted);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(bus.observer_count(), 1);
    }

    #[test]
    fn take_drains_the_log() {
        let mut log = EventLog::new();
        log.on_event(&TaskEvent::AllCompleted);
        assert_eq!(log.take(), vec![TaskEvent::AllCompleted]);
        assert!(log.is_empty());
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = TaskEvent::Progress {
            id: "lane".into(),
            current: 1,
            target: 2,
        };
        let json = serde_json::to_value(&event).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({ "type": "progress", "id": "lane", "current": 1, "target": 2 })
        );
        let back: TaskEvent = serde_json::from_value(serde_json::json!({ "type": "allCompleted" })).expect("parses");
        assert_eq!(back, TaskEvent::AllCompleted);
    }
}

//! Scene list, faded scene transitions and toggleable scene objects.

use std::collections::BTreeMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fade::Fade;

/// Reasons a scene change request was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene index {0} is out of range")]
    InvalidIndex(usize),
    #[error("no scene named '{0}'")]
    UnknownScene(String),
    #[error("a scene load is already in progress")]
    LoadInProgress,
    #[error("no current scene")]
    NoCurrentScene,
    #[error("already at the {0} scene")]
    AtEdge(&'static str),
}

/// Notifications from a scene transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// About to leave `index` (None before the first load).
    BeforeChange { index: Option<usize>, name: Option<String> },
    /// Finished loading `index`.
    AfterLoad { index: usize, name: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    FadingOut(Fade),
    Loading,
    FadingIn(Fade),
}

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    target: usize,
    phase: Phase,
}

/// Ordered scene list with a faded, tick-driven transition between entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneChanger {
    scenes: Vec<String>,
    current: Option<usize>,
    #[serde(skip)]
    fade_duration: f32,
    #[serde(skip)]
    lock_during_load: bool,
    #[serde(skip)]
    transition: Option<Transition>,
    #[serde(skip)]
    alpha: f32,
    #[serde(skip)]
    events: Vec<SceneEvent>,
}

impl Default for SceneChanger {
    fn default() -> Self {
        Self::new(Vec::new(), 0.25, true)
    }
}

impl SceneChanger {
    pub fn new(scenes: Vec<String>, fade_duration: f32, lock_during_load: bool) -> Self {
        Self {
            scenes,
            current: None,
            fade_duration: fade_duration.max(0.0),
            lock_during_load,
            transition: None,
            alpha: 0.0,
            events: Vec::new(),
        }
    }

    /// Apply transition settings (they are not saved with the scene list).
    pub fn configure(&mut self, fade_duration: f32, lock_during_load: bool) {
        self.fade_duration = fade_duration.max(0.0);
        self.lock_during_load = lock_during_load;
    }

    /// Begin a transition to scene `index`.
    ///
    /// # Errors
    /// - `InvalidIndex` if `index` is out of range
    /// - `LoadInProgress` if a load is running and loads are locked
    pub fn load_scene(&mut self, index: usize) -> Result<(), SceneError> {
        if index >= self.scenes.len() {
            warn!("load_scene: invalid index {index}");
            return Err(SceneError::InvalidIndex(index));
        }
        if self.lock_during_load && self.is_loading() {
            return Err(SceneError::LoadInProgress);
        }
        info!("scene change requested: {:?} -> {} ({})", self.current, index, self.scenes[index]);
        self.events.push(SceneEvent::BeforeChange {
            index: self.current,
            name: self.current_name().map(str::to_string),
        });
        let phase = if self.fade_duration > 0.0 {
            Phase::FadingOut(Fade::new(self.alpha, 1.0, self.fade_duration))
        } else {
            Phase::Loading
        };
        self.transition = Some(Transition { target: index, phase });
        Ok(())
    }

    /// # Errors
    /// `UnknownScene` if no scene has that name, otherwise as [`Self::load_scene`].
    pub fn load_scene_by_name(&mut self, name: &str) -> Result<(), SceneError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| SceneError::UnknownScene(name.to_string()))?;
        self.load_scene(index)
    }

    /// # Errors
    /// `AtEdge` at the last scene without `wrap`, otherwise as [`Self::load_scene`].
    pub fn load_next(&mut self, wrap: bool) -> Result<(), SceneError> {
        if self.scenes.is_empty() {
            return Err(SceneError::InvalidIndex(0));
        }
        let next = self.current.map_or(0, |idx| idx + 1);
        if next < self.scenes.len() {
            self.load_scene(next)
        } else if wrap {
            self.load_scene(0)
        } else {
            Err(SceneError::AtEdge("last"))
        }
    }

    /// # Errors
    /// `AtEdge` at the first scene without `wrap`, otherwise as [`Self::load_scene`].
    pub fn load_previous(&mut self, wrap: bool) -> Result<(), SceneError> {
        if self.scenes.is_empty() {
            return Err(SceneError::InvalidIndex(0));
        }
        match self.current {
            Some(idx) if idx > 0 => self.load_scene(idx - 1),
            _ if wrap => self.load_scene(self.scenes.len() - 1),
            _ => Err(SceneError::AtEdge("first")),
        }
    }

    /// # Errors
    /// `NoCurrentScene` before the first load, otherwise as [`Self::load_scene`].
    pub fn reload_current(&mut self) -> Result<(), SceneError> {
        let index = self.current.ok_or(SceneError::NoCurrentScene)?;
        self.load_scene(index)
    }

    /// Advance the running transition by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        match &mut transition.phase {
            Phase::FadingOut(fade) => {
                self.alpha = fade.tick(dt);
                if fade.is_finished() {
                    transition.phase = Phase::Loading;
                }
            },
            Phase::Loading => {
                let target = transition.target;
                self.current = Some(target);
                info!("scene loaded: {}", self.scenes[target]);
                if self.fade_duration > 0.0 {
                    transition.phase = Phase::FadingIn(Fade::new(self.alpha, 0.0, self.fade_duration));
                } else {
                    self.alpha = 0.0;
                    self.finish();
                }
            },
            Phase::FadingIn(fade) => {
                self.alpha = fade.tick(dt);
                if fade.is_finished() {
                    self.finish();
                }
            },
        }
    }

    /// Take the notifications produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_loading(&self) -> bool {
        self.transition.is_some()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.and_then(|idx| self.scenes.get(idx)).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.scenes.iter().position(|scene| scene == name)
    }

    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// Overlay opacity: 0.0 clear, 1.0 fully faded.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    fn finish(&mut self) {
        if let Some(transition) = self.transition.take() {
            self.events.push(SceneEvent::AfterLoad {
                index: transition.target,
                name: self.scenes[transition.target].clone(),
            });
        }
    }
}

/// Active flags of named scene objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneObjects {
    objects: BTreeMap<String, SceneObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneObject {
    pub scene: String,
    pub desc: String,
    pub active: bool,
}

impl SceneObjects {
    pub fn insert(&mut self, id: &str, object: SceneObject) {
        self.objects.insert(id.to_string(), object);
    }

    /// Set an object's flag. Unknown objects are ignored.
    pub fn set_active(&mut self, id: &str, active: bool) -> bool {
        match self.objects.get_mut(id) {
            Some(object) => {
                object.active = active;
                info!("scene object '{id}' set {}", if active { "active" } else { "inactive" });
                true
            },
            None => {
                warn!("scene object '{id}' not found; toggle ignored");
                false
            },
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.objects.get(id).is_some_and(|object| object.active)
    }

    /// Active objects located in `scene`.
    pub fn active_in<'a>(&'a self, scene: &'a str) -> impl Iterator<Item = (&'a str, &'a SceneObject)> + 'a {
        self.objects
            .iter()
            .filter(move |(_, object)| object.active && object.scene == scene)
            .map(|(id, object)| (id.as_str(), object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changer(fade: f32) -> SceneChanger {
        SceneChanger::new(vec!["menu".into(), "village".into(), "harbor".into()], fade, true)
    }

    fn run_until_idle(changer: &mut SceneChanger, dt: f32) -> usize {
        let mut ticks = 0;
        while changer.is_loading() && ticks < 1000 {
            changer.tick(dt);
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn faded_load_emits_before_and_after() {
        let mut scenes = changer(0.25);
        scenes.load_scene(1).expect("valid index");
        assert!(scenes.is_loading());
        scenes.tick(0.25);
        assert!((scenes.alpha() - 1.0).abs() < 1e-5);
        run_until_idle(&mut scenes, 0.1);
        assert_eq!(scenes.current_name(), Some("village"));
        assert!(scenes.alpha().abs() < 1e-5);
        assert_eq!(
            scenes.drain_events(),
            vec![
                SceneEvent::BeforeChange { index: None, name: None },
                SceneEvent::AfterLoad {
                    index: 1,
                    name: "village".into()
                }
            ]
        );
    }

    #[test]
    fn zero_fade_completes_in_one_tick() {
        let mut scenes = changer(0.0);
        scenes.load_scene_by_name("harbor").expect("known scene");
        assert_eq!(run_until_idle(&mut scenes, 0.016), 1);
        assert_eq!(scenes.current_index(), Some(2));
    }

    #[test]
    fn loads_are_locked_while_in_progress() {
        let mut scenes = changer(0.25);
        scenes.load_scene(0).expect("valid index");
        assert_eq!(scenes.load_scene(1), Err(SceneError::LoadInProgress));
        run_until_idle(&mut scenes, 0.1);
        assert!(scenes.load_scene(1).is_ok());
    }

    #[test]
    fn invalid_requests_are_errors() {
        let mut scenes = changer(0.0);
        assert_eq!(scenes.load_scene(3), Err(SceneError::InvalidIndex(3)));
        assert_eq!(
            scenes.load_scene_by_name("moon"),
            Err(SceneError::UnknownScene("moon".into()))
        );
        assert_eq!(scenes.reload_current(), Err(SceneError::NoCurrentScene));
    }

    #[test]
    fn next_and_previous_respect_wrap() {
        let mut scenes = changer(0.0);
        scenes.load_scene(2).expect("valid index");
        run_until_idle(&mut scenes, 0.1);
        assert_eq!(scenes.load_next(false), Err(SceneError::AtEdge("last")));
        scenes.load_next(true).expect("wraps");
        run_until_idle(&mut scenes, 0.1);
        assert_eq!(scenes.current_index(), Some(0));
        assert_eq!(scenes.load_previous(false), Err(SceneError::AtEdge("first")));
        scenes.load_previous(true).expect("wraps");
        run_until_idle(&mut scenes, 0.1);
        assert_eq!(scenes.current_index(), Some(2));
    }

    #[test]
    fn unknown_objects_are_ignored() {
        let mut objects = SceneObjects::default();
        objects.insert(
            "bridge",
            SceneObject {
                scene: "village".into(),
                desc: String::new(),
                active: false,
            },
        );
        assert!(!objects.set_active("ghost", true));
        assert!(objects.set_active("bridge", true));
        assert!(objects.is_active("bridge"));
        assert_eq!(objects.active_in("village").count(), 1);
        assert_eq!(objects.active_in("harbor").count(), 0);
    }
}

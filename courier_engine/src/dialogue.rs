//! Dialogue sequencing.
//!
//! A [`DialogueRunner`] plays a queue of lines with a typewriter reveal driven by `tick`.
//! Advancing while a line is still typing reveals the whole line; advancing after that moves
//! to the next line or closes the dialogue. The completion payload registered with `start` is
//! handed back exactly once, when the dialogue closes.
//!
//! The payload is plain data (`C`) rather than a callback so the host decides what "done"
//! means without the runner holding references into game state.

use std::collections::VecDeque;

use log::{debug, info};

/// Where the runner is in its line sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogueState {
    #[default]
    Idle,
    Typing,
    AwaitingAdvance,
    Closed,
}

/// Result of a start or advance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueStep<C> {
    /// Nothing is playing.
    Inactive,
    /// A new line started typing.
    Line,
    /// The current line was completed instantly.
    Revealed,
    /// The dialogue closed. Carries the completion registered at start, if any.
    Finished(Option<C>),
}

#[derive(Debug, Clone)]
pub struct DialogueRunner<C> {
    state: DialogueState,
    queue: VecDeque<String>,
    current: Vec<char>,
    revealed: usize,
    elapsed: f32,
    typing_delay: f32,
    speaker: Option<String>,
    on_complete: Option<C>,
}

impl<C> Default for DialogueRunner<C> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<C> DialogueRunner<C> {
    /// `typing_delay` is seconds per revealed character; zero or less reveals a line on the
    /// next tick.
    pub fn new(typing_delay: f32) -> Self {
        Self {
            state: DialogueState::Idle,
            queue: VecDeque::new(),
            current: Vec::new(),
            revealed: 0,
            elapsed: 0.0,
            typing_delay,
            speaker: None,
            on_complete: None,
        }
    }

    pub fn set_typing_delay(&mut self, typing_delay: f32) {
        self.typing_delay = typing_delay;
    }

    /// Start a new dialogue, replacing whatever was playing.
    ///
    /// The replaced dialogue's completion is dropped. With no lines the dialogue closes at
    /// once and `on_complete` comes straight back.
    pub fn start(
        &mut self,
        lines: impl IntoIterator<Item = String>,
        on_complete: Option<C>,
        speaker: Option<String>,
    ) -> DialogueStep<C> {
        if self.is_active() {
            debug!("dialogue preempted with {} lines left", self.queue.len());
        }
        self.queue = lines.into_iter().collect();
        self.on_complete = on_complete;
        self.speaker = speaker.filter(|name| !name.trim().is_empty());
        self.current.clear();
        self.revealed = 0;
        self.elapsed = 0.0;
        info!(
            "dialogue started ({} lines, speaker {:?})",
            self.queue.len(),
            self.speaker
        );
        self.next_line()
    }

    /// Handle the "advance" input.
    pub fn advance(&mut self) -> DialogueStep<C> {
        match self.state {
            DialogueState::Typing => {
                self.revealed = self.current.len();
                self.state = DialogueState::AwaitingAdvance;
                DialogueStep::Revealed
            },
            DialogueState::AwaitingAdvance => self.next_line(),
            DialogueState::Idle | DialogueState::Closed => DialogueStep::Inactive,
        }
    }

    /// Reveal characters for `dt` seconds of elapsed time.
    pub fn tick(&mut self, dt: f32) {
        if self.state != DialogueState::Typing {
            return;
        }
        if self.typing_delay <= 0.0 {
            self.revealed = self.current.len();
        } else {
            self.elapsed += dt.max(0.0);
            while self.revealed < self.current.len() && self.elapsed >= self.typing_delay {
                self.elapsed -= self.typing_delay;
                self.revealed += 1;
            }
        }
        if self.revealed >= self.current.len() {
            self.elapsed = 0.0;
            self.state = DialogueState::AwaitingAdvance;
        }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    /// True while a line is typing or waiting to be advanced.
    pub fn is_active(&self) -> bool {
        matches!(self.state, DialogueState::Typing | DialogueState::AwaitingAdvance)
    }

    pub fn is_typing(&self) -> bool {
        self.state == DialogueState::Typing
    }

    /// The part of the current line revealed so far.
    pub fn visible_text(&self) -> String {
        self.current.iter().take(self.revealed).collect()
    }

    /// The whole current line.
    pub fn full_line(&self) -> String {
        self.current.iter().collect()
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    /// Completion that will be handed back when the running dialogue closes.
    pub fn pending_completion(&self) -> Option<&C> {
        if self.is_active() { self.on_complete.as_ref() } else { None }
    }

    pub fn lines_remaining(&self) -> usize {
        self.queue.len()
    }

    /// Drop the current dialogue without firing its completion.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!("dialogue cancelled");
        }
        self.queue.clear();
        self.current.clear();
        self.revealed = 0;
        self.on_complete = None;
        self.state = DialogueState::Idle;
    }

    fn next_line(&mut self) -> DialogueStep<C> {
        match self.queue.pop_front() {
            Some(line) => {
                self.current = line.chars().collect();
                self.revealed = 0;
                self.elapsed = 0.0;
                self.state = DialogueState::Typing;
                DialogueStep::Line
            },
            None => self.close(),
        }
    }

    fn close(&mut self) -> DialogueStep<C> {
        self.current.clear();
        self.revealed = 0;
        self.speaker = None;
        self.state = DialogueState::Closed;
        info!("dialogue closed");
        DialogueStep::Finished(self.on_complete.take())
    }
}

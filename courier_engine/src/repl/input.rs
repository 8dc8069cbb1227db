//! Terminal input handling for the Courier REPL.
//!
//! Wraps rustyline with tab completion of command words and save slots, and falls back to
//! plain stdin when no terminal is attached.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use lazy_static::lazy_static;
use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::save_files::collect_save_slots;

/// Outcome of reading a line from the REPL input.
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

lazy_static! {
    static ref COMMAND_TERMS: Vec<&'static str> = {
        let mut terms = vec![
            "back", "cancel", "give", "go back", "go next", "go to", "help", "inventory", "load", "look", "next",
            "pause", "quit", "read", "save", "saves", "take letter", "take letter from", "talk to", "tasks",
        ];
        terms.sort_unstable();
        terms
    };
}

/// Save folder offered for `load` completions; follows the loaded campaign.
static COMPLETION_SAVE_DIR: LazyLock<RwLock<Option<PathBuf>>> = LazyLock::new(|| RwLock::new(None));

/// Point `load <slot>` completion at `dir`.
pub fn set_completion_save_dir(dir: PathBuf) {
    if let Ok(mut guard) = COMPLETION_SAVE_DIR.write() {
        *guard = Some(dir);
    }
}

type ReplEditor = rustyline::Editor<CourierHelper, DefaultHistory>;

#[derive(Default)]
struct CourierHelper;

impl Helper for CourierHelper {}

impl Completer for CourierHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, prefix) = current_prefix(line, pos);
        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }
        let lower = prefix.to_lowercase();
        if let Some(partial) = lower.strip_prefix("load ") {
            let partial = partial.trim_start();
            let offset = pos - partial.len();
            let pairs = available_save_slots()
                .into_iter()
                .filter(|slot| slot.starts_with(partial))
                .map(|slot| Pair {
                    display: slot.clone(),
                    replacement: slot,
                })
                .collect();
            return Ok((offset, pairs));
        }
        Ok((start, complete_terms(&lower)))
    }
}

impl Hinter for CourierHelper {
    type Hint = String;
}

impl Highlighter for CourierHelper {}

impl Validator for CourierHelper {}

fn current_prefix(line: &str, pos: usize) -> (usize, String) {
    let slice = &line[..pos];
    let trimmed = slice.trim_start_matches(char::is_whitespace);
    let start = pos - trimmed.len();
    (start, trimmed.to_string())
}

fn complete_terms(lower: &str) -> Vec<Pair> {
    COMMAND_TERMS
        .iter()
        .filter(|term| term.starts_with(lower))
        .map(|term| Pair {
            display: (*term).to_string(),
            replacement: (*term).to_string(),
        })
        .collect()
}

fn available_save_slots() -> Vec<String> {
    let Some(dir) = COMPLETION_SAVE_DIR.read().ok().and_then(|guard| guard.clone()) else {
        return Vec::new();
    };
    match collect_save_slots(&dir) {
        Ok(slots) => {
            let mut names: Vec<String> = slots.into_iter().map(|slot| slot.slot).collect();
            names.dedup();
            names
        },
        Err(err) => {
            warn!("Failed to enumerate save slots for completion: {err}");
            Vec::new()
        },
    }
}

/// Reads player input through rustyline when stdin is a terminal, plain stdin otherwise.
pub struct InputManager {
    backend: Backend,
}

impl InputManager {
    pub fn new() -> Self {
        let backend = if io::stdin().is_terminal() {
            match RustylineInput::new() {
                Ok(editor) => {
                    info!("using rustyline-backed REPL input");
                    Backend::Rustyline(Box::new(editor))
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}), falling back to basic stdin");
                    Backend::Plain(StdinInput::default())
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            Backend::Plain(StdinInput::default())
        };
        Self { backend }
    }

    /// Read a line. If rustyline fails, switch to plain stdin for good and retry once.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.backend.read_line(prompt) {
            Err(err) if matches!(self.backend, Backend::Rustyline(_)) => {
                warn!("rustyline input failed: {err} -- switching to basic stdin");
                self.backend = Backend::Plain(StdinInput::default());
                self.backend.read_line(prompt)
            },
            other => other,
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

enum Backend {
    Rustyline(Box<RustylineInput>),
    Plain(StdinInput),
}

impl Backend {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self {
            Backend::Rustyline(editor) => editor.read_line(prompt),
            Backend::Plain(stdin) => stdin.read_line(prompt),
        }
    }
}

struct RustylineInput {
    editor: ReplEditor,
    history_path: Option<PathBuf>,
}

impl RustylineInput {
    fn new() -> io::Result<Self> {
        let mut editor = ReplEditor::new().map_err(map_io_err)?;
        editor.set_helper(Some(CourierHelper));
        let history_path = history_file_path();

        if let Some(path) = history_path.as_ref() {
            if let Some(dir) = path.parent()
                && let Err(err) = fs::create_dir_all(dir)
            {
                warn!("failed to create history directory {}: {err}", dir.display());
            }
            match editor.load_history(path) {
                Ok(()) => {},
                Err(ReadlineError::Io(ref io_err)) if io_err.kind() == io::ErrorKind::NotFound => {
                    info!("no prior history found at {}, starting fresh", path.display());
                },
                Err(other) => warn!("failed to load history from {}: {other}", path.display()),
            }
        }

        Ok(Self { editor, history_path })
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!("failed to append to history: {err}");
                    }
                    if let Some(path) = self.history_path.as_ref()
                        && let Err(err) = self.editor.save_history(path)
                    {
                        warn!("failed to persist history to {}: {err}", path.display());
                    }
                }
                Ok(InputEvent::Line(line))
            },
            Err(err) => convert_readline_error(err),
        }
    }
}

#[derive(Default)]
struct StdinInput {
    buffer: String,
}

impl StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        print!("{prompt}");
        io::stdout().flush()?;

        self.buffer.clear();
        if io::stdin().read_line(&mut self.buffer)? == 0 {
            return Ok(InputEvent::Eof);
        }
        let line = self.buffer.trim_end_matches(['\n', '\r']).to_string();
        Ok(InputEvent::Line(line))
    }
}

fn convert_readline_error(err: ReadlineError) -> io::Result<InputEvent> {
    match err {
        ReadlineError::Interrupted => Ok(InputEvent::Interrupted),
        ReadlineError::Eof => Ok(InputEvent::Eof),
        other => Err(map_io_err(other)),
    }
}

fn map_io_err(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(io_err) => io_err,
        other => io::Error::other(other),
    }
}

fn history_file_path() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| build_history_path(&base))
}

fn build_history_path(base: &Path) -> PathBuf {
    base.join("courier_engine").join("history.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_readline_ctrl_c_to_interrupt() {
        let result = convert_readline_error(ReadlineError::Interrupted).unwrap();
        assert!(matches!(result, InputEvent::Interrupted));
    }

    #[test]
    fn history_path_appends_components() {
        let path = build_history_path(Path::new("/tmp/courier-test"));
        assert!(path.ends_with(Path::new("courier_engine/history.txt")));
    }

    #[test]
    fn command_terms_complete_by_prefix() {
        let found: Vec<String> = complete_terms("ta").into_iter().map(|pair| pair.replacement).collect();
        assert_eq!(found, ["take letter", "take letter from", "talk to", "tasks"]);
        assert!(complete_terms("xyz").is_empty());
    }

    #[test]
    fn prefix_skips_leading_whitespace() {
        assert_eq!(current_prefix("   go n", 7), (3, "go n".to_string()));
    }
}

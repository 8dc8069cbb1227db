//! Command module
//!
//! Describes the commands a player can type.

use variantly;

/// Commands that can be executed by the player.
#[derive(Debug, Clone, PartialEq, Eq, variantly::Variantly)]
pub enum Command {
    /// Close the letter bag without giving anything.
    Cancel,
    /// Give the letter at this inventory position (1-based as typed).
    Give(usize),
    GoBack,
    GoNext,
    GoTo(String),
    Help,
    Inventory,
    ListSaves,
    Load(String),
    Look,
    /// Advance the current dialogue.
    Next,
    Pause,
    Quit,
    Read(usize),
    Save(String),
    TakeLetter(Option<String>),
    TalkTo(String),
    Tasks,
    Unknown,
}

/// Parses an input string and returns the matching `Command`, or `Unknown`.
pub fn parse_command(input: &str) -> Command {
    let lowered = input.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    match words.as_slice() {
        ["look" | "l"] => Command::Look,
        ["take" | "get", "letter" | "mail"] | ["take" | "get"] => Command::TakeLetter(None),
        ["take" | "get", "letter" | "mail", "from", rest @ ..] if !rest.is_empty() => {
            Command::TakeLetter(Some(rest.join(" ")))
        },
        ["talk" | "speak", "to" | "with", rest @ ..] if !rest.is_empty() => Command::TalkTo(rest.join(" ")),
        ["next" | "n" | "continue"] | [] => Command::Next,
        ["give", number] => parse_position(number).map_or(Command::Unknown, Command::Give),
        ["cancel" | "close"] => Command::Cancel,
        ["inventory" | "inv" | "i" | "letters"] => Command::Inventory,
        ["read", number] => parse_position(number).map_or(Command::Unknown, Command::Read),
        ["tasks" | "quests" | "goals"] => Command::Tasks,
        ["go" | "travel", "next" | "on" | "forward"] => Command::GoNext,
        ["go" | "travel", "back" | "previous"] | ["back"] => Command::GoBack,
        ["go" | "travel", "to", rest @ ..] | ["go" | "travel", rest @ ..] if !rest.is_empty() => {
            Command::GoTo(rest.join(" "))
        },
        ["pause" | "unpause" | "resume"] => Command::Pause,
        ["save", slot] => Command::Save((*slot).to_string()),
        ["load", slot] => Command::Load((*slot).to_string()),
        ["saves" | "slots"] => Command::ListSaves,
        ["help" | "?"] => Command::Help,
        ["quit" | "exit"] => Command::Quit,
        _ => Command::Unknown,
    }
}

/// 1-based position typed by the player, as a 0-based index.
fn parse_position(word: &str) -> Option<usize> {
    word.trim_start_matches('#')
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
}

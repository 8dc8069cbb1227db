//! REPL and command handling utilities.
//!
//! The game runs in a read-eval-print loop. Each command is dispatched to a handler in one
//! of the submodules, then the world is ticked until its fades and typing settle and
//! whatever changed is printed.

pub mod delivery;
pub mod hud;
mod input;
pub mod look;
pub mod movement;
pub mod system;

pub use delivery::*;
pub use look::*;
pub use movement::*;
pub use system::*;

use crate::command::{Command, parse_command};
use crate::dialogue::DialogueState;
use crate::style::GameStyle;
use crate::world::{CourierWorld, WindowClose, WorldNotice};

use anyhow::Result;
use colored::Colorize;
use log::{info, warn};

use hud::TaskHud;
use input::{InputEvent, InputManager};

/// Control flow signal used by handlers to exit the REPL.
pub enum ReplControl {
    Continue,
    Quit,
}

/// Run the main read-eval-print loop until the user quits.
///
/// # Errors
/// Propagates failures from handlers, such as an unwritable save folder.
pub fn run_repl(world: &mut CourierWorld) -> Result<()> {
    #[allow(clippy::enum_glob_use)]
    use Command::*;

    let mut input_manager = InputManager::new();
    let mut hud = TaskHud::new();
    hud.attach(world);
    input::set_completion_save_dir(current_save_dir(world));

    settle(world);
    report(world, &hud, true);
    tasks_handler(world);

    let mut command_count: usize = 0;
    loop {
        let prompt = build_prompt(world);
        let input = match input_manager.read_line(&prompt) {
            Ok(InputEvent::Line(line)) => line,
            Ok(InputEvent::Eof) => "quit".to_string(),
            Ok(InputEvent::Interrupted) => {
                println!("Command canceled.");
                continue;
            },
            Err(err) => {
                warn!("input error: {err}");
                println!("{}", "Failed to read input. Try again.".error_style());
                continue;
            },
        };

        let command = parse_command(&input);
        command_count += 1;
        info!("command #{command_count}: {command:?}");
        if world.is_paused() && !allowed_while_paused(&command) {
            println!("{}", "The game is paused. Type 'pause' to resume.".denied_style());
            continue;
        }

        let shows_dialogue = matches!(command, TalkTo(_) | Next | Give(_));
        match &command {
            Look => look_handler(world),
            TakeLetter(mailbox) => take_letter_handler(world, mailbox.as_deref()),
            TalkTo(npc) => talk_to_handler(world, npc),
            Next => next_handler(world),
            Give(index) => give_handler(world, *index),
            Cancel => cancel_handler(world),
            Inventory => inventory_handler(world),
            Read(index) => read_handler(world, *index),
            Tasks => tasks_handler(world),
            GoTo(scene) => go_to_handler(world, scene),
            GoNext => go_next_handler(world),
            GoBack => go_back_handler(world),
            Pause => pause_handler(world),
            Save(slot) => save_handler(world, slot)?,
            Load(slot) => load_handler(world, &mut hud, slot),
            ListSaves => list_saves_handler(world),
            Help => help_handler(),
            Quit => {
                if let ReplControl::Quit = quit_handler(world) {
                    break;
                }
            },
            Unknown => println!("{}", "Didn't quite catch that. Try 'help'.".italic()),
        }

        settle(world);
        report(world, &hud, shows_dialogue);
    }
    Ok(())
}

/// Tick the world until nothing is animating, bounded by the configured limit.
pub fn settle(world: &mut CourierWorld) {
    let dt = world.config().tick_seconds;
    let limit = world.config().settle_limit;
    let mut ticks = 0;
    while !world.is_settled() && ticks < limit {
        world.tick(dt);
        ticks += 1;
    }
    if !world.is_settled() {
        warn!("world still animating after {ticks} ticks");
    }
}

fn allowed_while_paused(command: &Command) -> bool {
    matches!(
        command,
        Command::Pause
            | Command::Save(_)
            | Command::Load(_)
            | Command::ListSaves
            | Command::Tasks
            | Command::Help
            | Command::Quit
            | Command::Unknown
    )
}

fn build_prompt(world: &CourierWorld) -> String {
    let scene = world.current_scene().map_or("?", |id| world.scene_name(id));
    let mode = if world.is_paused() {
        "|PAUSED"
    } else if world.movement_locked() {
        "|bag open"
    } else if world.dialogue().is_active() {
        "|talking"
    } else {
        ""
    };
    format!(
        "\n[{scene}|Delivered: {}|Letters: {}{mode}]>> ",
        world.ledger.delivered_count(),
        world.inventory.len()
    )
    .prompt_style()
    .to_string()
}

/// Print world notices, task events and (if asked) the current dialogue line.
fn report(world: &mut CourierWorld, hud: &TaskHud, shows_dialogue: bool) {
    for notice in world.drain_notices() {
        show_notice(world, &notice);
    }
    for line in hud.flush() {
        println!("{line}");
    }
    if shows_dialogue {
        show_dialogue_line(world);
    }
}

fn show_dialogue_line(world: &CourierWorld) {
    let dialogue = world.dialogue();
    if dialogue.state() != DialogueState::AwaitingAdvance && !dialogue.is_typing() {
        return;
    }
    let speaker = dialogue.speaker().unwrap_or("???");
    let width = textwrap::termwidth().saturating_sub(4).max(20);
    let text = textwrap::fill(&format!("{speaker}: {}", dialogue.visible_text()), width);
    println!("{}", text.dialogue_style());
    let hint = if dialogue.lines_remaining() > 0 { "(next)" } else { "(next to finish)" };
    println!("{}", hint.dimmed());
}

fn show_notice(world: &CourierWorld, notice: &WorldNotice) {
    match notice {
        WorldNotice::LetterTaken { letter, mailbox } => {
            println!("You take {} from {}.", letter.letter_style(), mailbox.mailbox_style());
        },
        WorldNotice::ObjectChanged { object, active } => {
            let verb = if *active { "appears" } else { "is gone" };
            println!("{}", format!("The {object} {verb}.").notice_style());
        },
        WorldNotice::TaskCompleted { message, .. } => {
            if let Some(message) = message {
                println!("{}", message.notice_style());
            }
        },
        WorldNotice::DeliveryOpened { npc } => {
            println!("\n{} waits for a letter. {}", npc.npc_style(), "('give <n>' or 'cancel')".dimmed());
            inventory_handler(world);
        },
        WorldNotice::DeliveryClosed { npc, reason } => match reason {
            WindowClose::Delivered => println!("{}", format!("Letter delivered to {npc}.").notice_style()),
            WindowClose::Refused => println!("{}", format!("{npc} doesn't take the letter.").denied_style()),
            WindowClose::Cancelled => println!("You close your letter bag."),
            WindowClose::ForceClosed => println!("{}", "You close your letter bag as you leave.".dimmed()),
        },
        WorldNotice::SceneEntered { name, .. } => {
            println!("\n{}", name.scene_titlebar_style());
        },
    }
}

//! `repl::delivery` module
//!
//! Handlers for picking up letters, talking to residents and handing letters over.

use colored::Colorize;
use log::info;

use crate::dialogue::DialogueStep;
use crate::style::GameStyle;
use crate::world::{ActionError, CourierWorld};

fn refused(err: &ActionError) {
    info!("action refused: {err}");
    println!("{}", err.to_string().denied_style());
}

/// Take the letter from a mailbox here.
pub fn take_letter_handler(world: &mut CourierWorld, mailbox: Option<&str>) {
    if let Err(err) = world.pickup_letter(mailbox) {
        refused(&err);
    }
}

/// Start a conversation; the reply is printed once the line has typed out.
pub fn talk_to_handler(world: &mut CourierWorld, npc_name: &str) {
    if let Err(err) = world.interact(npc_name) {
        refused(&err);
    }
}

/// Advance the current dialogue.
pub fn next_handler(world: &mut CourierWorld) {
    if let DialogueStep::Inactive = world.advance_dialogue() {
        println!("{}", "Nobody is talking.".italic().dimmed());
    }
}

/// Give the letter at `index` to whoever the bag is open for.
pub fn give_handler(world: &mut CourierWorld, index: usize) {
    match world.give_letter(index) {
        Ok(delivered) => info!("give #{} -> delivered: {delivered}", index + 1),
        Err(err) => refused(&err),
    }
}

/// Close the letter bag.
pub fn cancel_handler(world: &mut CourierWorld) {
    if let Err(err) = world.cancel_delivery() {
        refused(&err);
    }
}

/// List carried letters.
pub fn inventory_handler(world: &CourierWorld) {
    println!("{}", "Letter bag".subheading_style());
    if world.inventory.is_empty() {
        println!("{}", "You aren't carrying any letters.".italic().dimmed());
        return;
    }
    for (idx, letter) in world.inventory.letters().iter().enumerate() {
        println!(
            "  {}. {} {}",
            idx + 1,
            letter.title.letter_style(),
            format!("(to {})", letter.receiver).dimmed()
        );
    }
}

/// Read a carried letter.
pub fn read_handler(world: &CourierWorld, index: usize) {
    let Some(letter) = world.inventory.get(index) else {
        refused(&ActionError::NoSuchLetter(index));
        return;
    };
    let width = textwrap::termwidth().saturating_sub(4).max(20);
    println!("{}", letter.title.letter_style().bold());
    println!("{}", textwrap::fill(&letter.full_text(), width).description_style());
}

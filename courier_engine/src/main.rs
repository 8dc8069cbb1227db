#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Courier **
//! Letter-delivery adventure in a terminal

use courier_engine::style::GameStyle;
use courier_engine::{load_world, run_repl};

use anyhow::{Context, Result};
use colored::Colorize;

use log::info;

use std::io::Write;

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading Courier world...");
    let mut world = load_world().context("while loading CourierWorld")?;
    info!("CourierWorld loaded successfully.");

    // clear the screen
    print!("\x1B[2J\x1B[H");
    std::io::stdout().flush().context("while clearing the screen")?;
    info!("Starting the game!");

    let banner = world.campaign_title.to_uppercase();
    println!("{:^84}", banner.bright_yellow().underline());
    if !world.intro.trim().is_empty() {
        let width = textwrap::termwidth().saturating_sub(4).max(20);
        println!("\n{}\n", textwrap::fill(&world.intro, width).description_style());
    }

    run_repl(&mut world)
}

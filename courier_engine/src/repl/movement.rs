//! `repl::movement` module
//!
//! Travel between scenes. The transition itself runs while the REPL settles the world.

use log::info;

use crate::style::GameStyle;
use crate::world::{CourierWorld, SceneTarget};

fn travel(world: &mut CourierWorld, target: &SceneTarget) {
    match world.travel(target) {
        Ok(()) => info!("travel started: {target:?}"),
        Err(err) => println!("{}", err.to_string().denied_style()),
    }
}

pub fn go_to_handler(world: &mut CourierWorld, scene: &str) {
    travel(world, &SceneTarget::Named(scene.to_string()));
}

pub fn go_next_handler(world: &mut CourierWorld) {
    travel(world, &SceneTarget::Next);
}

pub fn go_back_handler(world: &mut CourierWorld) {
    travel(world, &SceneTarget::Previous);
}

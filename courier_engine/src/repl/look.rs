//! Observation handler: what is in the current scene.

use colored::Colorize;

use crate::style::GameStyle;
use crate::world::CourierWorld;

/// Describe the current scene, its residents, mailboxes and visible objects.
pub fn look_handler(world: &CourierWorld) {
    let Some(scene_id) = world.current_scene() else {
        println!("{}", "You are between places.".italic().dimmed());
        return;
    };
    println!("{}", world.scene_name(scene_id).scene_titlebar_style());
    if let Some(info) = world.current_scene_info()
        && !info.description.is_empty()
    {
        let width = textwrap::termwidth().saturating_sub(4).max(20);
        println!("{}", textwrap::fill(&info.description, width).description_style());
    }

    for (id, object) in world.objects.active_in(scene_id) {
        let text = if object.desc.is_empty() { id } else { object.desc.as_str() };
        println!("  {}", text.object_style());
    }
    for npc in world.npcs_here() {
        let note = if world.ledger.is_delivered(npc.house_id) { " (delivered)" } else { "" };
        println!("  {}{}", npc.name.npc_style(), note.dimmed());
    }
    for mailbox in world.mailboxes_here() {
        let state = if mailbox.active { "a letter waits inside" } else { "empty" };
        println!("  {} {}", mailbox.id.mailbox_style(), format!("({state})").dimmed());
    }
}

//! NPC Module

use std::collections::BTreeMap;

use courier_data::{HouseId, NpcDef};
use serde::{Deserialize, Serialize};

/// A resident who can be talked to and may receive a letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub scene: String,
    pub house_id: HouseId,
    pub description: String,
    pub start_lines: Vec<String>,
    pub after_success_lines: Vec<String>,
    pub after_fail_lines: Vec<String>,
    pub already_given_lines: Vec<String>,
}

impl Npc {
    /// Lines for the reaction to a delivery attempt.
    pub fn delivery_reaction(&self, success: bool) -> &[String] {
        if success {
            &self.after_success_lines
        } else {
            &self.after_fail_lines
        }
    }
}

impl From<&NpcDef> for Npc {
    fn from(def: &NpcDef) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            scene: def.scene.clone(),
            house_id: def.house_id,
            description: def.desc.clone(),
            start_lines: def.start_lines.clone(),
            after_success_lines: def.after_success_lines.clone(),
            after_fail_lines: def.after_fail_lines.clone(),
            already_given_lines: def.already_given_lines.clone(),
        }
    }
}

/// Selects an NPC in `scene` by id or first partial name match.
pub fn select_npc<'a>(npcs: &'a BTreeMap<String, Npc>, scene: &str, query: &str) -> Option<&'a Npc> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let mut here = npcs.values().filter(|npc| npc.scene == scene);
    here.clone()
        .find(|npc| npc.id.to_lowercase() == query)
        .or_else(|| here.find(|npc| npc.name.to_lowercase().contains(&query)))
}

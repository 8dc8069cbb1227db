//! Mailboxes: one letter each, emptied on pickup.

use courier_data::MailboxDef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub id: String,
    pub scene: String,
    pub letter_id: String,
    /// False once the letter has been taken.
    pub active: bool,
}

impl From<&MailboxDef> for Mailbox {
    fn from(def: &MailboxDef) -> Self {
        Self {
            id: def.id.clone(),
            scene: def.scene.clone(),
            letter_id: def.letter.clone(),
            active: true,
        }
    }
}

//! Letters and the player's letter bag.

use courier_data::{HouseId, LetterDef};
use log::info;
use serde::{Deserialize, Serialize};

/// A letter addressed to a single house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    pub id: String,
    pub house_id: HouseId,
    pub title: String,
    pub sender: String,
    pub receiver: String,
    pub content: String,
}

impl Letter {
    /// Full text as shown when the letter is opened.
    pub fn full_text(&self) -> String {
        format!("From: {}\nTo: {}\n\n{}", self.sender, self.receiver, self.content)
    }
}

impl From<&LetterDef> for Letter {
    fn from(def: &LetterDef) -> Self {
        Self {
            id: def.id.clone(),
            house_id: def.house_id,
            title: def.title.clone(),
            sender: def.sender.clone(),
            receiver: def.receiver.clone(),
            content: def.content.clone(),
        }
    }
}

/// Letters currently carried by the player, in pickup order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterInventory {
    letters: Vec<Letter>,
}

impl LetterInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, letter: Letter) {
        info!("letter '{}' (house {}) added to inventory", letter.id, letter.house_id);
        self.letters.push(letter);
    }

    /// Remove a letter by id, returning it if it was carried.
    pub fn remove(&mut self, letter_id: &str) -> Option<Letter> {
        let idx = self.letters.iter().position(|letter| letter.id == letter_id)?;
        let letter = self.letters.remove(idx);
        info!("letter '{}' removed from inventory", letter.id);
        Some(letter)
    }

    pub fn get(&self, index: usize) -> Option<&Letter> {
        self.letters.get(index)
    }

    /// First carried letter addressed to `house_id`.
    pub fn for_house(&self, house_id: HouseId) -> Option<&Letter> {
        self.letters.iter().find(|letter| letter.house_id == house_id)
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(id: &str, house_id: HouseId) -> Letter {
        Letter {
            id: id.into(),
            house_id,
            title: format!("To house {house_id}"),
            sender: "Postmaster".into(),
            receiver: "Resident".into(),
            content: "Hello.".into(),
        }
    }

    #[test]
    fn lookup_by_house_finds_first_match() {
        let mut bag = LetterInventory::new();
        bag.add(letter("a", 5));
        bag.add(letter("b", 7));
        bag.add(letter("c", 5));
        assert_eq!(bag.for_house(5).map(|l| l.id.as_str()), Some("a"));
        assert!(bag.for_house(9).is_none());
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut bag = LetterInventory::new();
        bag.add(letter("a", 1));
        bag.add(letter("b", 2));
        bag.add(letter("c", 3));
        assert_eq!(bag.remove("b").map(|l| l.house_id), Some(2));
        assert!(bag.remove("b").is_none());
        let ids: Vec<_> = bag.letters().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn full_text_lists_sender_and_receiver() {
        let text = letter("a", 1).full_text();
        assert!(text.starts_with("From: Postmaster\nTo: Resident\n\n"));
        assert!(text.ends_with("Hello."));
    }
}

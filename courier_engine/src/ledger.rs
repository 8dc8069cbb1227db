//! Delivery ledger: which houses already received their letter.

use std::collections::BTreeSet;

use courier_data::HouseId;
use log::info;
use serde::{Deserialize, Serialize};

use crate::letter::Letter;

/// Write-once record of successful deliveries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLedger {
    delivered: BTreeSet<HouseId>,
}

impl DeliveryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to hand `letter` to `recipient`.
    ///
    /// Succeeds only if the letter is addressed to `recipient` and that recipient has not
    /// already been served. On success the recipient is marked delivered for good.
    pub fn attempt_deliver(&mut self, letter: Option<&Letter>, recipient: HouseId) -> bool {
        let Some(letter) = letter else {
            return false;
        };
        if self.delivered.contains(&recipient) {
            info!("house {recipient} already received a letter; '{}' refused", letter.id);
            return false;
        }
        if letter.house_id != recipient {
            info!(
                "letter '{}' is addressed to house {}, not {recipient}",
                letter.id, letter.house_id
            );
            return false;
        }
        self.delivered.insert(recipient);
        info!("letter '{}' delivered to house {recipient}", letter.id);
        true
    }

    pub fn is_delivered(&self, recipient: HouseId) -> bool {
        self.delivered.contains(&recipient)
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter_for(house_id: HouseId) -> Letter {
        Letter {
            id: format!("letter-{house_id}"),
            house_id,
            title: String::new(),
            sender: String::new(),
            receiver: String::new(),
            content: String::new(),
        }
    }

    #[test]
    fn mismatched_house_then_match_then_repeat() {
        let mut ledger = DeliveryLedger::new();
        let letter = letter_for(5);
        assert!(!ledger.attempt_deliver(Some(&letter), 7));
        assert!(!ledger.is_delivered(7));
        assert!(ledger.attempt_deliver(Some(&letter), 5));
        assert!(!ledger.attempt_deliver(Some(&letter), 5));
        assert!(ledger.is_delivered(5));
    }

    #[test]
    fn absent_letter_fails_closed() {
        let mut ledger = DeliveryLedger::new();
        assert!(!ledger.attempt_deliver(None, 5));
        assert_eq!(ledger.delivered_count(), 0);
    }

    #[test]
    fn succeeds_exactly_once_per_recipient() {
        let mut ledger = DeliveryLedger::new();
        let right = letter_for(3);
        let wrong = letter_for(4);
        let successes = (0..10)
            .map(|i| {
                let letter = if i % 2 == 0 { &right } else { &wrong };
                ledger.attempt_deliver(Some(letter), 3)
            })
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
    }
}

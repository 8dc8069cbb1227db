#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const COURIER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Progression core
pub mod events;
pub mod ledger;
pub mod letter;
pub mod task;
pub mod tracker;

// Presentation sequencing
pub mod dialogue;
pub mod fade;
pub mod scene;

// World and host
pub mod command;
pub mod data_paths;
pub mod loader;
pub mod mailbox;
pub mod npc;
pub mod repl;
pub mod save_files;
pub mod slug;
pub mod style;
pub mod world;

// Re-exports for convenience
pub use dialogue::{DialogueRunner, DialogueStep};
pub use events::{EventLog, TaskEvent, TaskEventBus, TaskObserver};
pub use ledger::DeliveryLedger;
pub use letter::{Letter, LetterInventory};
pub use loader::load_world;
pub use repl::run_repl;
pub use scene::SceneChanger;
pub use task::{Task, TaskRegistry};
pub use tracker::{SceneEffects, TaskProgressTracker};
pub use world::CourierWorld;

//! Shared data model for Courier campaigns.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_campaign};

//! Raw message acquisition
//!
//! Defines the seam between the sync orchestrator and wherever bank messages come from. The
//! crate ships a no-op source, an in-memory source and a JSON file source.

/// Message source trait and implementations
mod source;
/// Type definitions for raw messages and source errors
mod types;

pub use source::{FileMessageSource, MessageSource, NoopMessageSource, StaticMessageSource};
pub use types::*;

//! Core data model for sailplan.
//!
//! A [`Selection`] is the sail configuration a crew member can dial in;
//! a [`LogEntry`] is a selection pinned to the instant it took effect,
//! which is also its key in the store.

mod entry;
mod selection;

pub use entry::LogEntry;
pub use selection::{JIB, REACHING_SPI, Selection};

//! Turning parsed items into filesystem entries, and taking them back.
//!
//! A run walks the items once, in order, and returns a
//! [`MaterializeReport`] whose [`CreatedItems`] drive [`undo`]. Conflicts
//! with entries already on disk are handed to a [`ConflictResolver`].

mod conflict;
mod journal;
mod materialize;
mod report;
mod undo;

pub use conflict::{ConflictDecision, ConflictResolver, FixedPolicy, PromptResolver};
pub use journal::{JournalError, UndoJournal};
pub use materialize::materialize;
pub use report::{CreatedItems, MaterializeReport, UndoReport};
pub use undo::undo;

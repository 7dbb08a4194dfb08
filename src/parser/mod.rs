//! Tree text parsing.
//!
//! Turns a pasted, visually indented directory tree (plain indentation,
//! `├──`/`└──`/`│` connectors, or their ASCII `|--`/`` `-- `` spellings)
//! into an ordered list of [`TreeItem`]s rooted under a given directory.
//!
//! Parsing never fails: lines that cannot be interpreted are dropped and
//! the result simply contains fewer items.

mod normalize;
mod tree_item;
mod tree_line;
mod tree_parser;

pub use tree_item::TreeItem;
pub use tree_parser::{ParserOptions, TreeParser};

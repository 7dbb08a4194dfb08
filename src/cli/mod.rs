#[allow(clippy::module_inception)]
mod cli;

pub use cli::{BuildArgs, Cli, Command, UndoArgs};

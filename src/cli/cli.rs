use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::application::data::{ConflictPolicy, LogLevel};

/// Build a directory structure from a pasted tree.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Settings file to use instead of ./treesmith.yaml
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Preview and create the entries described by tree text
    Build(BuildArgs),
    /// Remove the entries recorded in an undo journal
    Undo(UndoArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// File holding the tree text, `-` or nothing for stdin
    pub input: Option<PathBuf>,

    /// Directory the tree is created in
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// What to do when a file already exists
    #[clap(long, value_enum)]
    pub on_conflict: Option<ConflictPolicy>,

    /// Do not ask for confirmation before creating anything
    #[clap(long, short)]
    pub yes: bool,

    /// Only print the preview
    #[clap(long)]
    pub dry_run: bool,

    /// Record created entries here so they can be undone later
    #[clap(long)]
    pub journal: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct UndoArgs {
    /// Journal written by a previous build
    #[clap(long)]
    pub journal: Option<PathBuf>,

    /// Do not ask for confirmation before removing anything
    #[clap(long, short)]
    pub yes: bool,
}

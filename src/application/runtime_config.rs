use std::path::PathBuf;

use crate::application::data::ConflictPolicy;
use crate::cli::{BuildArgs, Command, UndoArgs};
use crate::config::Settings;
use crate::parser::ParserOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    fn from_arg(input: Option<PathBuf>) -> Self {
        match input {
            Some(path) if path.as_os_str() != "-" => InputSource::File(path),
            _ => InputSource::Stdin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub input: InputSource,
    pub root: PathBuf,
    pub on_conflict: ConflictPolicy,
    pub assume_yes: bool,
    pub dry_run: bool,
    pub journal: Option<PathBuf>,
    pub parser_options: ParserOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoConfig {
    pub journal: Option<PathBuf>,
    pub assume_yes: bool,
}

/// What to do, with command line flags taking precedence over settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeConfig {
    Build(BuildConfig),
    Undo(UndoConfig),
}

impl RuntimeConfig {
    pub fn resolve(command: Command, settings: Settings) -> Self {
        match command {
            Command::Build(args) => RuntimeConfig::Build(BuildConfig::resolve(args, settings)),
            Command::Undo(args) => RuntimeConfig::Undo(UndoConfig::resolve(args, settings)),
        }
    }
}

impl BuildConfig {
    fn resolve(args: BuildArgs, settings: Settings) -> Self {
        let mut parser_options = ParserOptions::default();
        if let Some(tab_width) = settings.tab_width {
            parser_options.tab_width = tab_width;
        }

        Self {
            input: InputSource::from_arg(args.input),
            root: args.root,
            on_conflict: args.on_conflict.or(settings.on_conflict).unwrap_or_default(),
            assume_yes: args.yes || settings.assume_yes.unwrap_or(false),
            dry_run: args.dry_run,
            journal: args.journal.or(settings.journal),
            parser_options,
        }
    }
}

impl UndoConfig {
    fn resolve(args: UndoArgs, settings: Settings) -> Self {
        Self {
            journal: args.journal.or(settings.journal),
            assume_yes: args.yes || settings.assume_yes.unwrap_or(false),
        }
    }
}

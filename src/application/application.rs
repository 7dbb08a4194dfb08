use std::io::{self, Write};
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::{BuildConfig, InputSource, RuntimeConfig, UndoConfig};
use crate::cli::Cli;
use crate::config::{Settings, SettingsError};
use crate::ext::PathDisplayExt;
use crate::materializer::{JournalError, UndoJournal, materialize, undo};
use crate::parser::TreeParser;
use crate::preview::{PreviewRenderer, prompt};

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let settings = match &cli.config {
            Some(path) => Settings::from_path(path).await,
            None => Settings::read(Path::new(".")).await,
        }
        .context(SettingsSnafu)?;
        debug!("Loaded settings: {:?}", settings);

        let config = RuntimeConfig::resolve(cli.command, settings);
        debug!("Resolved runtime config: {:?}", config);

        match config {
            RuntimeConfig::Build(config) => Self::build(config).await,
            RuntimeConfig::Undo(config) => Self::undo(config).await,
        }
    }

    async fn build(config: BuildConfig) -> Result<(), ApplicationError> {
        let interactive = !config.assume_yes && !config.dry_run;
        if interactive && config.input == InputSource::Stdin {
            return ConfirmationUnavailableSnafu.fail();
        }

        let root = Self::resolve_root(&config.root)?;
        let text = Self::read_input(&config.input).await?;
        let items = TreeParser::new(config.parser_options).parse(&text, &root);
        if items.is_empty() {
            warn!("No entries found in the tree text, nothing to do");
            return Ok(());
        }

        let renderer = PreviewRenderer::detect();
        Self::print(&renderer.render(&items, &root))?;

        if config.dry_run {
            info!("Dry run, leaving the filesystem untouched");
            return Ok(());
        }
        if !config.assume_yes && !Self::confirm("Create this structure?")? {
            info!("Nothing created");
            return Ok(());
        }

        let mut resolver = config.on_conflict.resolver();
        let report = materialize(&items, resolver.as_mut());
        drop(resolver);
        Self::print(&renderer.render_report(&report, &root))?;
        if report.is_cancelled() {
            info!("Cancelled, entries created before the cancel are kept");
        }

        if report.created.is_empty() {
            return Ok(());
        }

        if let Some(journal_path) = &config.journal {
            UndoJournal::new(&root, &report.created)
                .write(journal_path)
                .await
                .context(JournalSnafu)?;
            info!("Undo journal written to {}", journal_path.display_absolute());
        }

        if !config.assume_yes && Self::confirm("Undo these changes?")? {
            let undone = undo(&report.created);
            Self::print(&renderer.render_undo(&undone))?;
            if let Some(journal_path) = &config.journal {
                if undone.is_clean() {
                    UndoJournal::discard(journal_path)
                        .await
                        .context(JournalSnafu)?;
                }
            }
        }

        Ok(())
    }

    async fn undo(config: UndoConfig) -> Result<(), ApplicationError> {
        let journal_path = config.journal.context(MissingJournalSnafu)?;
        let journal = UndoJournal::read(&journal_path)
            .await
            .context(JournalSnafu)?;
        let created = journal.created();
        info!(
            "Journal lists {} entries under {}",
            created.len(),
            journal.root().display()
        );

        if !config.assume_yes {
            let question = format!(
                "Remove {} entries created under {}?",
                created.len(),
                journal.root().display()
            );
            if !Self::confirm(&question)? {
                info!("Nothing removed");
                return Ok(());
            }
        }

        let undone = undo(&created);
        Self::print(&PreviewRenderer::detect().render_undo(&undone))?;

        if undone.is_clean() {
            UndoJournal::discard(&journal_path)
                .await
                .context(JournalSnafu)?;
        } else {
            warn!(
                "Keeping journal {}, some entries could not be removed",
                journal_path.display_absolute()
            );
        }
        Ok(())
    }

    fn resolve_root(root: &Path) -> Result<PathBuf, ApplicationError> {
        let root = root.canonicalize().context(RootSnafu {
            root: root.display_absolute(),
        })?;
        ensure!(
            root.is_dir(),
            RootNotDirectorySnafu {
                root: root.display().to_string()
            }
        );
        debug!("Building under {}", root.display());
        Ok(root)
    }

    async fn read_input(input: &InputSource) -> Result<String, ApplicationError> {
        match input {
            InputSource::Stdin => {
                debug!("Reading tree text from stdin");
                io::read_to_string(io::stdin()).context(StdinSnafu)
            }
            InputSource::File(path) => {
                debug!("Reading tree text from {}", path.display_absolute());
                let bytes = fs::read(path).await.context(InputReadSnafu {
                    file_path: path.display_absolute(),
                })?;
                String::from_utf8(bytes).context(InputEncodingSnafu {
                    file_path: path.display_absolute(),
                })
            }
        }
    }

    fn confirm(question: &str) -> Result<bool, ApplicationError> {
        prompt::confirm(&mut io::stdin().lock(), &mut io::stdout(), question).context(PromptSnafu)
    }

    fn print(text: &str) -> Result<(), ApplicationError> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .context(PromptSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading settings"))]
    SettingsError { source: SettingsError },
    #[snafu(display("Failed to read the tree text from {}", file_path))]
    InputReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The tree text in {} is not valid UTF-8", file_path))]
    InputEncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to read the tree text from stdin"))]
    StdinError { source: std::io::Error },
    #[snafu(display("Cannot use root directory {}", root))]
    RootError {
        root: String,
        source: std::io::Error,
    },
    #[snafu(display("Root {} is not a directory", root))]
    RootNotDirectory { root: String },
    #[snafu(display("Tree text read from stdin needs --yes, stdin cannot also answer prompts"))]
    ConfirmationUnavailable,
    #[snafu(display("Failed to talk to the terminal"))]
    PromptError { source: std::io::Error },
    #[snafu(display("No undo journal given, pass --journal or set it in treesmith.yaml"))]
    MissingJournal,
    #[snafu(display("Undo journal failure"))]
    JournalError { source: JournalError },
}

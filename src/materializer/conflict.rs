use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use derive_more::Display;
use tracing::{debug, warn};

use crate::preview::prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConflictDecision {
    #[display("overwrite")]
    Overwrite,
    #[display("skip")]
    Skip,
    #[display("cancel")]
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A file item whose path already holds a file
    ExistingFile,
    /// A directory item whose path already holds a file
    FileInPlaceOfDirectory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub path: PathBuf,
    pub kind: ConflictKind,
}

impl Conflict {
    pub fn new(path: &Path, kind: ConflictKind) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
        }
    }
}

/// Decides what happens to an entry that is already on disk.
///
/// Called synchronously, once per conflict, in item order.
pub trait ConflictResolver {
    fn resolve(&mut self, conflict: &Conflict) -> ConflictDecision;
}

/// Gives the same answer to every conflict.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub ConflictDecision);

impl ConflictResolver for FixedPolicy {
    fn resolve(&mut self, conflict: &Conflict) -> ConflictDecision {
        debug!(
            "Resolving conflict at {} with fixed policy: {}",
            conflict.path.display(),
            self.0
        );
        self.0
    }
}

/// Asks on a terminal. "All" answers are remembered for the rest of the run,
/// and running out of input cancels.
pub struct PromptResolver<R, W> {
    reader: R,
    writer: W,
    remembered: Option<ConflictDecision>,
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            remembered: None,
        }
    }

    fn question(conflict: &Conflict) -> String {
        let what = match conflict.kind {
            ConflictKind::ExistingFile => "File already exists",
            ConflictKind::FileInPlaceOfDirectory => "A file is in the way of directory",
        };
        format!(
            "{what}: {}\n[o]verwrite, [s]kip, [c]ancel, overwrite [a]ll, skip all ([n]one)?",
            conflict.path.display()
        )
    }
}

impl<R: BufRead, W: Write> ConflictResolver for PromptResolver<R, W> {
    fn resolve(&mut self, conflict: &Conflict) -> ConflictDecision {
        if let Some(decision) = self.remembered {
            return decision;
        }

        let question = Self::question(conflict);
        loop {
            let answer = match prompt::ask(&mut self.reader, &mut self.writer, &question) {
                Ok(Some(answer)) => answer,
                Ok(None) => {
                    warn!("No answer for {}, cancelling", conflict.path.display());
                    return ConflictDecision::Cancel;
                }
                Err(e) => {
                    warn!("Failed to read answer: {}, cancelling", e);
                    return ConflictDecision::Cancel;
                }
            };

            match answer.to_lowercase().as_str() {
                "o" | "overwrite" => return ConflictDecision::Overwrite,
                "s" | "skip" => return ConflictDecision::Skip,
                "c" | "cancel" => return ConflictDecision::Cancel,
                "a" | "all" => {
                    self.remembered = Some(ConflictDecision::Overwrite);
                    return ConflictDecision::Overwrite;
                }
                "n" | "none" => {
                    self.remembered = Some(ConflictDecision::Skip);
                    return ConflictDecision::Skip;
                }
                other => debug!("Unrecognized answer {:?}, asking again", other),
            }
        }
    }
}

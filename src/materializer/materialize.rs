use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use snafu::{IntoError, ResultExt};
use tracing::{debug, info, warn};

use crate::parser::TreeItem;

use super::conflict::{Conflict, ConflictDecision, ConflictKind, ConflictResolver};
use super::report::{
    CreatedItems, CreationError, CreationSnafu, MaterializeReport, RunOutcome, SkipReason,
};

enum Step {
    Created,
    Skipped(SkipReason),
    Cancelled,
}

/// Creates the items on disk, strictly in the given order.
///
/// Existing directories are left alone, existing files go through
/// `resolver`, and a file is never written over a directory. Failures are
/// recorded per item and the run goes on; only a `Cancel` decision stops it.
/// Nothing is rolled back here, the report carries what was created.
pub fn materialize(items: &[TreeItem], resolver: &mut dyn ConflictResolver) -> MaterializeReport {
    let mut report = MaterializeReport::default();
    // Directories that were skipped or failed, their contents cannot be created
    let mut unavailable: Vec<PathBuf> = Vec::new();

    for item in items {
        if unavailable.iter().any(|dir| item.path.starts_with(dir)) {
            debug!("Skipping {}, parent is unavailable", item.path.display());
            report.skip(&item.path, SkipReason::ParentUnavailable);
            continue;
        }

        let step = if item.is_dir {
            create_dir(&item.path, resolver, &mut report.created)
        } else {
            create_file(&item.path, resolver, &mut report.created)
        };

        match step {
            Ok(Step::Created) => {}
            Ok(Step::Skipped(reason)) => {
                if item.is_dir && reason != SkipReason::AlreadyExists {
                    unavailable.push(item.path.clone());
                }
                report.skip(&item.path, reason);
            }
            Ok(Step::Cancelled) => {
                info!("Cancelled at {}", item.path.display());
                report.outcome = RunOutcome::Cancelled;
                break;
            }
            Err(error) => {
                warn!("{}: {}", error, error_source(&error));
                if item.is_dir {
                    unavailable.push(item.path.clone());
                }
                report.failures.push(error);
            }
        }
    }

    debug!(
        "Materialization {}: {} created, {} skipped, {} failed",
        report.outcome,
        report.created.len(),
        report.skipped.len(),
        report.failures.len()
    );
    report
}

fn error_source(error: &CreationError) -> String {
    std::error::Error::source(error)
        .map(|source| source.to_string())
        .unwrap_or_default()
}

fn create_dir(
    path: &Path,
    resolver: &mut dyn ConflictResolver,
    created: &mut CreatedItems,
) -> Result<Step, CreationError> {
    let existing = lookup(path).context(CreationSnafu { path })?;
    match existing {
        None => {
            create_dir_chain(path, created).context(CreationSnafu { path })?;
            Ok(Step::Created)
        }
        Some(metadata) if metadata.is_dir() => {
            debug!("Directory {} already exists", path.display());
            Ok(Step::Skipped(SkipReason::AlreadyExists))
        }
        Some(_) => {
            let conflict = Conflict::new(path, ConflictKind::FileInPlaceOfDirectory);
            match resolver.resolve(&conflict) {
                ConflictDecision::Overwrite => {
                    fs::remove_file(path).context(CreationSnafu { path })?;
                    if let Err(e) = fs::create_dir(path) {
                        warn!(
                            "Removed file {} but could not create a directory in its place: {}",
                            path.display(),
                            e
                        );
                        return Err(CreationSnafu { path }.into_error(e));
                    }
                    info!("Replaced file with directory {}", path.display());
                    created.record(path);
                    Ok(Step::Created)
                }
                ConflictDecision::Skip => Ok(Step::Skipped(SkipReason::KeptExisting)),
                ConflictDecision::Cancel => Ok(Step::Cancelled),
            }
        }
    }
}

fn create_file(
    path: &Path,
    resolver: &mut dyn ConflictResolver,
    created: &mut CreatedItems,
) -> Result<Step, CreationError> {
    let existing = lookup(path).context(CreationSnafu { path })?;
    match existing {
        None => {
            if let Some(parent) = path.parent() {
                create_dir_chain(parent, created).context(CreationSnafu { path })?;
            }
            fs::File::create(path).context(CreationSnafu { path })?;
            info!("Created file {}", path.display());
            created.record(path);
            Ok(Step::Created)
        }
        Some(metadata) if metadata.is_dir() => {
            warn!(
                "Not writing file {}, a directory exists there",
                path.display()
            );
            Ok(Step::Skipped(SkipReason::TargetIsDirectory))
        }
        Some(_) => {
            let conflict = Conflict::new(path, ConflictKind::ExistingFile);
            match resolver.resolve(&conflict) {
                ConflictDecision::Overwrite => {
                    fs::File::create(path).context(CreationSnafu { path })?;
                    info!("Overwrote file {}", path.display());
                    created.record(path);
                    Ok(Step::Created)
                }
                ConflictDecision::Skip => {
                    debug!("Keeping existing file {}", path.display());
                    Ok(Step::Skipped(SkipReason::KeptExisting))
                }
                ConflictDecision::Cancel => Ok(Step::Cancelled),
            }
        }
    }
}

fn lookup(path: &Path) -> io::Result<Option<fs::Metadata>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Creates `path` and any missing ancestors, outermost first, recording each
/// directory as it is made.
fn create_dir_chain(path: &Path, created: &mut CreatedItems) -> io::Result<()> {
    let missing: Vec<&Path> = path
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .collect();

    for dir in missing.into_iter().rev() {
        fs::create_dir(dir)?;
        info!("Created directory {}", dir.display());
        created.record(dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materializer::FixedPolicy;
    use crate::materializer::report::SkippedItem;
    use tempfile::TempDir;

    /// Answers from a script and remembers what it was asked.
    struct Scripted {
        answers: Vec<ConflictDecision>,
        asked: Vec<Conflict>,
    }

    impl Scripted {
        fn new(answers: &[ConflictDecision]) -> Self {
            Self {
                answers: answers.iter().rev().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl ConflictResolver for Scripted {
        fn resolve(&mut self, conflict: &Conflict) -> ConflictDecision {
            self.asked.push(conflict.clone());
            self.answers.pop().unwrap_or(ConflictDecision::Cancel)
        }
    }

    fn sample(root: &Path) -> Vec<TreeItem> {
        vec![
            TreeItem::dir(root.join("app")),
            TreeItem::file(root.join("app/main.ts")),
            TreeItem::dir(root.join("app/utils")),
            TreeItem::file(root.join("app/utils/helper.ts")),
        ]
    }

    #[test]
    fn creates_items_in_order() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        let items = sample(root);

        let report = materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert!(report.failures.is_empty());
        let expected: Vec<PathBuf> = items.iter().map(|item| item.path.clone()).collect();
        assert_eq!(*report.created, expected);
        assert!(root.join("app/utils").is_dir());
        assert!(root.join("app/utils/helper.ts").is_file());
        assert_eq!(fs::read(root.join("app/main.ts")).unwrap(), b"");
    }

    #[test]
    fn rerun_skips_directories_and_asks_for_every_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let items = sample(temp.path());
        materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));

        let mut resolver = Scripted::new(&[ConflictDecision::Skip, ConflictDecision::Skip]);
        let report = materialize(&items, &mut resolver);

        assert!(report.created.is_empty());
        assert_eq!(resolver.asked.len(), 2);
        assert!(
            resolver
                .asked
                .iter()
                .all(|c| c.kind == ConflictKind::ExistingFile)
        );
        let reasons: Vec<SkipReason> = report.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::AlreadyExists,
                SkipReason::KeptExisting,
                SkipReason::AlreadyExists,
                SkipReason::KeptExisting,
            ]
        );
    }

    #[test]
    fn overwrite_truncates_and_logs() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("notes.txt");
        fs::write(&path, "keep me?").unwrap();

        let report = materialize(
            &[TreeItem::file(&path)],
            &mut FixedPolicy(ConflictDecision::Overwrite),
        );

        assert_eq!(*report.created, vec![path.clone()]);
        assert_eq!(fs::read(&path).unwrap(), b"");
    }

    #[test]
    fn skip_leaves_file_untouched() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("notes.txt");
        fs::write(&path, "keep me").unwrap();

        let report = materialize(
            &[TreeItem::file(&path)],
            &mut FixedPolicy(ConflictDecision::Skip),
        );

        assert!(report.created.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn file_over_directory_is_skipped_with_warning() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("data");
        fs::create_dir(&path).unwrap();

        let mut resolver = Scripted::new(&[]);
        let report = materialize(&[TreeItem::file(&path)], &mut resolver);

        assert!(resolver.asked.is_empty());
        assert!(report.created.is_empty());
        assert_eq!(
            report.skipped,
            vec![SkippedItem {
                path: path.clone(),
                reason: SkipReason::TargetIsDirectory,
            }]
        );
        assert!(path.is_dir());
    }

    #[test]
    fn cancel_stops_immediately_and_keeps_earlier_items() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        fs::write(root.join("b.txt"), "existing").unwrap();
        let items = vec![
            TreeItem::file(root.join("a.txt")),
            TreeItem::file(root.join("b.txt")),
            TreeItem::file(root.join("c.txt")),
        ];

        let report = materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));

        assert!(report.is_cancelled());
        assert_eq!(*report.created, vec![root.join("a.txt")]);
        assert!(root.join("a.txt").exists());
        assert!(!root.join("c.txt").exists());
    }

    #[test]
    fn directory_over_file_is_a_conflict() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        fs::write(root.join("src"), "not a dir").unwrap();
        let items = vec![
            TreeItem::dir(root.join("src")),
            TreeItem::file(root.join("src/lib.rs")),
        ];

        let mut resolver = Scripted::new(&[ConflictDecision::Skip]);
        let report = materialize(&items, &mut resolver);

        assert_eq!(resolver.asked[0].kind, ConflictKind::FileInPlaceOfDirectory);
        assert!(report.created.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.skipped[1].reason, SkipReason::ParentUnavailable);
        assert!(root.join("src").is_file());
    }

    #[test]
    fn directory_over_file_can_be_overwritten() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        fs::write(root.join("src"), "not a dir").unwrap();
        let items = vec![
            TreeItem::dir(root.join("src")),
            TreeItem::file(root.join("src/lib.rs")),
        ];

        let report = materialize(&items, &mut FixedPolicy(ConflictDecision::Overwrite));

        assert_eq!(*report.created, vec![root.join("src"), root.join("src/lib.rs")]);
        assert!(root.join("src/lib.rs").is_file());
    }

    #[test]
    fn missing_ancestors_are_created_and_logged() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        let items = vec![
            TreeItem::file(root.join("src/bin/cli.rs")),
            TreeItem::dir(root.join("assets/img")),
        ];

        let report = materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));

        assert_eq!(
            *report.created,
            vec![
                root.join("src"),
                root.join("src/bin"),
                root.join("src/bin/cli.rs"),
                root.join("assets"),
                root.join("assets/img"),
            ]
        );
    }

    #[test]
    fn failures_are_recorded_and_the_run_goes_on() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        fs::write(root.join("blocker"), "").unwrap();
        let items = vec![
            TreeItem::file(root.join("blocker/inner.txt")),
            TreeItem::file(root.join("after.txt")),
        ];

        let report = materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, root.join("blocker/inner.txt"));
        assert_eq!(*report.created, vec![root.join("after.txt")]);
        assert_eq!(report.outcome, RunOutcome::Completed);
    }
}

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use snafu::IntoError;
use tracing::{debug, info, warn};

use super::report::{RemovalSnafu, UndoReport};

/// Removes created paths, newest first.
///
/// Children are always logged after their parent, so walking the log
/// backwards empties a directory before it is removed. Directories are still
/// removed recursively in case something was added to them since. One
/// failed removal does not stop the others.
pub fn undo(created: &[PathBuf]) -> UndoReport {
    let mut report = UndoReport::default();

    for path in created.iter().rev() {
        let removal = fs::symlink_metadata(path).and_then(|metadata| {
            if metadata.is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            }
        });

        match removal {
            Ok(()) => {
                info!("Removed {}", path.display());
                report.removed.push(path.clone());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} is already gone", path.display());
                report.missing.push(path.clone());
            }
            Err(e) => {
                warn!("Failed to remove {}: {}", path.display(), e);
                report.failures.push(RemovalSnafu { path }.into_error(e));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materializer::{ConflictDecision, FixedPolicy, materialize};
    use crate::parser::TreeParser;
    use std::collections::BTreeSet;
    use std::path::Path;
    use tempfile::TempDir;

    const TREE: &str = "\
project/
├── src/
│   ├── main.rs
│   └── util/
│       └── mod.rs
├── README.md
└── docs/
    └── guide.md
";

    /// Every entry under `root` as `(relative path, is_dir)`.
    fn listing(root: &Path) -> BTreeSet<(PathBuf, bool)> {
        let mut entries = BTreeSet::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                let is_dir = path.is_dir();
                if is_dir {
                    pending.push(path.clone());
                }
                entries.insert((path.strip_prefix(root).unwrap().to_path_buf(), is_dir));
            }
        }
        entries
    }

    #[test]
    fn undo_reverses_a_full_run() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        fs::write(root.join("existing.txt"), "untouched").unwrap();
        let before = listing(root);

        let items = TreeParser::default().parse(TREE, root);
        let report = materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));
        assert_eq!(report.created.len(), items.len());

        let undone = undo(&report.created);

        assert!(undone.is_clean());
        assert_eq!(undone.removed.len(), items.len());
        assert!(report.created.iter().all(|path| !path.exists()));
        assert_eq!(listing(root), before);
        assert_eq!(
            fs::read_to_string(root.join("existing.txt")).unwrap(),
            "untouched"
        );
    }

    #[test]
    fn filesystem_matches_the_parsed_tree() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();

        let items = TreeParser::default().parse(TREE, root);
        materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));

        let parsed: BTreeSet<(PathBuf, bool)> = items
            .iter()
            .map(|item| (item.relative_to(root).to_path_buf(), item.is_dir))
            .collect();
        assert_eq!(listing(root), parsed);
    }

    #[test]
    fn undo_removes_in_reverse_order() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        let items = TreeParser::default().parse("a/\n  b/\n    c.txt", root);
        let report = materialize(&items, &mut FixedPolicy(ConflictDecision::Cancel));

        let undone = undo(&report.created);

        assert_eq!(
            undone.removed,
            vec![root.join("a/b/c.txt"), root.join("a/b"), root.join("a")]
        );
    }

    #[test]
    fn missing_paths_are_tolerated() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        let gone = root.join("gone.txt");
        let present = root.join("present.txt");
        fs::write(&present, "").unwrap();

        let undone = undo(&[present.clone(), gone.clone()]);

        assert!(undone.is_clean());
        assert_eq!(undone.missing, vec![gone]);
        assert_eq!(undone.removed, vec![present.clone()]);
        assert!(!present.exists());
    }

    #[test]
    fn one_failed_removal_does_not_stop_the_rest() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        let first = root.join("first.txt");
        let last = root.join("last.txt");
        let plain = root.join("plain");
        fs::write(&first, "").unwrap();
        fs::write(&last, "").unwrap();
        fs::write(&plain, "not a directory").unwrap();
        let unreachable = plain.join("child");

        let undone = undo(&[first.clone(), unreachable.clone(), last.clone()]);

        assert!(!undone.is_clean());
        assert_eq!(undone.failures.len(), 1);
        assert_eq!(undone.failures[0].path, unreachable);
        assert_eq!(undone.removed, vec![last.clone(), first.clone()]);
        assert!(!first.exists());
        assert!(!last.exists());
        assert!(plain.is_file());
    }

    #[test]
    fn contents_added_later_are_removed_with_their_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        let dir = root.join("build");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("artifact.o"), "").unwrap();

        let undone = undo(&[dir.clone()]);

        assert!(undone.is_clean());
        assert!(!dir.exists());
    }
}

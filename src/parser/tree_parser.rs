use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::{TreeItem, normalize::normalize, tree_line::TreeLine};

const DEFAULT_TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Columns a tab counts for when measuring indentation
    pub tab_width: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TreeParser {
    options: ParserOptions,
}

impl TreeParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parses tree text into items rooted under `root`, in input order.
    ///
    /// Depth is taken from the width of each line's decorative prefix. A
    /// line only nests under the closest preceding directory whose indent is
    /// strictly smaller; equal indents are siblings.
    pub fn parse(&self, input: &str, root: &Path) -> Vec<TreeItem> {
        let normalized = normalize(input);
        let mut stack = AncestryStack::new(root);
        let mut items = Vec::new();

        for (index, raw) in normalized.lines().enumerate() {
            let Some(line) = TreeLine::parse(raw, self.options.tab_width) else {
                trace!("Skipping line {}: {:?}", index + 1, raw);
                continue;
            };

            let path = stack.parent_for(line.indent).join(&line.name);
            trace!(
                "Line {} at indent {} resolved to {}",
                index + 1,
                line.indent,
                path.display()
            );

            if line.is_dir {
                stack.enter(path.clone(), line.indent);
                items.push(TreeItem::dir(path));
            } else {
                items.push(TreeItem::file(path));
            }
        }

        debug!("Parsed {} items from tree text", items.len());
        items
    }
}

/// Directories that are open at the current line. The bottom scope is the
/// root and has no indent, so it is never closed.
struct AncestryStack {
    scopes: Vec<(PathBuf, Option<usize>)>,
}

impl AncestryStack {
    fn new(root: &Path) -> Self {
        Self {
            scopes: vec![(root.to_path_buf(), None)],
        }
    }

    /// Closes every scope the line at `indent` is not nested in and returns
    /// the path of the one it is.
    fn parent_for(&mut self, indent: usize) -> &Path {
        while self.scopes.len() > 1
            && self
                .scopes
                .last()
                .and_then(|(_, top)| *top)
                .is_some_and(|top| indent <= top)
        {
            self.scopes.pop();
        }
        // The root scope is never popped
        self.scopes
            .last()
            .map(|(path, _)| path.as_path())
            .unwrap_or(Path::new(""))
    }

    fn enter(&mut self, path: PathBuf, indent: usize) {
        self.scopes.push((path, Some(indent)));
    }
}

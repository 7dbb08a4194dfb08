use std::fmt::Write as _;
use std::path::Path;

use colored::Colorize;
use supports_color::Stream;

use crate::ext::PathDisplayExt;
use crate::materializer::{MaterializeReport, UndoReport};
use crate::parser::TreeItem;

const INDENT: &str = "  ";

/// Renders parsed items and run reports for the terminal.
#[derive(Debug, Clone, Copy)]
pub struct PreviewRenderer {
    color: bool,
}

impl PreviewRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colors only when stdout supports them.
    pub fn detect() -> Self {
        Self::new(supports_color::on(Stream::Stdout).is_some())
    }

    pub fn render(&self, items: &[TreeItem], root: &Path) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading(&root.display_absolute()));

        for item in items {
            let relative = item.relative_to(root);
            let depth = relative.components().count().saturating_sub(1);
            let name = relative
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| relative.display().to_string());

            let label = if item.is_dir {
                self.directory(&format!("{name}/"))
            } else {
                name
            };
            let marker = if item.path.exists() {
                format!(" {}", self.notice("(exists)"))
            } else {
                String::new()
            };
            let _ = writeln!(out, "{}{label}{marker}", INDENT.repeat(depth + 1));
        }

        let directories = items.iter().filter(|item| item.is_dir).count();
        let files = items.len() - directories;
        let _ = writeln!(out, "\n{directories} directories, {files} files");
        out
    }

    pub fn render_report(&self, report: &MaterializeReport, root: &Path) -> String {
        let mut out = String::new();
        for skipped in &report.skipped {
            let _ = writeln!(
                out,
                "{} {} ({})",
                self.notice("skipped"),
                skipped.path.display_relative(root),
                skipped.reason
            );
        }
        for failure in &report.failures {
            let source = std::error::Error::source(failure)
                .map(|source| format!(": {source}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{} {}{source}",
                self.failure("failed"),
                failure.path.display_relative(root)
            );
        }

        let _ = writeln!(
            out,
            "Run {}: {} created, {} skipped, {} failed",
            report.outcome,
            report.created.len(),
            report.skipped.len(),
            report.failures.len()
        );
        out
    }

    pub fn render_undo(&self, report: &UndoReport) -> String {
        let mut out = String::new();
        for failure in &report.failures {
            let source = std::error::Error::source(failure)
                .map(|source| format!(": {source}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{} {}{source}",
                self.failure("failed"),
                failure.path.display_absolute()
            );
        }
        let _ = writeln!(
            out,
            "Undo: {} removed, {} already gone, {} failed",
            report.removed.len(),
            report.missing.len(),
            report.failures.len()
        );
        out
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn directory(&self, text: &str) -> String {
        if self.color {
            text.blue().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn notice(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    fn failure(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}

use std::path::{Component, Path};

use super::normalize::{decoration_len, is_box_glyph};

const COMMENT_MARKER: char = '#';
const DIR_MARKERS: [char; 2] = ['/', ':'];

/// A single interpretable line of tree text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeLine {
    /// Width in columns of the decorative prefix.
    pub indent: usize,
    pub name: String,
    pub is_dir: bool,
}

impl TreeLine {
    /// Interprets one normalized line, or returns `None` when it carries no
    /// usable name.
    pub fn parse(line: &str, tab_width: usize) -> Option<Self> {
        let line = line.trim_end();
        if line.is_empty() {
            return None;
        }

        let (prefix, rest) = line.split_at(decoration_len(line));
        let indent = prefix
            .chars()
            .map(|c| if c == '\t' { tab_width } else { 1 })
            .fold(0usize, usize::saturating_add);

        let rest: String = rest
            .chars()
            .map(|c| if is_box_glyph(c) { ' ' } else { c })
            .collect();
        let rest = rest
            .split(COMMENT_MARKER)
            .next()
            .unwrap_or_default()
            .trim();
        let rest = rest.strip_prefix("./").unwrap_or(rest);

        let is_dir = rest.ends_with(DIR_MARKERS);
        let name = rest.trim_end_matches(|c: char| DIR_MARKERS.contains(&c) || c.is_whitespace());

        if name.is_empty() || is_placeholder(name) || !stays_inside_root(name) {
            return None;
        }

        Some(Self {
            indent,
            name: name.to_string(),
            is_dir,
        })
    }
}

/// `...` and `…` stand for "more entries" in hand-written trees.
fn is_placeholder(name: &str) -> bool {
    name.chars().all(|c| c == '.' || c == '…')
}

fn stays_inside_root(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn line(indent: usize, name: &str, is_dir: bool) -> Option<TreeLine> {
        Some(TreeLine {
            indent,
            name: name.to_string(),
            is_dir,
        })
    }

    #[rstest]
    #[case("app/", line(0, "app", true))]
    #[case("  main.ts", line(2, "main.ts", false))]
    #[case("├── src/", line(4, "src", true))]
    #[case("│   └── index.ts", line(8, "index.ts", false))]
    #[case("config.yaml  # generated", line(0, "config.yaml", false))]
    #[case("config.yaml # generated", line(0, "config.yaml", false))]
    #[case("assets:", line(0, "assets", true))]
    #[case("build//", line(0, "build", true))]
    #[case("./docs/", line(0, "docs", true))]
    #[case("\tlib.rs", line(4, "lib.rs", false))]
    #[case("|-- Cargo.toml", line(4, "Cargo.toml", false))]
    #[case("`-- src/", line(4, "src", true))]
    #[case("├── +page.svelte", line(4, "+page.svelte", false))]
    #[case("src/components/", line(0, "src/components", true))]
    fn parses_lines(#[case] input: &str, #[case] expected: Option<TreeLine>) {
        assert_eq!(TreeLine::parse(input, 4), expected);
    }

    #[rstest]
    #[case("")]
    #[case("    ")]
    #[case("│   │")]
    #[case("├── ")]
    #[case("# just a comment")]
    #[case("/")]
    #[case("  :")]
    #[case("└── ...")]
    #[case("…")]
    #[case("..")]
    #[case("../outside.txt")]
    #[case("/etc/passwd")]
    #[case("a/../../b")]
    fn skips_uninterpretable_lines(#[case] input: &str) {
        assert_eq!(TreeLine::parse(input, 4), None);
    }

    #[test]
    fn respects_tab_width() {
        let parsed = TreeLine::parse("\t\tfile", 2).unwrap();
        assert_eq!(parsed.indent, 4);
    }

    #[test]
    fn huge_tab_width_saturates() {
        let parsed = TreeLine::parse("\t\t\tfile", usize::MAX).unwrap();
        assert_eq!(parsed.indent, usize::MAX);
    }
}

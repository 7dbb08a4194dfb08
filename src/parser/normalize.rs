const VERTICAL_BAR: char = '│';
const NO_BREAK_SPACE: char = '\u{00A0}';

/// ASCII spellings of branch connectors, as printed by `tree --charset=ascii`
/// and friends.
const ASCII_CONNECTORS: [&str; 4] = ["|--", "`--", "+--", "\\--"];

/// Any character from the Unicode box drawing block.
pub(crate) fn is_box_glyph(c: char) -> bool {
    ('\u{2500}'..='\u{257F}').contains(&c)
}

/// Glyphs that open a branch or continue one. A stray `". "` in front of
/// these is a copy-paste artifact.
fn is_branch_glyph(c: char) -> bool {
    matches!(c, '├' | '└' | '│' | '┣' | '┗' | '┃')
}

/// Normalizes raw tree text before it is split into lines.
///
/// Only inline spacing is collapsed. The decorative prefix of every line is
/// left as-is so that indentation can still be measured afterwards.
pub(crate) fn normalize(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    let unified = collapse_vertical_runs(&unified).replace(NO_BREAK_SPACE, " ");

    unified
        .split('\n')
        .map(|line| collapse_inline_spaces(&strip_dot_artifacts(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_vertical_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous = None;
    for c in text.chars() {
        if c == VERTICAL_BAR && previous == Some(VERTICAL_BAR) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

fn strip_dot_artifacts(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        let artifact = chars[i] == '.'
            && chars.get(i + 1) == Some(&' ')
            && chars.get(i + 2).is_some_and(|c| is_branch_glyph(*c));
        if artifact {
            i += 2;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn collapse_inline_spaces(line: &str) -> String {
    let (prefix, rest) = line.split_at(decoration_len(line));
    let mut out = String::with_capacity(line.len());
    out.push_str(prefix);

    let mut previous_space = false;
    for c in rest.chars() {
        if c == ' ' {
            if previous_space {
                continue;
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
        out.push(c);
    }
    out
}

/// Byte length of the decorative prefix of a line: whitespace, box drawing
/// glyphs and ASCII connectors.
pub(crate) fn decoration_len(line: &str) -> usize {
    let mut pos = 0;
    loop {
        let rest = &line[pos..];
        let Some(c) = rest.chars().next() else {
            return pos;
        };

        if c.is_whitespace() {
            pos += c.len_utf8();
        } else if is_box_glyph(c) {
            pos += c.len_utf8();
            pos += dash_run_len(&line[pos..]);
        } else if let Some(connector) = ASCII_CONNECTORS.iter().find(|t| rest.starts_with(**t)) {
            pos += connector.len();
            pos += dash_run_len(&line[pos..]);
        } else if c == '|' && rest[1..].chars().next().is_none_or(char::is_whitespace) {
            pos += 1;
        } else {
            return pos;
        }
    }
}

/// Length of a run of `-` that is followed by whitespace (or the end of the
/// line). Dashes glued to a name belong to the name.
fn dash_run_len(text: &str) -> usize {
    let dashes = text.chars().take_while(|c| *c == '-').count();
    if dashes == 0 {
        return 0;
    }
    match text[dashes..].chars().next() {
        None => dashes,
        Some(c) if c.is_whitespace() => dashes,
        Some(_) => 0,
    }
}

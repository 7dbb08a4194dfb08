use std::io::{self, BufRead, Write};

/// Prints `question` and reads one trimmed line. `None` means the input
/// ended.
pub fn ask<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
) -> io::Result<Option<String>> {
    write!(writer, "{question} ")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Yes/no question that defaults to no.
pub fn confirm<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
) -> io::Result<bool> {
    let answer = ask(reader, writer, &format!("{question} [y/N]"))?;
    Ok(matches!(
        answer.map(|a| a.to_lowercase()).as_deref(),
        Some("y" | "yes")
    ))
}

//! Repair free-form model output into a question block.
//!
//! A block is exactly `k` lines, each whitespace-collapsed and ending in a
//! single `?`. [`normalize`] either produces such a block or fails; it never
//! returns a partially valid one.

/// Model output that does not reduce to the expected number of lines.
#[derive(Debug, thiserror::Error)]
#[error(
    "model output must contain exactly {expected} non-empty lines; got {actual}.\nOutput:\n{raw}"
)]
pub struct ValidationError {
    pub expected: usize,
    pub actual: usize,
    /// The unmodified model output.
    pub raw: String,
}

/// Normalize `raw` into a block of exactly `expected` lines.
///
/// Non-empty lines past `expected` are dropped. Fewer than `expected`
/// non-empty lines is a [`ValidationError`].
pub fn normalize(raw: &str, expected: usize) -> Result<String, ValidationError> {
    let lines: Vec<&str> = raw
        .split(is_line_break)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(expected)
        .collect();

    if lines.len() != expected {
        return Err(ValidationError {
            expected,
            actual: lines.len(),
            raw: raw.to_string(),
        });
    }

    Ok(lines
        .into_iter()
        .map(fix_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Line boundaries a model may emit: `\n`, `\r`, vertical tab, form feed,
/// the ASCII record separators, NEL, and the Unicode line/paragraph separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn fix_line(line: &str) -> String {
    let mut line = line.split_whitespace().collect::<Vec<_>>().join(" ");

    if !line.ends_with('?') {
        let kept = line.trim_end_matches('.').len();
        line.truncate(kept);
        line.push('?');
    }

    if line.matches('?').count() > 1
        && let Some((head, _)) = line.split_once('?')
    {
        line = format!("{}?", head.trim());
    }

    line
}

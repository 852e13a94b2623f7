//! Small helpers for env parsing, terminal input, and cell formatting.

use std::env;
use std::io::BufRead;

pub fn parse_u64_env(var: &str) -> Option<u64> {
    env::var(var)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Read one line from `reader` and strip the trailing newline.
///
/// End of input yields an empty string, which callers treat the same as an
/// empty submission.
pub fn read_trimmed_line(reader: &mut impl BufRead) -> std::io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Clamp a cell to `max` characters, marking the cut with an ellipsis.
pub fn truncate_cell(value: &str, max: usize) -> String {
    let count = value.chars().count();
    if count <= max {
        return value.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let kept: String = value.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Replacement rendering for a secret value.
pub fn masked(value: &str) -> String {
    "•".repeat(value.chars().count().max(1))
}

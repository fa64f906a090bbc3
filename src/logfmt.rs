// ABOUTME: Log record formatting shared by the log worker and the in-process sink.
// ABOUTME: One record per line: `YYYY-MM-DD HH:MM [ACTION] message`.

use chrono::Local;

/// Split a log channel line into its action and message. A single-token line
/// carries an empty message.
pub fn split_action(line: &str) -> (&str, &str) {
    let stripped = line.trim();
    match stripped.split_once(char::is_whitespace) {
        Some((action, rest)) => (action, rest.trim_start()),
        None => (stripped, ""),
    }
}

/// Render one record. The action is uppercased; an empty action falls back
/// to `INFO`. Malformed content is written as given, never rejected.
pub fn render(timestamp: &str, action: &str, message: &str) -> String {
    let action = if action.is_empty() {
        "INFO".to_string()
    } else {
        action.to_uppercase()
    };
    format!("{timestamp} [{action}] {message}")
}

/// Minute-precision local timestamp for log records.
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// True when `line` matches the record shape, i.e. starts with a
/// `YYYY-MM-DD HH:MM` timestamp followed by a bracketed action.
pub fn looks_like_record(line: &str) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < 17 {
        return false;
    }
    let digits = [0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15];
    digits.iter().all(|&i| bytes[i].is_ascii_digit())
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b' '
        && bytes[13] == b':'
        && line[16..].starts_with(" [")
}

// ABOUTME: Session history — ordered plaintext/ciphertext strings from this run.
// ABOUTME: Append-only, selectable by 1-based index, never persisted.

/// Strings produced during the session, in insertion order.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 1-based lookup; `None` when out of range. Index 0 is reserved by the
    /// menu for "enter a new string" and is never a valid entry.
    pub fn get(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return None;
        }
        self.entries.get(index - 1).map(String::as_str)
    }

    /// Numbered listing, one `  N) entry` line per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("  {}) {}", i + 1, entry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

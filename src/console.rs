// ABOUTME: User-facing console seam — prompted line input and plain output.
// ABOUTME: StdConsole talks to the real terminal; tests script the exchange instead.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// The interactive surface the orchestrator drives.
#[async_trait]
pub trait Console: Send {
    /// Print `prompt` without a newline and read one line, trimmed.
    /// `None` means the input stream has closed.
    async fn prompt(&mut self, prompt: &str) -> Option<String>;

    /// Print one line of output.
    fn say(&mut self, text: &str);
}

/// Console over the process's real stdin/stdout.
pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn prompt(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::Write::flush(&mut std::io::stdout());
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            _ => None,
        }
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }
}

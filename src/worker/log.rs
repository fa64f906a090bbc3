// ABOUTME: Log worker run loop — reads action lines from stdin, appends records to a file.
// ABOUTME: Each record is flushed before the next line is accepted; QUIT ends the loop.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::logfmt;

/// Entry point for the `log-worker <logfile>` subcommand. Failure to open the
/// target file is the only fatal condition; main turns it into exit status 2.
pub async fn run(logfile: &Path) -> anyhow::Result<()> {
    let file = open_for_append(logfile)?;
    let stdin = BufReader::new(tokio::io::stdin());
    serve(stdin, file).await
}

/// Open the log file for append, creating parent directories as needed.
pub fn open_for_append(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

/// Drive the record loop over arbitrary streams (in-memory in tests).
/// Whitespace-only lines are skipped; `QUIT` (case-insensitive, trimmed)
/// terminates; everything else is written as given and flushed immediately.
pub async fn serve<R, W>(reader: R, mut out: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("QUIT") {
            break;
        }
        let (action, message) = logfmt::split_action(&line);
        writeln!(out, "{}", logfmt::render(&logfmt::timestamp(), action, message))?;
        out.flush()?;
    }
    Ok(())
}

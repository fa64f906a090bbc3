// ABOUTME: Cipher worker run loop — line requests on stdin, one response line on stdout.
// ABOUTME: Holds the session key in a CipherState; QUIT ends the loop cleanly with no response.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::cipher::{CipherError, CipherState};
use crate::protocol::{Request, Response};

/// Entry point for the `cipher-worker` subcommand.
pub async fn run() -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(stdin, stdout).await
}

/// Drive the request loop over arbitrary streams (in-memory in tests).
/// Empty lines are skipped without a response; every other line gets exactly
/// one response line, except `QUIT` which ends the loop.
pub async fn serve<R, W>(reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut state = CipherState::new();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }
        let response = match Request::parse(&line) {
            Some(Request::Quit) => break,
            Some(Request::Pass(key)) => reply(state.set_key(&key).map(|()| String::new())),
            Some(Request::Encrypt(text)) => reply(state.encrypt(&text)),
            Some(Request::Decrypt(text)) => reply(state.decrypt(&text)),
            None => Response::Error("Unknown command".to_string()),
        };
        writer.write_all(response.to_string().as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

fn reply(result: Result<String, CipherError>) -> Response {
    match result {
        Ok(payload) => Response::Result(payload),
        Err(err) => Response::Error(err.to_string()),
    }
}

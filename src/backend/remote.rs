// ABOUTME: Out-of-process backends — workers spawned by re-invoking the current executable.
// ABOUTME: RemoteCipher carries the restart-once-retry-once policy; RemoteLog drains a bounded queue.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::backend::{CipherService, LogSink, ServiceError};
use crate::protocol::{Request, Response};

/// One live request/response channel to a cipher worker.
#[async_trait]
pub trait CipherChannel: Send {
    /// Write one request line and read exactly one response line.
    async fn roundtrip(&mut self, line: &str) -> io::Result<String>;
    /// Write one line without waiting for a response (used for `QUIT`).
    async fn send(&mut self, line: &str) -> io::Result<()>;
    /// Wait up to `grace` for the worker to exit, then force-terminate it.
    async fn dispose(&mut self, grace: Duration);
}

/// Opens fresh channels. Each open corresponds to one worker (re)start, which
/// is what makes the restart policy countable in tests.
#[async_trait]
pub trait ChannelFactory: Send {
    type Channel: CipherChannel;
    async fn open(&self) -> anyhow::Result<Self::Channel>;
}

/// Channel backed by a spawned `cipherdesk cipher-worker` child process.
pub struct WorkerChannel {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

#[async_trait]
impl CipherChannel for WorkerChannel {
    async fn roundtrip(&mut self, line: &str) -> io::Result<String> {
        self.send(line).await?;
        let mut reply = String::new();
        let n = self.stdout.read_line(&mut reply).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no output from backend",
            ));
        }
        Ok(reply.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn send(&mut self, line: &str) -> io::Result<()> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await
    }

    async fn dispose(&mut self, grace: Duration) {
        await_exit(&mut self.child, grace).await;
    }
}

/// Spawns cipher workers by re-invoking the current executable with its
/// hidden worker subcommand.
pub struct WorkerSpawner;

#[async_trait]
impl ChannelFactory for WorkerSpawner {
    type Channel = WorkerChannel;

    async fn open(&self) -> anyhow::Result<WorkerChannel> {
        let exe = std::env::current_exe()?;
        let mut child = Command::new(exe)
            .arg("cipher-worker")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("cipher worker stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("cipher worker stdout not captured"))?;
        Ok(WorkerChannel {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

/// Wait up to `grace` for the child to exit, then kill it.
async fn await_exit(child: &mut Child, grace: Duration) {
    if timeout(grace, child.wait()).await.is_err() {
        child.kill().await.ok();
    }
}

/// Out-of-process cipher service with the restart policy: when the channel is
/// dead, the worker is replaced with a fresh instance (losing any held key)
/// and the request retried — at most once per command.
pub struct RemoteCipher<F: ChannelFactory> {
    factory: F,
    channel: Option<F::Channel>,
    grace: Duration,
}

impl<F: ChannelFactory> RemoteCipher<F> {
    pub fn new(factory: F, grace: Duration) -> Self {
        Self {
            factory,
            channel: None,
            grace,
        }
    }

    /// Spawn the worker eagerly so the first command does not pay the cost.
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.channel = Some(self.factory.open().await?);
        Ok(())
    }

    /// The retry state machine: attempt → on failure restart → retry →
    /// on failure give up.
    async fn transact(&mut self, request: &Request) -> Result<Response, ServiceError> {
        for _attempt in 0..2 {
            if self.channel.is_none() {
                match self.factory.open().await {
                    Ok(channel) => self.channel = Some(channel),
                    Err(_) => continue,
                }
            }
            let Some(channel) = self.channel.as_mut() else {
                continue;
            };
            match channel.roundtrip(&request.to_string()).await {
                Ok(line) => return Ok(parse_reply(&line)),
                // Channel is dead; drop it so the next attempt respawns.
                Err(_) => self.channel = None,
            }
        }
        Err(ServiceError::Unavailable)
    }

    async fn exchange(&mut self, request: Request) -> Result<String, ServiceError> {
        match self.transact(&request).await? {
            Response::Result(payload) => Ok(payload),
            Response::Error(reason) => Err(ServiceError::Rejected(reason)),
        }
    }
}

/// Map a raw response line onto the protocol. Lines that are not well-formed
/// responses surface verbatim as the error reason.
fn parse_reply(line: &str) -> Response {
    Response::parse(line).unwrap_or_else(|| Response::Error(line.to_string()))
}

#[async_trait]
impl<F: ChannelFactory> CipherService for RemoteCipher<F> {
    async fn set_key(&mut self, key: &str) -> Result<(), ServiceError> {
        self.exchange(Request::Pass(key.to_string())).await.map(|_| ())
    }

    async fn encrypt(&mut self, text: &str) -> Result<String, ServiceError> {
        self.exchange(Request::Encrypt(text.to_string())).await
    }

    async fn decrypt(&mut self, text: &str) -> Result<String, ServiceError> {
        self.exchange(Request::Decrypt(text.to_string())).await
    }

    async fn shutdown(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.send(&Request::Quit.to_string()).await.ok();
            channel.dispose(self.grace).await;
        }
    }
}

/// Spawned log worker plus the bounded queue feeding it. Records that cannot
/// be queued (queue full or drain gone) are silently dropped.
pub struct RemoteLog {
    tx: mpsc::Sender<String>,
    child: Child,
    drain: JoinHandle<()>,
    grace: Duration,
}

impl RemoteLog {
    /// Spawn `cipherdesk log-worker <logfile>` and the task draining the
    /// record queue into its stdin.
    pub fn spawn(logfile: &Path, capacity: usize, grace: Duration) -> anyhow::Result<Self> {
        let exe = std::env::current_exe()?;
        let mut child = Command::new(exe)
            .arg("log-worker")
            .arg(logfile)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("log worker stdin not captured"))?;

        let (tx, mut rx) = mpsc::channel::<String>(capacity);
        let drain = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                let write = async {
                    stdin.write_all(line.as_bytes()).await?;
                    stdin.write_all(b"\n").await?;
                    stdin.flush().await
                };
                if write.await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            tx,
            child,
            drain,
            grace,
        })
    }
}

#[async_trait]
impl LogSink for RemoteLog {
    fn record(&self, action: &str, message: &str) {
        let line = if message.is_empty() {
            action.to_string()
        } else {
            format!("{action} {message}")
        };
        self.tx.try_send(line).ok();
    }

    async fn shutdown(&mut self) {
        self.tx.send("QUIT".to_string()).await.ok();
        // Swap in a disconnected sender so the drain task sees the queue
        // close once everything already queued has been delivered.
        self.tx = mpsc::channel(1).0;
        (&mut self.drain).await.ok();
        await_exit(&mut self.child, self.grace).await;
    }
}

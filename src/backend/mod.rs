// ABOUTME: Service seams the orchestrator depends on — cipher and log backends.
// ABOUTME: Remote (child-process) and local (in-process) implementations live in submodules.

pub mod local;
pub mod remote;

pub use local::{FileLog, LocalCipher};
pub use remote::{RemoteCipher, RemoteLog, WorkerSpawner};

use async_trait::async_trait;
use thiserror::Error;

/// Outcome classification for cipher requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The backend answered `ERROR <reason>`; the session continues.
    #[error("{0}")]
    Rejected(String),
    /// The backend could not be reached even after a restart.
    #[error("backend unavailable")]
    Unavailable,
}

/// The cipher engine as the orchestrator sees it: one session key held on
/// the other side of the seam, two transforms against it.
#[async_trait]
pub trait CipherService: Send {
    async fn set_key(&mut self, key: &str) -> Result<(), ServiceError>;
    async fn encrypt(&mut self, text: &str) -> Result<String, ServiceError>;
    async fn decrypt(&mut self, text: &str) -> Result<String, ServiceError>;
    /// Best-effort teardown; must never fail loudly.
    async fn shutdown(&mut self);
}

/// Best-effort sink for session log records. A failed or dropped record never
/// alters the outcome of the operation being logged.
#[async_trait]
pub trait LogSink: Send {
    fn record(&self, action: &str, message: &str);
    /// Best-effort teardown; must never fail loudly.
    async fn shutdown(&mut self);
}

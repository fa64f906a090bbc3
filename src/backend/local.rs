// ABOUTME: In-process backends for --local mode and tests — no child processes involved.
// ABOUTME: Same validation, same transform, same log record format as the workers.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{CipherService, LogSink, ServiceError};
use crate::cipher::{CipherError, CipherState};
use crate::logfmt;

fn reject(err: CipherError) -> ServiceError {
    ServiceError::Rejected(err.to_string())
}

/// Cipher service holding its key state in-process.
#[derive(Debug, Default)]
pub struct LocalCipher {
    state: CipherState,
}

#[async_trait]
impl CipherService for LocalCipher {
    async fn set_key(&mut self, key: &str) -> Result<(), ServiceError> {
        self.state.set_key(key).map_err(reject)
    }

    async fn encrypt(&mut self, text: &str) -> Result<String, ServiceError> {
        self.state.encrypt(text).map_err(reject)
    }

    async fn decrypt(&mut self, text: &str) -> Result<String, ServiceError> {
        self.state.decrypt(text).map_err(reject)
    }

    async fn shutdown(&mut self) {}
}

/// Log sink that appends records directly to the file, in the same format
/// the log worker writes.
pub struct FileLog {
    file: Mutex<File>,
}

impl FileLog {
    /// Open the log file for append, creating parent directories as needed.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl LogSink for FileLog {
    fn record(&self, action: &str, message: &str) {
        let line = logfmt::render(&logfmt::timestamp(), action, message);
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }

    async fn shutdown(&mut self) {}
}

// ABOUTME: Integration tests for the interactive session — menu loop, history, logging.
// ABOUTME: Drives the App through a scripted console with in-process backends.

use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cipherdesk::app::App;
use cipherdesk::backend::{CipherService, FileLog, LocalCipher, LogSink, ServiceError};
use cipherdesk::console::Console;
use cipherdesk::logfmt;

/// Console that replays scripted user input and captures everything shown.
struct ScriptedConsole {
    inputs: VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: Vec::new(),
        }
    }

    fn shown(&self) -> String {
        self.output.join("\n")
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn prompt(&mut self, prompt: &str) -> Option<String> {
        self.output.push(prompt.to_string());
        self.inputs.pop_front()
    }

    fn say(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}

/// Log sink that keeps `ACTION message` lines in memory for assertions.
#[derive(Clone, Default)]
struct MemoryLog {
    records: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    fn lines(&self) -> Vec<String> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSink for MemoryLog {
    fn record(&self, action: &str, message: &str) {
        self.records
            .lock()
            .unwrap()
            .push(format!("{action} {message}"));
    }

    async fn shutdown(&mut self) {}
}

/// Cipher backend that never answers, as if both the worker and its
/// replacement were gone.
struct DownCipher;

#[async_trait]
impl CipherService for DownCipher {
    async fn set_key(&mut self, _key: &str) -> Result<(), ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn encrypt(&mut self, _text: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn decrypt(&mut self, _text: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    async fn shutdown(&mut self) {}
}

async fn run_session(inputs: &[&str]) -> (ScriptedConsole, Vec<String>) {
    let mut console = ScriptedConsole::new(inputs);
    let log = MemoryLog::default();
    let mut app = App::new(Box::new(LocalCipher::default()), Box::new(log.clone()));
    app.run(&mut console).await.unwrap();
    (console, log.lines())
}

/// A full session: set a key, encrypt new text, decrypt the ciphertext picked
/// from history, list history, quit.
#[tokio::test]
async fn full_session_roundtrip() {
    let (console, log) = run_session(&[
        "password", "KEY", // no history yet, straight to new input
        "encrypt", "Hello", // appended to history, result appended too
        "decrypt", "2", // pick "RIJVS" from history
        "history", "quit",
    ])
    .await;

    let shown = console.shown();
    assert!(shown.contains("Passkey set."));
    assert!(shown.contains("RIJVS"));
    assert!(shown.contains("HELLO"));
    assert!(shown.contains("  1) Hello"));
    assert!(shown.contains("  3) HELLO"));
    assert!(shown.contains("Goodbye!"));

    assert!(log.contains(&"START Session started".to_string()));
    assert!(log.contains(&"CMD password ****".to_string()));
    assert!(log.contains(&"RESULT password set".to_string()));
    assert!(log.contains(&"RESULT encrypt -> RIJVS".to_string()));
    assert!(log.contains(&"RESULT decrypt -> HELLO".to_string()));
    assert!(log.contains(&"RESULT history count 3".to_string()));
    assert!(log.contains(&"CMD quit".to_string()));
    assert!(log.contains(&"EXIT Session ending".to_string()));
}

/// The key's plaintext never reaches the log, only the redacted marker.
#[tokio::test]
async fn key_material_never_reaches_the_log() {
    let (_console, log) = run_session(&["password", "SWORDFISH", "quit"]).await;

    let joined = log.join("\n");
    assert!(!joined.contains("SWORDFISH"));
    assert!(joined.contains("password ****"));
}

/// New encrypt/decrypt text re-prompts until it is letters only.
#[tokio::test]
async fn transform_input_reprompts_until_letters_only() {
    let (console, log) = run_session(&[
        "password", "KEY", "encrypt", "not letters!", "123", "Hello", "quit",
    ])
    .await;

    let shown = console.shown();
    assert_eq!(shown.matches("Error: letters only. Try again.").count(), 2);
    assert!(shown.contains("RIJVS"));
    assert_eq!(
        log.iter()
            .filter(|l| *l == "ERROR encrypt invalid input")
            .count(),
        2
    );
}

/// A bad passkey prints one error and returns to the menu; no key is set, so
/// a following encrypt reports it.
#[tokio::test]
async fn invalid_password_returns_to_menu() {
    let (console, log) = run_session(&["password", "p4ss", "encrypt", "Hello", "quit"]).await;

    let shown = console.shown();
    assert!(shown.contains("Error: letters only."));
    assert!(shown.contains("Error: Password not set"));
    assert!(log.contains(&"ERROR Invalid password input".to_string()));
    assert!(log.contains(&"ERROR Password not set".to_string()));
}

/// Invalid history picks re-prompt; a valid 1-based index then returns the
/// exact stored string.
#[tokio::test]
async fn history_picker_rejects_invalid_choices() {
    let (console, log) = run_session(&[
        "password", "KEY", "encrypt", "Hello", // history: Hello, RIJVS
        "decrypt", "9", "x", "-1", "2", // bad picks, then entry 2 ("RIJVS")
        "quit",
    ])
    .await;

    let shown = console.shown();
    assert_eq!(shown.matches("Invalid choice.").count(), 3);
    assert!(log.contains(&"RESULT decrypt -> HELLO".to_string()));
}

/// Choice 0 always falls through to fresh input even when history has entries.
#[tokio::test]
async fn picker_zero_prompts_for_new_input() {
    let (console, _log) = run_session(&[
        "password", "KEY", "encrypt", "Hello", // history: Hello, RIJVS
        "encrypt", "0", "World", "quit",
    ])
    .await;

    let shown = console.shown();
    assert!(shown.contains("Enter letters to encrypt: "));
    // W+K=G, O+E=S, R+Y=P, L+K=V, D+E=H
    assert!(shown.contains("GSPVH"));
}

/// The word "new" works like choice 0 in the picker.
#[tokio::test]
async fn picker_accepts_new_as_synonym_for_zero() {
    let (console, _log) = run_session(&[
        "password", "KEY", "encrypt", "Hello", // history: Hello, RIJVS
        "encrypt", "new", "World", "quit",
    ])
    .await;

    assert!(console.shown().contains("GSPVH"));
}

/// A backend that stays dead surfaces a per-command error without ending the
/// session loop.
#[tokio::test]
async fn unavailable_backend_is_nonfatal() {
    let mut console = ScriptedConsole::new(&["password", "KEY", "encrypt", "Hello", "quit"]);
    let log = MemoryLog::default();
    let mut app = App::new(Box::new(DownCipher), Box::new(log.clone()));
    app.run(&mut console).await.unwrap();

    let shown = console.shown();
    assert_eq!(shown.matches("Error: backend unavailable").count(), 2);
    assert!(shown.contains("Goodbye!"), "loop must survive to quit");
    assert_eq!(
        log.lines()
            .iter()
            .filter(|l| *l == "ERROR backend unavailable")
            .count(),
        2
    );
}

/// Unknown menu entries are reported and logged, and the loop continues.
#[tokio::test]
async fn unknown_menu_command_is_logged() {
    let (console, log) = run_session(&["frobnicate", "quit"]).await;

    assert!(console.shown().contains("Unknown command."));
    assert!(log.contains(&"ERROR Unknown command 'frobnicate'".to_string()));
}

/// End of input tears the session down the same way quit does.
#[tokio::test]
async fn end_of_input_ends_the_session() {
    let (_console, log) = run_session(&["history"]).await;
    assert!(log.contains(&"EXIT Session ending".to_string()));
}

/// The --local file sink writes records in the worker's on-disk format.
#[tokio::test]
async fn file_log_session_matches_record_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.log");

    let mut console = ScriptedConsole::new(&["password", "KEY", "quit"]);
    let mut app = App::new(
        Box::new(LocalCipher::default()),
        Box::new(FileLog::open(&path).unwrap()),
    );
    app.run(&mut console).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("KEY"), "no key material on disk");
    for line in content.lines() {
        assert!(logfmt::looks_like_record(line), "malformed record: {line}");
    }
    assert!(content.lines().any(|l| l.contains("[CMD] password ****")));
}

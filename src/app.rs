// ABOUTME: App orchestrator — drives the interactive menu against the cipher and log backends.
// ABOUTME: Owns session history, translates intents into requests, and tears both workers down on quit.

use crate::backend::{CipherService, LogSink, ServiceError};
use crate::cipher::letters_only;
use crate::console::Console;
use crate::history::History;

const MENU: &str = "\nCommands:
  password  - set passkey (letters only)
  encrypt   - encrypt a string (letters only)
  decrypt   - decrypt a string (letters only)
  history   - show history (this run only)
  quit      - exit
";

/// Which transform a user intent maps to.
#[derive(Debug, Clone, Copy)]
enum Op {
    Encrypt,
    Decrypt,
}

impl Op {
    fn verb(self) -> &'static str {
        match self {
            Op::Encrypt => "encrypt",
            Op::Decrypt => "decrypt",
        }
    }
}

/// Outcome of the history picker.
enum Selection {
    Existing(String),
    New,
    Eof,
}

/// Top-level session controller.
pub struct App {
    cipher: Box<dyn CipherService>,
    log: Box<dyn LogSink>,
    history: History,
}

impl App {
    pub fn new(cipher: Box<dyn CipherService>, log: Box<dyn LogSink>) -> Self {
        Self {
            cipher,
            log,
            history: History::new(),
        }
    }

    /// Run the interactive loop until `quit` or end of input, then tear the
    /// workers down.
    pub async fn run<C: Console>(&mut self, console: &mut C) -> anyhow::Result<()> {
        self.log.record("START", "Session started");

        loop {
            console.say(MENU);
            let Some(command) = console.prompt("Enter command: ").await else {
                break;
            };
            match command.to_lowercase().as_str() {
                "password" => self.cmd_password(console).await,
                "encrypt" => self.cmd_transform(console, Op::Encrypt).await,
                "decrypt" => self.cmd_transform(console, Op::Decrypt).await,
                "history" => self.cmd_history(console),
                "quit" => {
                    self.log.record("CMD", "quit");
                    console.say("Goodbye!");
                    break;
                }
                other => {
                    console.say("Unknown command.");
                    self.log.record("ERROR", &format!("Unknown command '{other}'"));
                }
            }
        }

        self.log.record("EXIT", "Session ending");
        // QUIT both workers best-effort; each waits a bounded interval for
        // its process to exit, then kills it.
        self.cipher.shutdown().await;
        self.log.shutdown().await;
        Ok(())
    }

    async fn cmd_password<C: Console>(&mut self, console: &mut C) {
        let key = match self
            .pick_or_new(console, "Select a history string for password or 0 for new")
            .await
        {
            Selection::Existing(entry) => entry,
            Selection::New => {
                let Some(input) = console.prompt("Enter passkey (letters only): ").await else {
                    return;
                };
                input
            }
            Selection::Eof => return,
        };

        if key.is_empty() || !letters_only(&key) {
            console.say("Error: letters only.");
            self.log.record("ERROR", "Invalid password input");
            return;
        }

        // The key itself never reaches the log, only the redacted marker.
        self.log.record("CMD", "password ****");
        match self.cipher.set_key(&key).await {
            Ok(()) => {
                console.say("Passkey set.");
                self.log.record("RESULT", "password set");
            }
            Err(err) => self.report(console, &err),
        }
    }

    async fn cmd_transform<C: Console>(&mut self, console: &mut C, op: Op) {
        let verb = op.verb();
        let text = match self
            .pick_or_new(
                console,
                &format!("Select a history string to {verb} or 0 for new"),
            )
            .await
        {
            Selection::Existing(entry) => entry,
            Selection::New => loop {
                let Some(input) = console.prompt(&format!("Enter letters to {verb}: ")).await
                else {
                    return;
                };
                if !input.is_empty() && letters_only(&input) {
                    self.history.push(input.clone());
                    break input;
                }
                console.say("Error: letters only. Try again.");
                self.log.record("ERROR", &format!("{verb} invalid input"));
            },
            Selection::Eof => return,
        };

        self.log.record("CMD", verb);
        let outcome = match op {
            Op::Encrypt => self.cipher.encrypt(&text).await,
            Op::Decrypt => self.cipher.decrypt(&text).await,
        };
        match outcome {
            Ok(result) => {
                console.say(&result);
                self.history.push(result.clone());
                self.log.record("RESULT", &format!("{verb} -> {result}"));
            }
            Err(err) => self.report(console, &err),
        }
    }

    fn cmd_history<C: Console>(&mut self, console: &mut C) {
        if self.history.is_empty() {
            console.say("(empty)");
        } else {
            console.say("History:");
            console.say(&self.history.render());
        }
        self.log.record("CMD", "history");
        self.log
            .record("RESULT", &format!("history count {}", self.history.len()));
    }

    /// History picker: numbered entries plus `0` for new input; invalid
    /// choices re-prompt. An empty history skips straight to new input.
    async fn pick_or_new<C: Console>(&mut self, console: &mut C, prompt: &str) -> Selection {
        if self.history.is_empty() {
            console.say("History is empty.");
            return Selection::New;
        }
        loop {
            console.say("\nHistory:");
            console.say(&self.history.render());
            console.say("  0) Enter a new string");
            let Some(choice) = console
                .prompt(&format!("{prompt} [0..{}]: ", self.history.len()))
                .await
            else {
                return Selection::Eof;
            };
            if choice.eq_ignore_ascii_case("new") {
                return Selection::New;
            }
            if let Ok(index) = choice.parse::<usize>() {
                if index == 0 {
                    return Selection::New;
                }
                if let Some(entry) = self.history.get(index) {
                    return Selection::Existing(entry.to_string());
                }
            }
            console.say("Invalid choice.");
        }
    }

    /// Show a failed operation to the user and the log. Only the reason text
    /// is surfaced, never the raw protocol line.
    fn report<C: Console>(&self, console: &mut C, err: &ServiceError) {
        console.say(&format!("Error: {err}"));
        self.log.record("ERROR", &err.to_string());
    }
}

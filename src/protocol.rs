// ABOUTME: Wire protocol for the cipher channel — one request line, one response line.
// ABOUTME: Framing is "first token, single space, rest of line" in both directions.

use std::fmt;

/// A request line on the cipher channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Pass(String),
    Encrypt(String),
    Decrypt(String),
    Quit,
}

impl Request {
    /// Parse one request line. `PASSKEY` is accepted as an alias of `PASS`.
    /// `QUIT` must stand alone on its line. Returns `None` for anything the
    /// worker answers with `ERROR Unknown command`.
    pub fn parse(line: &str) -> Option<Request> {
        let (command, arg) = split_line(line);
        match command {
            "PASS" | "PASSKEY" => Some(Request::Pass(arg.to_string())),
            "ENCRYPT" => Some(Request::Encrypt(arg.to_string())),
            "DECRYPT" => Some(Request::Decrypt(arg.to_string())),
            "QUIT" if arg.is_empty() => Some(Request::Quit),
            _ => None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Pass(key) => write!(f, "PASS {key}"),
            Request::Encrypt(text) => write!(f, "ENCRYPT {text}"),
            Request::Decrypt(text) => write!(f, "DECRYPT {text}"),
            Request::Quit => write!(f, "QUIT"),
        }
    }
}

/// A response line on the cipher channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success, with an optional payload (`PASS` replies carry none).
    Result(String),
    /// Failure, with a human-readable reason.
    Error(String),
}

impl Response {
    /// Parse one response line; `None` if the line is not a protocol response.
    pub fn parse(line: &str) -> Option<Response> {
        let (command, arg) = split_line(line);
        match command {
            "RESULT" => Some(Response::Result(arg.to_string())),
            "ERROR" => Some(Response::Error(arg.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Result(payload) if payload.is_empty() => write!(f, "RESULT"),
            Response::Result(payload) => write!(f, "RESULT {payload}"),
            Response::Error(reason) => write!(f, "ERROR {reason}"),
        }
    }
}

/// Split a line at the first space into `(first token, rest)`.
fn split_line(line: &str) -> (&str, &str) {
    match line.split_once(' ') {
        Some((command, arg)) => (command, arg),
        None => (line, ""),
    }
}

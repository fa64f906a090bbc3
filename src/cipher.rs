// ABOUTME: Vigenère transform and the cipher worker's key state.
// ABOUTME: Error variants carry the exact reason strings the wire protocol exposes.

use thiserror::Error;

/// Validation and precondition failures for cipher operations.
///
/// The `Display` text of each variant is sent over the wire as the reason in
/// `ERROR <reason>` responses, so the wording must stay stable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("Passkey must contain letters only")]
    InvalidKey,
    #[error("Password not set")]
    KeyNotSet,
    #[error("Input must be letters only")]
    InvalidText,
}

/// Transform direction: forward shift for encryption, backward for decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// True when every character of `s` is an ASCII letter. Empty strings pass;
/// callers that require non-empty input check that separately.
pub fn letters_only(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphabetic())
}

/// Uppercase and drop every non-letter. The transform operates on this form,
/// so its output length equals the letter count of the input.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Polyalphabetic shift of `text` under `key`, cycling the key over the
/// normalized input. Shift arithmetic is on 0–25 letter indices with mod-26
/// wraparound; decryption is the additive inverse of encryption.
pub fn vigenere(text: &str, key: &str, direction: Direction) -> String {
    let text = normalize(text);
    let key = normalize(key).into_bytes();
    if key.is_empty() {
        return text;
    }
    text.bytes()
        .enumerate()
        .map(|(i, b)| {
            let p = i32::from(b - b'A');
            let shift = i32::from(key[i % key.len()] - b'A');
            let c = match direction {
                Direction::Encrypt => (p + shift).rem_euclid(26),
                Direction::Decrypt => (p - shift).rem_euclid(26),
            };
            char::from(b'A' + c as u8)
        })
        .collect()
}

/// Key state held by a cipher service.
///
/// The key is a single private field, replaced only through a successful
/// [`set_key`](Self::set_key) and never visible outside this type.
#[derive(Debug, Default)]
pub struct CipherState {
    key: Option<String>,
}

impl CipherState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a new session key, normalized to uppercase.
    /// A rejected key leaves any previously held key unchanged.
    pub fn set_key(&mut self, key: &str) -> Result<(), CipherError> {
        if key.is_empty() || !letters_only(key) {
            return Err(CipherError::InvalidKey);
        }
        self.key = Some(normalize(key));
        Ok(())
    }

    pub fn encrypt(&self, text: &str) -> Result<String, CipherError> {
        self.transform(text, Direction::Encrypt)
    }

    pub fn decrypt(&self, text: &str) -> Result<String, CipherError> {
        self.transform(text, Direction::Decrypt)
    }

    fn transform(&self, text: &str, direction: Direction) -> Result<String, CipherError> {
        let key = self.key.as_deref().ok_or(CipherError::KeyNotSet)?;
        if text.is_empty() || !letters_only(text) {
            return Err(CipherError::InvalidText);
        }
        Ok(vigenere(text, key, direction))
    }
}

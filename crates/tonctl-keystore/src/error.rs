//! Error types for the key store.

use thiserror::Error;

/// Key store and mnemonic errors.
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// No mnemonic stored for the given address.
    #[error("mnemonic not found for address {0}")]
    MnemonicNotFound(String),

    /// The stored or supplied mnemonic failed validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// A word is not in the wordlist.
    #[error("invalid word in mnemonic: {0}")]
    InvalidWord(String),

    /// Wrong number of words.
    #[error("wrong word count: expected 24, got {0}")]
    WrongWordCount(usize),

    /// Key file I/O failure.
    #[error("key file error: {0}")]
    Io(#[from] std::io::Error),

    /// Key file is not valid JSON.
    #[error("key file parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for key store operations.
pub type KeystoreResult<T> = Result<T, KeystoreError>;

//! Store error taxonomy
//!
//! Every engine operation returns its outcome as a `Result` with one of
//! these error kinds. The engine never logs or retries; adapters translate
//! the kinds into protocol-appropriate responses.

use std::fmt;

/// Errors returned by the store engine and the snapshot codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key does not exist (or is expired)
    KeyNotFound,

    /// The value is not present under the given key
    ValueNotFound,

    /// Out-of-range count for a random sample
    InvalidCount,

    /// No expiration record exists for the key
    NoExpirySet,

    /// The key's TTL has already elapsed
    Expired,

    /// A snapshot could not be parsed
    MalformedSnapshot(String),

    /// The snapshot file does not exist
    FileNotFound(String),

    /// Snapshot I/O failure
    Io(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::KeyNotFound => write!(f, "key not found"),
            StoreError::ValueNotFound => write!(f, "value not found"),
            StoreError::InvalidCount => write!(f, "invalid count value"),
            StoreError::NoExpirySet => write!(f, "no TTL set for key"),
            StoreError::Expired => write!(f, "key has expired"),
            StoreError::MalformedSnapshot(msg) => write!(f, "malformed snapshot: {}", msg),
            StoreError::FileNotFound(path) => write!(f, "dump file does not exist: {}", path),
            StoreError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

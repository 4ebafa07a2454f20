//! Fingerprint Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, matching the other crates in the workspace.

use derive_more::{Display, Error};

/// A fingerprint error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fingerprint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A textual fingerprint was not exactly 16 hexadecimal digits.
    #[display("invalid fingerprint: {_0:?}")]
    InvalidFingerprint(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

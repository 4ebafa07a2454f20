use derive_more::{Display, Error};

/// A scene scan error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scene scans.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum ErrorKind {
    /// The scan was started from an index that isn't in the sequence.
    #[display("cannot scan from index {start} of {len} entries")]
    InvalidStart { start: usize, len: usize },
    #[display("invalid scan options: {_0}")]
    InvalidOptions(#[error(not(source))] String),
    /// Fingerprinting the entry at this index failed; the cause is the child
    /// error.
    #[display("failed to fingerprint entry {_0}")]
    Fingerprint(#[error(not(source))] usize),
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        false
    }
}

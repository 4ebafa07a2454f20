use derive_more::{Display, Error};

/// A reader session error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of step failed. The container, scene or sibling error that
/// caused it is the child in the error tree.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("no container is loaded")]
    NotLoaded,
    #[display("container operation failed")]
    Container,
    #[display("scene search failed")]
    Scene,
    #[display("sibling navigation failed")]
    Siblings,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        false
    }
}

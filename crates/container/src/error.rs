//! Container Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Underlying I/O, zip and codec errors
//! are kept as children in the error tree; the [`ErrorKind`] on top is what
//! callers match on.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A container error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Every one of them is recoverable: report it and keep the previous state.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend could not be read: missing file, corrupt archive
    /// structure, permission error.
    #[display("failed to open container: {}", _0.display())]
    OpenFailed(#[error(not(source))] PathBuf),
    /// The container was readable but holds no recognised images.
    #[display("no images in container: {}", _0.display())]
    EmptyContainer(#[error(not(source))] PathBuf),
    /// Entry index outside `[0, len)`.
    #[display("index {index} out of bounds for {len} entries")]
    OutOfBounds { index: usize, len: usize },
    /// Entry bytes could not be read or parsed as a supported image.
    #[display("failed to decode entry: {_0}")]
    DecodeFailed(#[error(not(source))] String),
    /// The path's extension is not a container format that can be opened.
    #[display("unsupported container format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// Sibling listing was asked to list something other than a directory.
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// The current container is no longer listed in its directory (deleted
    /// or renamed after it was opened).
    #[display("container not found in its directory: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Sibling navigation ran past the first or last container.
    #[display("no more containers in the directory")]
    NoMoreSiblings,
    /// The container has been closed.
    #[display("container is closed")]
    Closed,
    /// A filesystem operation failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::NotFound(_))
    }
}

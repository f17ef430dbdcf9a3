//! Error types for handles, backing stores and locations.

use std::io;

/// Coarse classification of every [`HandleError`].
///
/// Callers that only care about *what kind* of failure happened (for example
/// to stop a decoding loop at end of data) match on this instead of the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A read asked for bytes beyond the current length.
    EndOfStream,
    /// The operation is outside the handle's capability set.
    Unsupported,
    /// The disk or network failed underneath us.
    ResourceIo,
    /// The path could not be interpreted.
    InvalidPath,
}

/// Error returned by every fallible operation in this crate.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// A read requested bytes past the end of the data.
    #[error("end of stream: {requested} byte(s) at offset {offset} exceeds length {length}")]
    EndOfStream {
        /// File pointer at the time of the read.
        offset: u64,
        /// Number of bytes requested.
        requested: u64,
        /// Length of the handle.
        length: u64,
    },

    /// The operation is not available on this handle or location.
    #[error("operation not supported: {operation}")]
    Unsupported {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// Local I/O failure.
    #[error("I/O error on {path}: {source}")]
    ResourceIo {
        /// Path of the resource.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Transport failure while talking to a remote resource.
    #[error("request to {url} failed: {source}")]
    Remote {
        /// URL of the resource.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP status {status}")]
    HttpStatus {
        /// URL of the resource.
        url: String,
        /// Status code received.
        status: u16,
    },

    /// The server did not declare a content length.
    #[error("{url} did not report a content length")]
    UnknownLength {
        /// URL of the resource.
        url: String,
    },

    /// The path string cannot name a resource.
    #[error("invalid path: {path} ({reason})")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An access mode string other than `r` or `rw`.
    #[error("invalid access mode: {0:?} (expected \"r\" or \"rw\")")]
    InvalidMode(String),
}

impl HandleError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandleError::EndOfStream { .. } => ErrorKind::EndOfStream,
            HandleError::Unsupported { .. } | HandleError::InvalidMode(_) => ErrorKind::Unsupported,
            HandleError::ResourceIo { .. }
            | HandleError::Remote { .. }
            | HandleError::HttpStatus { .. }
            | HandleError::UnknownLength { .. } => ErrorKind::ResourceIo,
            HandleError::InvalidPath { .. } => ErrorKind::InvalidPath,
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        HandleError::ResourceIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn remote(url: impl Into<String>, source: reqwest::Error) -> Self {
        HandleError::Remote {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn unsupported(operation: &'static str) -> Self {
        HandleError::Unsupported { operation }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HandleError>;

//! Error types for IBT decoding and lap segmentation.
//!
//! Only structural problems surface as errors. Truncated sample regions, corrupt trailing
//! records and lap-level anomalies are absorbed into the [`Session`](crate::Session) result
//! (a truncation flag, invalidated laps) so that one bad sample never discards a multi-hour
//! recording.
//!
//! ## Error Categories
//!
//! - **Structural**: [`ParseError::MalformedHeader`] and [`ParseError::UnsupportedVersion`]
//!   abort the whole parse
//! - **Truncation**: [`ParseError::TruncatedFile`] is only produced on request through
//!   [`Session::require_complete`](crate::Session::require_complete) and carries the partial
//!   session
//! - **Binary Reader**: [`ParseError::OutOfRange`] is raised by positional reads and recovered
//!   per record by the sample decoder
//! - **I/O**: [`ParseError::File`] wraps failures opening or reading the backing file
//!
//! ```rust
//! use stint::ParseError;
//!
//! let error = ParseError::malformed_header("var table extends past end of file");
//! assert!(error.is_fatal());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::Session;

/// Result type alias for decoding operations.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Main error type for IBT parsing.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    #[error("Malformed IBT header: {reason}")]
    MalformedHeader { reason: String },

    #[error("Unsupported IBT version {found} (supported {min}..={max})")]
    UnsupportedVersion { found: i32, min: i32, max: i32 },

    #[error(
        "IBT file truncated: decoded {decoded} of {declared} declared samples ({} laps recovered)",
        session.laps.len()
    )]
    TruncatedFile { decoded: usize, declared: usize, session: Box<Session> },

    #[error("Read of {len} bytes at offset {offset:#x} is out of range (source holds {available})")]
    OutOfRange { offset: u64, len: usize, available: u64 },

    #[error("IBT file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse cancelled after {records} records")]
    Cancelled { records: usize },

    #[error("Channel '{channel}' not found in var table")]
    FieldNotFound { channel: String },

    #[error("Type conversion error: {details}")]
    TypeConversion { details: String },

    #[error("Session info error in {context}: {details}")]
    Session { context: String, details: String },
}

impl ParseError {
    /// Returns whether the error aborts the whole file.
    ///
    /// Fatal errors carry no partial result; retrying with the same bytes will fail again.
    pub fn is_fatal(&self) -> bool {
        match self {
            ParseError::MalformedHeader { .. } => true,
            ParseError::UnsupportedVersion { .. } => true,
            ParseError::File { .. } => true,
            ParseError::Cancelled { .. } => true,
            ParseError::TruncatedFile { .. } => false,
            ParseError::OutOfRange { .. } => false,
            ParseError::FieldNotFound { .. } => false,
            ParseError::TypeConversion { .. } => false,
            ParseError::Session { .. } => false,
        }
    }

    /// Returns whether a caller-side retry could succeed.
    ///
    /// The core never retries by itself; this is guidance for the task queue.
    pub fn is_retryable(&self) -> bool {
        match self {
            ParseError::File { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            ParseError::Cancelled { .. } => true,
            _ => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ParseError::MalformedHeader { .. } => vec![
                "Verify the upload completed and the file is an iRacing .ibt recording",
                "Re-export the telemetry file from the simulator",
            ],
            ParseError::UnsupportedVersion { .. } => vec![
                "Check the recording was produced by a supported simulator build",
                "Update the library to a version that knows this format revision",
            ],
            ParseError::TruncatedFile { .. } => vec![
                "Use the partial session carried by this error",
                "Re-upload the complete file if the final laps are required",
            ],
            ParseError::OutOfRange { .. } => vec![
                "Check the requested offset against the source length",
                "Treat the remaining records as truncated",
            ],
            ParseError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Ensure the file is not still being written",
            ],
            ParseError::Cancelled { .. } => vec!["Resubmit the parse if the result is still needed"],
            ParseError::FieldNotFound { .. } => vec![
                "Check channel name spelling (names are case sensitive)",
                "List available channels from the var table",
            ],
            ParseError::TypeConversion { .. } => vec![
                "Check the channel's declared type in the var table",
                "Use the generic Value accessors instead of a fixed type",
            ],
            ParseError::Session { .. } => vec![
                "Inspect the raw session-info block",
                "Fall back to the best-effort SessionInfo summary",
            ],
        }
    }

    /// Helper constructor for structural header errors.
    pub fn malformed_header(reason: impl Into<String>) -> Self {
        ParseError::MalformedHeader { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        ParseError::File { path, source }
    }

    /// Helper constructor for out-of-range positional reads.
    pub fn out_of_range(offset: u64, len: usize, available: u64) -> Self {
        ParseError::OutOfRange { offset, len, available }
    }

    /// Helper constructor for session-info document errors.
    pub fn session(context: impl Into<String>, details: impl Into<String>) -> Self {
        ParseError::Session { context: context.into(), details: details.into() }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

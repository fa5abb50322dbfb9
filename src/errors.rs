//! Error types for the retrieval core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for index construction, persistence, and querying.
///
/// Lookups on missing terms or documents are never errors — they are total
/// operations that return `None` or an empty result. Only construction and
/// persistence can fail.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// A snapshot could not be written to disk.
    #[error("failed to persist snapshot at `{path}`: {message}")]
    IoFailure {
        /// Path the snapshot was being written to.
        path: PathBuf,
        /// Underlying I/O failure description.
        message: String,
    },

    /// A snapshot exists but its binary form could not be decoded.
    #[error("snapshot at `{path}` is corrupt: {message}")]
    SnapshotCorrupt {
        /// Path the snapshot was read from.
        path: PathBuf,
        /// Description of the decode failure.
        message: String,
    },

    /// A snapshot was produced by an incompatible format version.
    #[error("snapshot at `{path}` has version {found}, expected {expected}")]
    SnapshotVersionMismatch {
        /// Path the snapshot was read from.
        path: PathBuf,
        /// Version found in the snapshot header.
        found: u32,
        /// Version this build expects.
        expected: u32,
    },

    /// LSH parameters are mutually inconsistent (e.g. `signature_length`
    /// not divisible by `band_count`). Surfaced at build start, before any
    /// work is done.
    #[error("invalid LSH parameters: {message}")]
    ParameterMismatch {
        /// Description of the mismatch.
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, RetrievalError>;

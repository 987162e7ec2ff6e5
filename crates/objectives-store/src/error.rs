//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by progress stores beyond plain I/O failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored data exists but cannot be understood.
    #[error("progress file {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The store location cannot hold a file.
    #[error("progress path {} is a directory", .0.display())]
    IsDirectory(PathBuf),
}

//! Report error types.

use thiserror::Error;

/// Errors that can occur while writing a document to disk.
///
/// Documents are produced after the balance mutation has committed; callers
/// log these failures instead of rolling anything back.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem write failed.
    #[error("unable to write report file: {0}")]
    Io(#[from] std::io::Error),
}

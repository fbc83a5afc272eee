use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions a sort can end with.
///
/// The library returns [anyhow::Error] like the rest of its API; these values are the root
/// cause of the error so callers can branch on them with `downcast_ref::<SortError>()`.
/// I/O failures are not listed here, they keep their [std::io::Error] root cause.
#[derive(Debug, Error)]
pub enum SortError {
    /// The input file does not exist
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// The directory that should contain the output does not exist
    #[error("destination directory not found: {}", .0.display())]
    DestinationNotFound(PathBuf),
    /// The output file cannot be created or truncated for lack of permission
    #[error("destination not writable: {}", .0.display())]
    DestinationNotWritable(PathBuf),
    /// A line could not be parsed while strict mode was on
    #[error("malformed record, file: {}, line: {line}", path.display())]
    MalformedRecord { path: PathBuf, line: u64 },
    /// The cancellation flag was raised
    #[error("sort cancelled")]
    Cancelled,
}

//! Submodule defining the errors used across the crate.

use std::io;
use std::path::PathBuf;

/// Errors that can abort a split run.
///
/// Every variant is fatal: the run stops at the first one. Statements that
/// cannot be attributed to a table are not errors, they are routed to
/// [`FALLBACK_TABLE`](crate::FALLBACK_TABLE).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tunable was rejected before the run started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// The source dump could not be opened.
    #[error("Failed to open source file {}", path.display())]
    OpenSource {
        /// Path of the source dump.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The source dump metadata could not be read.
    #[error("Failed to stat source file {}", path.display())]
    StatSource {
        /// Path of the source dump.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The output directory could not be created.
    #[error("Failed to create output directory {}", path.display())]
    CreateOutputDir {
        /// Path of the output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading the next chunk from the source failed.
    #[error("Failed to read source after {offset} bytes")]
    Read {
        /// Number of bytes successfully read before the failure.
        offset: u64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The destination for a table could not be created.
    #[error("Failed to create destination for table `{table}`")]
    CreateDestination {
        /// Table whose destination was being created.
        table: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Flushing buffered statements to a table destination failed.
    #[error("Failed to write {bytes} bytes to destination for table `{table}`")]
    Write {
        /// Table whose destination was being written.
        table: String,
        /// Size of the write that failed.
        bytes: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_write_error_keeps_context_and_source() {
        let err = Error::Write {
            table: "users".into(),
            bytes: 42,
            source: io::Error::new(io::ErrorKind::StorageFull, "disk full"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to write 42 bytes to destination for table `users`"
        );
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn test_setup_error_names_the_path() {
        let err = Error::OpenSource {
            path: PathBuf::from("/nope/dump.sql"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "Failed to open source file /nope/dump.sql");
    }
}

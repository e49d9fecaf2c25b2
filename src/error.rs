//! Error types for the file2json library.
//!
//! Two kinds of failure exist in this crate, and only one of them is an
//! error in the Rust sense:
//!
//! * A **conversion failure** (service unreachable, malformed response, the
//!   service reporting `success: false`) is a normal lifecycle outcome. It is
//!   carried as [`crate::client::ConversionOutcome::Failure`] and ends the
//!   cycle in the result phase; the session keeps going.
//!
//! * [`File2JsonError`] covers the operations around the lifecycle that can
//!   genuinely fail: picking a path that does not exist, building an invalid
//!   client configuration, or writing the download artifact.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the file2json library.
#[derive(Debug, Error)]
pub enum File2JsonError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// The chosen file does not exist.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but is a directory or other non-regular file.
    #[error("'{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    /// Any other I/O failure while inspecting the chosen path.
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Export errors ─────────────────────────────────────────────────────
    /// There is no successful result with a payload to save.
    #[error("Nothing to export: no successful conversion result is available")]
    NothingToExport,

    /// Could not create or write the artifact file.
    #[error("Failed to write artifact '{path}': {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload could not be serialised back to JSON text.
    #[error("Failed to serialise payload: {0}")]
    Serialize(#[from] serde_json::Error),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = File2JsonError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("missing.pdf"));
    }

    #[test]
    fn artifact_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = File2JsonError::ArtifactWriteFailed {
            path: PathBuf::from("out/report_converted.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(e.to_string().contains("disk full"));
        assert!(e.source().is_some());
    }

    #[test]
    fn invalid_config_display() {
        let e = File2JsonError::InvalidConfig("base URL is empty".into());
        assert_eq!(e.to_string(), "Invalid configuration: base URL is empty");
    }
}

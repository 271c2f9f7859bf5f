//! Error types.

use thiserror::Error;

/// Result alias for sandbox resolution operations.
pub type Result<T> = std::result::Result<T, DnsError>;

/// Errors returned by sandbox resolution operations.
#[derive(Debug, Error)]
pub enum DnsError {
    /// Filesystem I/O failed for a reason other than "not found".
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An origin file existed but could not be copied into the sandbox.
    #[error("could not copy origin file {src} to {dst}: {source}")]
    CopyOrigin {
        /// Origin path on the host.
        src: String,
        /// Destination path inside the sandbox directory.
        dst: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A user-supplied `ndots` resolver option is malformed or negative.
    #[error("invalid ndots option {0:?}")]
    InvalidNdots(String),

    /// `rebuild_dns` was called before an embedded resolver was installed.
    #[error("no embedded resolver installed for this sandbox")]
    ResolverNotInstalled,
}

impl DnsError {
    /// Returns `true` if the underlying I/O error is `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

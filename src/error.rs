//! Error taxonomy for the automator

use thiserror::Error;

/// Failure categories surfaced by the automator.
///
/// Every variant carries enough context (field name, row index, or URL) to
/// diagnose without re-running with debug logging.
#[derive(Debug, Error)]
pub enum Error {
    /// Navigation or a post-navigation wait did not complete.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The site rejected the credentials (a login-error message was shown).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The search form was unavailable, an input was missing, or a filter
    /// value was not among the control's options.
    #[error("search failed: {0}")]
    Search(String),

    /// A listing row or detail field could not be extracted.
    #[error("parsing failed: {0}")]
    Parsing(String),

    /// Missing download link, failed fetch, or a missing file on delete.
    #[error("download failed: {0}")]
    Download(String),

    /// Missing required settings or a malformed selector table.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

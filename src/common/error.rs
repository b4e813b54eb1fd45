//! Error types for minivol

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by drive operations and quorum reduction.
///
/// Per-drive errors are tallied by the quorum reducer, so every variant is
/// cheap to clone and comparable by [`Error::kind`]. Raw `std::io::Error`
/// values are classified into this taxonomy at the drive boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // === Drive errors ===
    #[error("drive offline")]
    DriveOffline,

    #[error("volume not found: {0}")]
    VolumeNotFound(String),

    #[error("volume already exists: {0}")]
    VolumeExists(String),

    #[error("volume not empty: {0}")]
    VolumeNotEmpty(String),

    #[error("drive corrupted: {0}")]
    Corrupt(String),

    // === Quorum errors ===
    #[error("quorum not met: {available} of {required} drives agreed")]
    QuorumNotMet { required: usize, available: usize },

    // === Validation Errors ===
    #[error("invalid bucket name: {0}")]
    InvalidBucketName(String),

    // === Config Errors ===
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("internal error: {0}")]
    Internal(String),
}

/// Payload-free classification of [`Error`], used for quorum tallies and
/// ignored-error sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DriveOffline,
    VolumeNotFound,
    VolumeExists,
    VolumeNotEmpty,
    Corrupt,
    QuorumNotMet,
    InvalidBucketName,
    InvalidConfig,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DriveOffline => ErrorKind::DriveOffline,
            Error::VolumeNotFound(_) => ErrorKind::VolumeNotFound,
            Error::VolumeExists(_) => ErrorKind::VolumeExists,
            Error::VolumeNotEmpty(_) => ErrorKind::VolumeNotEmpty,
            Error::Corrupt(_) => ErrorKind::Corrupt,
            Error::QuorumNotMet { .. } => ErrorKind::QuorumNotMet,
            Error::InvalidBucketName(_) => ErrorKind::InvalidBucketName,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Is this a retryable error?
    ///
    /// Quorum failures and offline drives can clear up on their own when a
    /// drive comes back or a heal runs; the rest are stable outcomes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::QuorumNotMet { .. } | Error::DriveOffline)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ignores_payload() {
        assert_eq!(
            Error::VolumeNotFound("a".into()).kind(),
            Error::VolumeNotFound("b".into()).kind()
        );
        assert_ne!(
            Error::VolumeNotFound("a".into()).kind(),
            Error::VolumeExists("a".into()).kind()
        );
    }

    #[test]
    fn test_retryable() {
        assert!(Error::DriveOffline.is_retryable());
        assert!(Error::QuorumNotMet {
            required: 2,
            available: 1
        }
        .is_retryable());
        assert!(!Error::VolumeNotFound("b".into()).is_retryable());
        assert!(!Error::VolumeNotEmpty("b".into()).is_retryable());
    }
}

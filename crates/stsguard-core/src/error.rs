//! Shared error type across stsguard crates.

use thiserror::Error;

/// Stable error codes (safe to log or expose to embedders).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Digest text could not be decoded.
    InvalidDigest,
    /// Host name is empty or not canonical.
    InvalidHost,
    /// Security header could not be parsed.
    MalformedHeader,
    /// Configuration rejected.
    BadConfig,
    /// Configuration file could not be read.
    ConfigRead,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidDigest => "INVALID_DIGEST",
            ErrorCode::InvalidHost => "INVALID_HOST",
            ErrorCode::MalformedHeader => "MALFORMED_HEADER",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::ConfigRead => "CONFIG_READ",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StsError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum StsError {
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
    #[error("invalid host: {0}")]
    InvalidHost(String),
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("read config {path} failed: {reason}")]
    ConfigRead { path: String, reason: String },
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl StsError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StsError::InvalidDigest(_) => ErrorCode::InvalidDigest,
            StsError::InvalidHost(_) => ErrorCode::InvalidHost,
            StsError::MalformedHeader(_) => ErrorCode::MalformedHeader,
            StsError::BadConfig(_) => ErrorCode::BadConfig,
            StsError::ConfigRead { .. } => ErrorCode::ConfigRead,
            StsError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            StsError::Internal(_) => ErrorCode::Internal,
        }
    }
}

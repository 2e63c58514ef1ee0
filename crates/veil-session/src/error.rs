//! Session error types.

use thiserror::Error;

use crate::Direction;

/// Broad category of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed or missing key material or parameters
    Configuration,
    /// Operation called in the wrong state or order
    Usage,
    /// Destination buffer too small
    Capacity,
    /// Buffer ceiling would be exceeded
    Limit,
    /// Tag missing or not matching
    Authentication,
    /// Unexpected primitive failure
    Internal,
}

/// Session errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Missing or unsupported key or nonce
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Unsupported tag length
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation on a session that was never initialized
    #[error("session not initialized")]
    NotInitialized,

    /// AAD supplied after payload in the same epoch
    #[error("payload already supplied; no more AAD data")]
    AadAfterPayload,

    /// Operation does not match the session direction
    #[error("operation requires {expected:?} session, but session is {actual:?}")]
    WrongDirection {
        /// Direction the operation needs
        expected: Direction,
        /// Direction the session was initialized for
        actual: Direction,
    },

    /// `restore` without a prior `save`
    #[error("no checkpoint saved")]
    NoCheckpoint,

    /// Non-final encrypt input not aligned to the block size
    #[error("input length {len} is not a multiple of block size {block_size}")]
    UnalignedInput {
        /// Input length
        len: usize,
        /// Block size of the primitive
        block_size: usize,
    },

    /// Buffered bytes would exceed the configured ceiling
    #[error("input size {requested} exceeds limit of {limit} bytes")]
    SizeLimitExceeded {
        /// Configured ceiling
        limit: usize,
        /// Size the operation would reach
        requested: usize,
    },

    /// Destination buffer too small
    #[error("output buffer too small: need {required}, have {available}")]
    ShortBuffer {
        /// Bytes the operation will write
        required: usize,
        /// Bytes available
        available: usize,
    },

    /// Decrypt input shorter than the tag
    #[error("input too short - need tag: {len} bytes, tag is {tag_len}")]
    TagTooShort {
        /// Total ciphertext bytes supplied
        len: usize,
        /// Configured tag length
        tag_len: usize,
    },

    /// Tag mismatch
    #[error("tag mismatch")]
    AuthenticationFailed,

    /// Primitive failed for a reason other than tag mismatch
    #[error("internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Category of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidKey(_) | Self::InvalidParameter(_) => ErrorClass::Configuration,
            Self::NotInitialized
            | Self::AadAfterPayload
            | Self::WrongDirection { .. }
            | Self::NoCheckpoint
            | Self::UnalignedInput { .. } => ErrorClass::Usage,
            Self::ShortBuffer { .. } => ErrorClass::Capacity,
            Self::SizeLimitExceeded { .. } => ErrorClass::Limit,
            Self::TagTooShort { .. } | Self::AuthenticationFailed => ErrorClass::Authentication,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Whether this is an authentication-class error.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        self.class() == ErrorClass::Authentication
    }

    /// Whether the same call can succeed once the caller supplies a larger
    /// destination. Only capacity errors qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Capacity
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or type error
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Value out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

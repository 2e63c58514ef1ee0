//! Cryptographic error types.

use thiserror::Error;

/// Errors raised by an AEAD primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key length not accepted by the primitive
    #[error("invalid key length: {actual} bytes")]
    InvalidKeyLength {
        /// Actual length
        actual: usize,
    },

    /// Nonce length not accepted by the primitive
    #[error("invalid nonce length: {actual} bytes")]
    InvalidNonceLength {
        /// Actual length
        actual: usize,
    },

    /// Tag length not accepted by the primitive
    #[error("invalid tag length: {actual} bytes")]
    InvalidTagLength {
        /// Actual length
        actual: usize,
    },

    /// AEAD decryption failed (tag mismatch)
    #[error("decryption failed: authentication failure")]
    AuthenticationFailed,

    /// AEAD encryption failed
    #[error("encryption failed")]
    EncryptionFailed,

    /// Unexpected failure inside the primitive
    #[error("internal primitive error: {0}")]
    Internal(String),
}

impl CryptoError {
    /// Whether this error rejects a key, nonce or tag length.
    #[must_use]
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKeyLength { .. }
                | Self::InvalidNonceLength { .. }
                | Self::InvalidTagLength { .. }
        )
    }
}

//! `ChaCha20-Poly1305` primitive.
//!
//! A 12-byte nonce selects the IETF construction (RFC 8439); a 24-byte nonce
//! selects `XChaCha20-Poly1305`. The tag is always 16 bytes. ChaCha20 is a
//! stream cipher, so buffered encrypt calls need no block alignment.

use chacha20poly1305::XChaCha20Poly1305;
use zeroize::Zeroizing;

use crate::primitive::{AeadPrimitive, open_with, seal_with};
use crate::{CHACHA_KEY_SIZE, CryptoError, POLY1305_TAG_SIZE};

/// IETF ChaCha20-Poly1305 nonce size
pub const CHACHA_NONCE_SIZE: usize = 12;

/// XChaCha20-Poly1305 nonce size
pub const XCHACHA_NONCE_SIZE: usize = 24;

/// ChaCha20-Poly1305 with nonce-length-selected variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChaCha20Poly1305;

impl ChaCha20Poly1305 {
    /// Create the primitive.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AeadPrimitive for ChaCha20Poly1305 {
    fn name(&self) -> &'static str {
        "ChaCha20-Poly1305"
    }

    fn mode(&self) -> &'static str {
        "Poly1305"
    }

    fn block_size(&self) -> usize {
        1
    }

    fn check_params(
        &self,
        key_len: usize,
        nonce_len: usize,
        tag_len: usize,
    ) -> Result<(), CryptoError> {
        if key_len != CHACHA_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength { actual: key_len });
        }
        if nonce_len != CHACHA_NONCE_SIZE && nonce_len != XCHACHA_NONCE_SIZE {
            return Err(CryptoError::InvalidNonceLength { actual: nonce_len });
        }
        if tag_len != POLY1305_TAG_SIZE {
            return Err(CryptoError::InvalidTagLength { actual: tag_len });
        }
        Ok(())
    }

    fn seal(
        &self,
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        aad: &[u8],
        tag_len: usize,
    ) -> Result<Vec<u8>, CryptoError> {
        self.check_params(key.len(), nonce.len(), tag_len)?;

        if nonce.len() == XCHACHA_NONCE_SIZE {
            seal_with::<XChaCha20Poly1305>(key, nonce, plaintext, aad)
        } else {
            seal_with::<chacha20poly1305::ChaCha20Poly1305>(key, nonce, plaintext, aad)
        }
    }

    fn open(
        &self,
        key: &[u8],
        nonce: &[u8],
        ciphertext_and_tag: &[u8],
        aad: &[u8],
        tag_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.check_params(key.len(), nonce.len(), tag_len)?;

        if nonce.len() == XCHACHA_NONCE_SIZE {
            open_with::<XChaCha20Poly1305>(key, nonce, ciphertext_and_tag, aad)
        } else {
            open_with::<chacha20poly1305::ChaCha20Poly1305>(key, nonce, ciphertext_and_tag, aad)
        }
    }
}

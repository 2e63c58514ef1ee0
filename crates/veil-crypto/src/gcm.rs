//! Software `AES-GCM` primitive.
//!
//! Backed by the RustCrypto `aes-gcm` crate. Key, nonce and tag sizes are
//! type-level parameters there, so the runtime lengths chosen at session
//! setup are dispatched onto the matching monomorphized cipher.
//!
//! ## Security Properties
//!
//! - Confidentiality: AES in counter mode
//! - Integrity: GHASH tag, verified in constant time before decryption
//! - Nonce misuse: catastrophic for GCM; never reuse a (key, nonce) pair
//!
//! Non-96-bit nonces are supported (16 bytes) and derive the initial counter
//! block through GHASH as described in NIST SP 800-38D.

use aes_gcm::AesGcm as GcmCipher;
use aes_gcm::aead::consts::{U12, U13, U14, U15, U16};
use aes_gcm::aes::{Aes128, Aes192, Aes256};
use zeroize::Zeroizing;

use crate::primitive::{AeadPrimitive, open_with, seal_with};
use crate::{AES_BLOCK_SIZE, AES_KEY_SIZES, CryptoError};

/// Nonce lengths accepted by [`AesGcm`].
pub const GCM_NONCE_SIZES: [usize; 2] = [12, 16];

/// Smallest tag length accepted by [`AesGcm`].
pub const GCM_MIN_TAG_LEN: usize = 12;

/// Largest tag length accepted by [`AesGcm`].
pub const GCM_MAX_TAG_LEN: usize = 16;

macro_rules! dispatch_tag {
    ($aes:ty, $nonce:ty, $tag_len:expr, $op:ident($($arg:expr),*)) => {
        match $tag_len {
            12 => $op::<GcmCipher<$aes, $nonce, U12>>($($arg),*),
            13 => $op::<GcmCipher<$aes, $nonce, U13>>($($arg),*),
            14 => $op::<GcmCipher<$aes, $nonce, U14>>($($arg),*),
            15 => $op::<GcmCipher<$aes, $nonce, U15>>($($arg),*),
            16 => $op::<GcmCipher<$aes, $nonce, U16>>($($arg),*),
            other => Err(CryptoError::InvalidTagLength { actual: other }),
        }
    };
}

macro_rules! dispatch_nonce {
    ($aes:ty, $nonce_len:expr, $tag_len:expr, $op:ident($($arg:expr),*)) => {
        match $nonce_len {
            12 => dispatch_tag!($aes, U12, $tag_len, $op($($arg),*)),
            16 => dispatch_tag!($aes, U16, $tag_len, $op($($arg),*)),
            other => Err(CryptoError::InvalidNonceLength { actual: other }),
        }
    };
}

macro_rules! dispatch {
    ($key_len:expr, $nonce_len:expr, $tag_len:expr, $op:ident($($arg:expr),*)) => {
        match $key_len {
            16 => dispatch_nonce!(Aes128, $nonce_len, $tag_len, $op($($arg),*)),
            24 => dispatch_nonce!(Aes192, $nonce_len, $tag_len, $op($($arg),*)),
            32 => dispatch_nonce!(Aes256, $nonce_len, $tag_len, $op($($arg),*)),
            other => Err(CryptoError::InvalidKeyLength { actual: other }),
        }
    };
}

/// Software AES-GCM.
///
/// Stateless; a single value may be shared by any number of sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AesGcm;

impl AesGcm {
    /// Create the primitive.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AeadPrimitive for AesGcm {
    fn name(&self) -> &'static str {
        "AES-GCM"
    }

    fn mode(&self) -> &'static str {
        "GCM"
    }

    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn check_params(
        &self,
        key_len: usize,
        nonce_len: usize,
        tag_len: usize,
    ) -> Result<(), CryptoError> {
        if !AES_KEY_SIZES.contains(&key_len) {
            return Err(CryptoError::InvalidKeyLength { actual: key_len });
        }
        if !GCM_NONCE_SIZES.contains(&nonce_len) {
            return Err(CryptoError::InvalidNonceLength { actual: nonce_len });
        }
        if !(GCM_MIN_TAG_LEN..=GCM_MAX_TAG_LEN).contains(&tag_len) {
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
        dispatch!(
            key.len(),
            nonce.len(),
            tag_len,
            seal_with(key, nonce, plaintext, aad)
        )
    }

    fn open(
        &self,
        key: &[u8],
        nonce: &[u8],
        ciphertext_and_tag: &[u8],
        aad: &[u8],
        tag_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        dispatch!(
            key.len(),
            nonce.len(),
            tag_len,
            open_with(key, nonce, ciphertext_and_tag, aad)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_gcm_roundtrip_all_key_sizes() {
        let gcm = AesGcm::new();
        let nonce = [0x24u8; 12];

        for key_len in AES_KEY_SIZES {
            let key = vec![0x42u8; key_len];
            let ct = gcm.seal(&key, &nonce, b"secret message", b"aad", 16).unwrap();
            assert_eq!(ct.len(), 14 + 16);

            let pt = gcm.open(&key, &nonce, &ct, b"aad", 16).unwrap();
            assert_eq!(pt.as_slice(), b"secret message");
        }
    }

    #[test]
    fn test_aes_gcm_truncated_tags() {
        let gcm = AesGcm::new();
        let key = [1u8; 32];
        let nonce = [2u8; 12];

        let full = gcm.seal(&key, &nonce, b"abc", b"", 16).unwrap();
        for tag_len in GCM_MIN_TAG_LEN..=GCM_MAX_TAG_LEN {
            let ct = gcm.seal(&key, &nonce, b"abc", b"", tag_len).unwrap();
            assert_eq!(ct.len(), 3 + tag_len);
            // A truncated tag is a prefix of the full tag
            assert_eq!(&ct[..], &full[..3 + tag_len]);

            let pt = gcm.open(&key, &nonce, &ct, b"", tag_len).unwrap();
            assert_eq!(pt.as_slice(), b"abc");
        }
    }

    #[test]
    fn test_aes_gcm_long_nonce() {
        let gcm = AesGcm::new();
        let key = [3u8; 16];
        let nonce = [4u8; 16];

        let ct = gcm.seal(&key, &nonce, b"sixteen byte iv", b"", 16).unwrap();
        let pt = gcm.open(&key, &nonce, &ct, b"", 16).unwrap();
        assert_eq!(pt.as_slice(), b"sixteen byte iv");
    }

    #[test]
    fn test_aes_gcm_tampered_tag() {
        let gcm = AesGcm::new();
        let key = [5u8; 16];
        let nonce = [6u8; 12];

        let mut ct = gcm.seal(&key, &nonce, b"data", b"aad", 16).unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;

        assert_eq!(
            gcm.open(&key, &nonce, &ct, b"aad", 16),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_aes_gcm_wrong_aad() {
        let gcm = AesGcm::new();
        let key = [5u8; 16];
        let nonce = [6u8; 12];

        let ct = gcm.seal(&key, &nonce, b"data", b"aad", 16).unwrap();
        assert!(gcm.open(&key, &nonce, &ct, b"aae", 16).is_err());
    }

    #[test]
    fn test_aes_gcm_input_shorter_than_tag() {
        let gcm = AesGcm::new();
        assert_eq!(
            gcm.open(&[0u8; 16], &[0u8; 12], &[0u8; 15], b"", 16),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_aes_gcm_rejects_bad_params() {
        let gcm = AesGcm::new();

        assert_eq!(
            gcm.check_params(20, 12, 16),
            Err(CryptoError::InvalidKeyLength { actual: 20 })
        );
        assert_eq!(
            gcm.check_params(16, 8, 16),
            Err(CryptoError::InvalidNonceLength { actual: 8 })
        );
        assert_eq!(
            gcm.check_params(16, 12, 11),
            Err(CryptoError::InvalidTagLength { actual: 11 })
        );
        assert!(gcm.check_params(24, 16, 12).is_ok());

        assert!(matches!(
            gcm.seal(&[0u8; 17], &[0u8; 12], b"", b"", 16),
            Err(CryptoError::InvalidKeyLength { actual: 17 })
        ));
        assert!(matches!(
            gcm.seal(&[0u8; 16], &[0u8; 12], b"", b"", 8),
            Err(CryptoError::InvalidTagLength { actual: 8 })
        ));
    }
}

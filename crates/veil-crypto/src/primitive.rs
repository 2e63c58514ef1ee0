//! The AEAD primitive contract.
//!
//! A primitive is a stateless `seal`/`open` pair. It receives the complete
//! payload and associated data on every call and keeps nothing between calls,
//! so a single instance can serve many sessions on many threads at once.
//!
//! ## Contract
//!
//! - `seal` is deterministic for identical inputs and returns `ciphertext || tag`.
//! - `open` verifies the tag in constant time before producing any plaintext.
//!   On mismatch it returns [`CryptoError::AuthenticationFailed`] and no bytes.
//! - Nonce uniqueness per key is the caller's responsibility.

use std::sync::Arc;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use zeroize::Zeroizing;

use crate::CryptoError;

/// Stateless authenticated cipher used by a session at finalization.
pub trait AeadPrimitive: Send + Sync {
    /// Algorithm name, e.g. `"AES-GCM"`.
    fn name(&self) -> &'static str;

    /// Mode of operation name, e.g. `"GCM"`.
    fn mode(&self) -> &'static str;

    /// Granularity that non-final encrypt calls must be aligned to.
    fn block_size(&self) -> usize;

    /// Check that the primitive accepts the given key, nonce and tag lengths.
    ///
    /// # Errors
    ///
    /// Returns the matching `CryptoError::Invalid*Length` variant for the
    /// first rejected parameter, checked in key, nonce, tag order.
    fn check_params(&self, key_len: usize, nonce_len: usize, tag_len: usize)
    -> Result<(), CryptoError>;

    /// Encrypt and authenticate `plaintext`, returning `ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for unsupported lengths and
    /// `CryptoError::EncryptionFailed` if the cipher refuses the input.
    fn seal(
        &self,
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        aad: &[u8],
        tag_len: usize,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Verify and decrypt `ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AuthenticationFailed` on tag mismatch or when the
    /// input is shorter than the tag.
    fn open(
        &self,
        key: &[u8],
        nonce: &[u8],
        ciphertext_and_tag: &[u8],
        aad: &[u8],
        tag_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

macro_rules! forward_primitive {
    ($($wrapper:ty),*) => {
        $(
            impl<P: AeadPrimitive + ?Sized> AeadPrimitive for $wrapper {
                fn name(&self) -> &'static str {
                    (**self).name()
                }

                fn mode(&self) -> &'static str {
                    (**self).mode()
                }

                fn block_size(&self) -> usize {
                    (**self).block_size()
                }

                fn check_params(
                    &self,
                    key_len: usize,
                    nonce_len: usize,
                    tag_len: usize,
                ) -> Result<(), CryptoError> {
                    (**self).check_params(key_len, nonce_len, tag_len)
                }

                fn seal(
                    &self,
                    key: &[u8],
                    nonce: &[u8],
                    plaintext: &[u8],
                    aad: &[u8],
                    tag_len: usize,
                ) -> Result<Vec<u8>, CryptoError> {
                    (**self).seal(key, nonce, plaintext, aad, tag_len)
                }

                fn open(
                    &self,
                    key: &[u8],
                    nonce: &[u8],
                    ciphertext_and_tag: &[u8],
                    aad: &[u8],
                    tag_len: usize,
                ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
                    (**self).open(key, nonce, ciphertext_and_tag, aad, tag_len)
                }
            }
        )*
    };
}

forward_primitive!(&P, Box<P>, Arc<P>);

/// Seal with a concrete RustCrypto cipher type.
pub(crate) fn seal_with<C>(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError>
where
    C: KeyInit + AeadInPlace,
{
    let cipher =
        C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;
    if nonce.len() != <C::NonceSize as Unsigned>::USIZE {
        return Err(CryptoError::InvalidNonceLength {
            actual: nonce.len(),
        });
    }

    let mut buffer = Vec::with_capacity(plaintext.len() + <C::TagSize as Unsigned>::USIZE);
    buffer.extend_from_slice(plaintext);

    cipher
        .encrypt_in_place(GenericArray::from_slice(nonce), aad, &mut buffer)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(buffer)
}

/// Open with a concrete RustCrypto cipher type.
///
/// The working buffer is zeroized on every exit path.
pub(crate) fn open_with<C>(
    key: &[u8],
    nonce: &[u8],
    ciphertext_and_tag: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError>
where
    C: KeyInit + AeadInPlace,
{
    let cipher =
        C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;
    if nonce.len() != <C::NonceSize as Unsigned>::USIZE {
        return Err(CryptoError::InvalidNonceLength {
            actual: nonce.len(),
        });
    }
    if ciphertext_and_tag.len() < <C::TagSize as Unsigned>::USIZE {
        return Err(CryptoError::AuthenticationFailed);
    }

    let mut buffer = Zeroizing::new(ciphertext_and_tag.to_vec());
    cipher
        .decrypt_in_place(GenericArray::from_slice(nonce), aad, &mut *buffer)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(buffer)
}

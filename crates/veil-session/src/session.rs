//! Streaming AEAD session.
//!
//! Buffers associated data and payload across calls and defers all
//! cryptographic work to the final call, which hands the complete buffers to
//! the session's [`AeadPrimitive`].
//!
//! ## Epochs
//!
//! An epoch runs from `init` (or `reset`, or a successful final call) to the
//! next of those. Within an epoch:
//!
//! 1. `update_aad` may be called any number of times,
//! 2. then `encrypt`/`decrypt` any number of times; the first such call seals
//!    the AAD buffer,
//! 3. then exactly one `encrypt_final`/`decrypt_final`.
//!
//! Non-final calls never produce output. Decryption output is released only
//! after the tag verifies, and only in full.
//!
//! ## Failure State
//!
//! Size ceiling and output capacity checks run before the primitive and leave
//! the session untouched, so the call can be retried. Authentication failures
//! (a missing tag or a mismatched one) and primitive errors consume the
//! buffers: the failed final call leaves both buffers empty with AAD still
//! sealed, and the caller must `reset`, `init` or `restore` before the session
//! is usable again.

use veil_crypto::{AeadPrimitive, CryptoError};
use zeroize::Zeroizing;

use crate::{
    ByteAccumulator, Checkpoint, ConfigError, Direction, PayloadBuffer, SessionConfig,
    SessionError,
};

/// Parameters and buffers bound by `init`.
struct SessionState {
    key: Zeroizing<Vec<u8>>,
    nonce: Vec<u8>,
    tag_len: usize,
    aad: ByteAccumulator,
    aad_sealed: bool,
    payload: PayloadBuffer,
}

impl SessionState {
    fn direction(&self) -> Direction {
        self.payload.direction()
    }

    fn expect_direction(&self, expected: Direction) -> Result<(), SessionError> {
        let actual = self.direction();
        if actual != expected {
            return Err(SessionError::WrongDirection { expected, actual });
        }
        Ok(())
    }

    fn start_epoch(&mut self) {
        self.aad.clear();
        self.aad_sealed = false;
        self.payload.bytes_mut().clear();
    }
}

/// Single-key, single-direction streaming AEAD session.
///
/// Holds its primitive by value; pass `&P` or `Arc<P>` to share one primitive
/// between sessions. Not internally synchronized.
pub struct AeadSession<P> {
    primitive: P,
    config: SessionConfig,
    state: Option<SessionState>,
    checkpoint: Option<Checkpoint>,
}

impl<P: AeadPrimitive> AeadSession<P> {
    /// Create an unconfigured session with default configuration.
    #[must_use]
    pub fn new(primitive: P) -> Self {
        Self {
            primitive,
            config: SessionConfig::default(),
            state: None,
            checkpoint: None,
        }
    }

    /// Create an unconfigured session with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `config` fails
    /// [`SessionConfig::validate`].
    pub fn with_config(primitive: P, config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            primitive,
            config,
            state: None,
            checkpoint: None,
        })
    }

    /// Bind key, nonce and tag length and start a new epoch.
    ///
    /// Calling `init` again discards the previous key and any buffered data.
    /// A saved checkpoint is kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidKey` if the key or nonce is empty or has a
    /// length the primitive rejects, and `SessionError::InvalidParameter` for
    /// an unsupported tag length.
    pub fn init(
        &mut self,
        direction: Direction,
        key: &[u8],
        nonce: &[u8],
        tag_len: usize,
    ) -> Result<(), SessionError> {
        if key.is_empty() {
            return Err(SessionError::InvalidKey("missing key".to_string()));
        }
        if nonce.is_empty() {
            return Err(SessionError::InvalidKey("missing nonce".to_string()));
        }

        self.primitive
            .check_params(key.len(), nonce.len(), tag_len)
            .map_err(|err| self.config_error(err))?;

        self.state = Some(SessionState {
            key: Zeroizing::new(key.to_vec()),
            nonce: nonce.to_vec(),
            tag_len,
            aad: ByteAccumulator::new(),
            aad_sealed: false,
            payload: PayloadBuffer::new(direction),
        });

        tracing::debug!(
            primitive = self.primitive.name(),
            ?direction,
            key_len = key.len(),
            nonce_len = nonce.len(),
            tag_len,
            "AEAD session initialized"
        );

        Ok(())
    }

    /// Append associated data.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AadAfterPayload` once any payload call has been
    /// made in the current epoch, and `SessionError::SizeLimitExceeded` if the
    /// AAD buffer would exceed the ceiling. The AAD buffer is unchanged on error.
    pub fn update_aad(&mut self, aad: &[u8]) -> Result<(), SessionError> {
        let limit = self.config.max_buffer_size;
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;

        if state.aad_sealed {
            return Err(SessionError::AadAfterPayload);
        }
        check_limit(state.aad.len(), aad.len(), limit)?;

        state.aad.append(aad);
        tracing::trace!(len = aad.len(), total = state.aad.len(), "buffered AAD");
        Ok(())
    }

    /// Buffer plaintext. Always returns `Ok(0)`: no output exists before
    /// `encrypt_final`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnalignedInput` if the length is not a multiple
    /// of the primitive's block size, `SessionError::SizeLimitExceeded` if the
    /// buffer would exceed the ceiling, and `SessionError::WrongDirection` on
    /// a decrypting session. Nothing is buffered on error.
    pub fn encrypt(&mut self, input: &[u8]) -> Result<usize, SessionError> {
        let block_size = self.primitive.block_size();
        if block_size > 1 && input.len() % block_size != 0 {
            return Err(SessionError::UnalignedInput {
                len: input.len(),
                block_size,
            });
        }

        self.buffer_payload(Direction::Encrypting, input)?;
        Ok(0)
    }

    /// Buffer a trailing partial block of plaintext without the alignment
    /// check. Returns the number of bytes buffered.
    ///
    /// # Errors
    ///
    /// Same as [`encrypt`](Self::encrypt), minus the alignment error.
    pub fn encrypt_tail(&mut self, input: &[u8]) -> Result<usize, SessionError> {
        self.buffer_payload(Direction::Encrypting, input)?;
        Ok(input.len())
    }

    /// Buffer ciphertext (and possibly part or all of the tag). Always returns
    /// `Ok(0)`: nothing is released before `decrypt_final`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SizeLimitExceeded` if the buffer would exceed the
    /// ceiling and `SessionError::WrongDirection` on an encrypting session.
    pub fn decrypt(&mut self, input: &[u8]) -> Result<usize, SessionError> {
        self.buffer_payload(Direction::Decrypting, input)?;
        Ok(0)
    }

    /// Seal everything buffered plus `input` into `out`.
    ///
    /// Writes `ciphertext || tag` to the front of `out` and returns its
    /// length, `plaintext_len + tag_len`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SizeLimitExceeded` if the plaintext or the sealed
    /// output would exceed the ceiling and `SessionError::ShortBuffer` if `out`
    /// is too small; both leave the session unchanged. Returns
    /// `SessionError::Internal` if the primitive fails.
    pub fn encrypt_final(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, SessionError> {
        let required = self.check_encrypt_final(input)?;
        if out.len() < required {
            return Err(SessionError::ShortBuffer {
                required,
                available: out.len(),
            });
        }

        let sealed = self.seal_buffered(input)?;
        out[..sealed.len()].copy_from_slice(&sealed);
        Ok(sealed.len())
    }

    /// Seal everything buffered plus `input`, appending the result to `out`.
    ///
    /// Returns the number of bytes appended. `out` is unchanged on error.
    ///
    /// # Errors
    ///
    /// Same as [`encrypt_final`](Self::encrypt_final), minus `ShortBuffer`.
    pub fn encrypt_final_to_vec(
        &mut self,
        input: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<usize, SessionError> {
        self.check_encrypt_final(input)?;

        let sealed = self.seal_buffered(input)?;
        out.extend_from_slice(&sealed);
        Ok(sealed.len())
    }

    /// Seal everything buffered plus `input` into a new vector.
    ///
    /// # Errors
    ///
    /// Same as [`encrypt_final_to_vec`](Self::encrypt_final_to_vec).
    pub fn encrypt_final_vec(&mut self, input: &[u8]) -> Result<Vec<u8>, SessionError> {
        let mut out = Vec::new();
        self.encrypt_final_to_vec(input, &mut out)?;
        Ok(out)
    }

    /// Verify and decrypt everything buffered plus `input` into `out`.
    ///
    /// The input's last `tag_len` bytes are the tag. On success the full
    /// plaintext is written to the front of `out` and its length returned. On
    /// any error `out` is not written.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SizeLimitExceeded` past the ceiling and
    /// `SessionError::ShortBuffer` if `out` cannot hold the plaintext; these
    /// leave the session unchanged. Returns `SessionError::TagTooShort` if
    /// fewer than `tag_len` bytes were supplied,
    /// `SessionError::AuthenticationFailed` on tag mismatch and
    /// `SessionError::Internal` on any other primitive failure; these consume
    /// the buffered input.
    pub fn decrypt_final(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, SessionError> {
        let required = self.check_decrypt_final(input)?;
        if out.len() < required {
            return Err(SessionError::ShortBuffer {
                required,
                available: out.len(),
            });
        }

        let plaintext = self.open_buffered(input)?;
        if plaintext.len() > out.len() {
            return Err(SessionError::Internal(format!(
                "primitive returned {} bytes, expected {required}",
                plaintext.len()
            )));
        }
        out[..plaintext.len()].copy_from_slice(&plaintext);
        Ok(plaintext.len())
    }

    /// Verify and decrypt everything buffered plus `input`, appending the
    /// plaintext to `out`.
    ///
    /// Returns the number of bytes appended. `out` is unchanged on error.
    ///
    /// # Errors
    ///
    /// Same as [`decrypt_final`](Self::decrypt_final), minus `ShortBuffer`.
    pub fn decrypt_final_to_vec(
        &mut self,
        input: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<usize, SessionError> {
        self.check_decrypt_final(input)?;

        let plaintext = self.open_buffered(input)?;
        out.extend_from_slice(&plaintext);
        Ok(plaintext.len())
    }

    /// Verify and decrypt everything buffered plus `input` into a new vector.
    ///
    /// # Errors
    ///
    /// Same as [`decrypt_final_to_vec`](Self::decrypt_final_to_vec).
    pub fn decrypt_final_vec(&mut self, input: &[u8]) -> Result<Vec<u8>, SessionError> {
        let mut out = Vec::new();
        self.decrypt_final_to_vec(input, &mut out)?;
        Ok(out)
    }

    /// Snapshot both buffers into the checkpoint slot, replacing any previous
    /// checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInitialized` before `init`.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let state = self.state.as_ref().ok_or(SessionError::NotInitialized)?;

        self.checkpoint = Some(Checkpoint::capture(
            &state.aad,
            &state.payload,
            state.aad_sealed,
        ));
        tracing::trace!(
            aad_len = state.aad.len(),
            payload_len = state.payload.len(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Roll both buffers back to the checkpoint. The checkpoint is kept, so
    /// `restore` can be repeated.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInitialized` before `init`,
    /// `SessionError::NoCheckpoint` if `save` was never called, and
    /// `SessionError::WrongDirection` if the checkpoint was saved by a session
    /// running the other direction. The buffers are unchanged on error.
    pub fn restore(&mut self) -> Result<(), SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;
        let checkpoint = self.checkpoint.as_ref().ok_or(SessionError::NoCheckpoint)?;

        // Plaintext saved while encrypting must never become ciphertext input
        if checkpoint.direction() != state.direction() {
            return Err(SessionError::WrongDirection {
                expected: checkpoint.direction(),
                actual: state.direction(),
            });
        }

        state.aad_sealed = checkpoint.apply(&mut state.aad, &mut state.payload);
        tracing::trace!(
            aad_len = state.aad.len(),
            payload_len = state.payload.len(),
            "checkpoint restored"
        );
        Ok(())
    }

    /// Clear both buffers and start a new epoch. Key, nonce, tag length,
    /// direction and the checkpoint are kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInitialized` before `init`.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;
        state.start_epoch();
        tracing::trace!("session reset");
        Ok(())
    }

    /// Drop the saved checkpoint, if any.
    pub fn clear_checkpoint(&mut self) {
        self.checkpoint = None;
    }

    /// Whether a checkpoint is saved.
    #[must_use]
    pub fn has_checkpoint(&self) -> bool {
        self.checkpoint.is_some()
    }

    /// Bytes pending finalization; 0 before `init`.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.payload.len())
    }

    /// AAD bytes buffered in the current epoch; 0 before `init`.
    #[must_use]
    pub fn aad_len(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.aad.len())
    }

    /// Configured tag length, or the configured default before `init`.
    #[must_use]
    pub fn tag_len(&self) -> usize {
        self.state
            .as_ref()
            .map_or(self.config.default_tag_len, |state| state.tag_len)
    }

    /// Nonce length bound by `init`.
    #[must_use]
    pub fn nonce_len(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.nonce.len())
    }

    /// Direction bound by `init`.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.state.as_ref().map(SessionState::direction)
    }

    /// Whether `init` has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Mode name reported by the primitive, e.g. `"GCM"`.
    #[must_use]
    pub fn mode(&self) -> &'static str {
        self.primitive.mode()
    }

    /// The session's primitive.
    #[must_use]
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// The session's configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn config_error(&self, err: CryptoError) -> SessionError {
        let name = self.primitive.name();
        match err {
            CryptoError::InvalidKeyLength { actual } => {
                SessionError::InvalidKey(format!("invalid {name} key length: {actual} bytes"))
            }
            CryptoError::InvalidNonceLength { actual } => {
                SessionError::InvalidKey(format!("invalid {name} nonce length: {actual} bytes"))
            }
            CryptoError::InvalidTagLength { actual } => SessionError::InvalidParameter(format!(
                "unsupported {name} tag length: {actual} bytes"
            )),
            other => SessionError::Internal(other.to_string()),
        }
    }

    fn buffer_payload(&mut self, expected: Direction, input: &[u8]) -> Result<(), SessionError> {
        let limit = self.config.max_buffer_size;
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;

        state.expect_direction(expected)?;
        check_limit(state.payload.len(), input.len(), limit)?;

        state.aad_sealed = true;
        state.payload.bytes_mut().append(input);
        tracing::trace!(
            len = input.len(),
            total = state.payload.len(),
            "buffered payload"
        );
        Ok(())
    }

    /// Validate an encrypt final call; returns the sealed output length.
    fn check_encrypt_final(&self, input: &[u8]) -> Result<usize, SessionError> {
        let limit = self.config.max_buffer_size;
        let state = self.state.as_ref().ok_or(SessionError::NotInitialized)?;

        state.expect_direction(Direction::Encrypting)?;
        let total = check_limit(state.payload.len(), input.len(), limit)?;
        check_limit(total, state.tag_len, limit)
    }

    /// Validate a decrypt final call; returns the plaintext length.
    ///
    /// A missing tag consumes the buffered input exactly as a tag mismatch
    /// does, so the two authentication failures leave the same state behind.
    fn check_decrypt_final(&mut self, input: &[u8]) -> Result<usize, SessionError> {
        let limit = self.config.max_buffer_size;
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;

        state.expect_direction(Direction::Decrypting)?;
        let total = state.payload.len().saturating_add(input.len());
        if total < state.tag_len {
            state.payload.bytes_mut().clear();
            state.aad.clear();
            state.aad_sealed = true;
            tracing::debug!(len = total, "AEAD open rejected: input shorter than tag");
            return Err(SessionError::TagTooShort {
                len: total,
                tag_len: state.tag_len,
            });
        }
        check_limit(state.payload.len(), input.len(), limit)?;
        Ok(total - state.tag_len)
    }

    fn seal_buffered(&mut self, input: &[u8]) -> Result<Vec<u8>, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;

        state.payload.bytes_mut().append(input);
        let plaintext = state.payload.bytes_mut().take();
        let aad = state.aad.take();
        state.aad_sealed = true;

        match self
            .primitive
            .seal(&state.key, &state.nonce, &plaintext, &aad, state.tag_len)
        {
            Ok(sealed) => {
                state.start_epoch();
                tracing::debug!(
                    plaintext_len = plaintext.len(),
                    aad_len = aad.len(),
                    sealed_len = sealed.len(),
                    "AEAD seal complete"
                );
                Ok(sealed)
            }
            Err(err) => {
                tracing::warn!("AEAD seal failed: {}", err);
                Err(SessionError::Internal(err.to_string()))
            }
        }
    }

    fn open_buffered(&mut self, input: &[u8]) -> Result<Zeroizing<Vec<u8>>, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;

        state.payload.bytes_mut().append(input);
        let ciphertext = state.payload.bytes_mut().take();
        let aad = state.aad.take();
        state.aad_sealed = true;

        match self
            .primitive
            .open(&state.key, &state.nonce, &ciphertext, &aad, state.tag_len)
        {
            Ok(plaintext) => {
                state.start_epoch();
                tracing::debug!(
                    ciphertext_len = ciphertext.len(),
                    aad_len = aad.len(),
                    plaintext_len = plaintext.len(),
                    "AEAD open complete"
                );
                Ok(plaintext)
            }
            Err(CryptoError::AuthenticationFailed) => {
                tracing::debug!(
                    ciphertext_len = ciphertext.len(),
                    "AEAD open rejected: tag mismatch"
                );
                Err(SessionError::AuthenticationFailed)
            }
            Err(err) => {
                tracing::warn!("AEAD open failed: {}", err);
                Err(SessionError::Internal(err.to_string()))
            }
        }
    }
}

/// Returns `current + additional`, or `SizeLimitExceeded` past `limit`.
fn check_limit(current: usize, additional: usize, limit: usize) -> Result<usize, SessionError> {
    match current.checked_add(additional) {
        Some(total) if total <= limit => Ok(total),
        Some(total) => Err(SessionError::SizeLimitExceeded {
            limit,
            requested: total,
        }),
        None => Err(SessionError::SizeLimitExceeded {
            limit,
            requested: usize::MAX,
        }),
    }
}

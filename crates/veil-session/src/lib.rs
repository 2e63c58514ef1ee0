//! # VEIL Session
//!
//! Streaming AEAD sessions with deferred, verified-only release.
//!
//! A session accumulates associated data and payload across any number of
//! calls. Nothing recoverable is produced until the single final call, which
//! hands the complete buffers to an [`AeadPrimitive`]. On the decrypt path the
//! recovered plaintext is released all at once after the tag verifies, or not
//! at all.
//!
//! This crate provides:
//! - [`AeadSession`]: init / AAD / buffered payload / final protocol
//! - [`ByteAccumulator`] and [`PayloadBuffer`]: zeroizing, direction-tagged buffers
//! - [`Checkpoint`]: single-slot save/restore of buffered input
//! - [`SessionConfig`]: buffer ceiling and advisory defaults, loadable from TOML
//!
//! ## Usage
//!
//! ```ignore
//! use veil_crypto::AesGcm;
//! use veil_session::{AeadSession, Direction};
//!
//! let mut sender = AeadSession::new(AesGcm::new());
//! sender.init(Direction::Encrypting, &key, &nonce, 16)?;
//! sender.update_aad(b"header")?;
//! sender.encrypt(&first_blocks)?;
//! let sealed = sender.encrypt_final_vec(b"tail")?;
//!
//! let mut receiver = AeadSession::new(AesGcm::new());
//! receiver.init(Direction::Decrypting, &key, &nonce, 16)?;
//! receiver.update_aad(b"header")?;
//! let plaintext = receiver.decrypt_final_vec(&sealed)?;
//! ```
//!
//! ## Threading
//!
//! A session has no internal locking; callers serialize access to it. Sessions
//! share nothing, and one primitive can be shared across threads through `Arc`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod session;

pub use buffer::{ByteAccumulator, Direction, PayloadBuffer};
pub use checkpoint::Checkpoint;
pub use config::SessionConfig;
pub use error::{ConfigError, ErrorClass, SessionError};
pub use session::AeadSession;
pub use veil_crypto::AeadPrimitive;

/// Default ceiling on buffered bytes per epoch (`i32::MAX`).
///
/// GCM itself allows close to 2^36 bytes, but all recovered data is released
/// by one call into one contiguous buffer.
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Default tag length in bytes
pub const DEFAULT_TAG_LEN: usize = veil_crypto::DEFAULT_TAG_LEN;

/// Default nonce length in bytes
pub const DEFAULT_NONCE_LEN: usize = veil_crypto::DEFAULT_NONCE_LEN;

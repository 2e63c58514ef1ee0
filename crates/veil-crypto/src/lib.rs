//! # VEIL Crypto
//!
//! AEAD primitives for the VEIL session layer.
//!
//! This crate provides:
//! - The [`AeadPrimitive`] trait: a stateless `seal`/`open` pair over complete inputs
//! - Software `AES-GCM` (128/192/256-bit keys, truncatable tags)
//! - `ChaCha20-Poly1305` and `XChaCha20-Poly1305`
//!
//! Primitives never see partial input. A session accumulates associated data and
//! payload and hands the primitive everything at once, so verification is a single
//! constant-time tag check before any plaintext exists outside the primitive.
//!
//! ## Supported Parameters
//!
//! | Primitive | Key (bytes) | Nonce (bytes) | Tag (bytes) | Block |
//! |-----------|-------------|---------------|-------------|-------|
//! | AES-GCM | 16, 24, 32 | 12, 16 | 12..=16 | 16 |
//! | ChaCha20-Poly1305 | 32 | 12, 24 | 16 | 1 |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod chacha;
pub mod error;
pub mod gcm;
pub mod primitive;

pub use chacha::ChaCha20Poly1305;
pub use error::CryptoError;
pub use gcm::AesGcm;
pub use primitive::AeadPrimitive;

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// Key sizes accepted by AES (128, 192 and 256 bits)
pub const AES_KEY_SIZES: [usize; 3] = [16, 24, 32];

/// Default GCM tag length (one AES block)
pub const DEFAULT_TAG_LEN: usize = AES_BLOCK_SIZE;

/// Default GCM nonce length (96 bits)
pub const DEFAULT_NONCE_LEN: usize = 12;

/// ChaCha20-Poly1305 key size
pub const CHACHA_KEY_SIZE: usize = 32;

/// Poly1305 tag size
pub const POLY1305_TAG_SIZE: usize = 16;

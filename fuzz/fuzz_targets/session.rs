//! Fuzz target for streaming AEAD sessions
//!
//! Drives a session with an arbitrary sequence of operations and checks that
//! it never panics, never exceeds its ceiling, and that a decrypting session
//! either releases the exact plaintext or nothing at all.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use veil_crypto::AesGcm;
use veil_session::{AeadSession, Direction, SessionConfig, SessionError};

const MAX_BUFFER: usize = 4096;

#[derive(Debug, Arbitrary)]
enum Op {
    Aad(Vec<u8>),
    Encrypt(Vec<u8>),
    EncryptTail(Vec<u8>),
    Decrypt(Vec<u8>),
    EncryptFinal(Vec<u8>, u16),
    DecryptFinal(Vec<u8>, u16),
    Save,
    Restore,
    Reset,
}

#[derive(Debug, Arbitrary)]
struct SessionInput {
    key: [u8; 32],
    key_len: u8,
    nonce: [u8; 16],
    long_nonce: bool,
    tag_len: u8,
    decrypting: bool,
    ops: Vec<Op>,
    plaintext: Vec<u8>,
    flip: Option<u16>,
}

fuzz_target!(|input: SessionInput| {
    let key = &input.key[..usize::from(input.key_len % 33)];
    let nonce = if input.long_nonce {
        &input.nonce[..]
    } else {
        &input.nonce[..12]
    };
    let tag_len = usize::from(input.tag_len % 18);
    let direction = if input.decrypting {
        Direction::Decrypting
    } else {
        Direction::Encrypting
    };

    let config = SessionConfig::default().with_max_buffer_size(MAX_BUFFER);
    let Ok(mut session) = AeadSession::with_config(AesGcm::new(), config) else {
        return;
    };
    if session.init(direction, key, nonce, tag_len).is_err() {
        return;
    }

    for op in &input.ops {
        let _ = match op {
            Op::Aad(data) => session.update_aad(data),
            Op::Encrypt(data) => session.encrypt(data).map(drop),
            Op::EncryptTail(data) => session.encrypt_tail(data).map(drop),
            Op::Decrypt(data) => session.decrypt(data).map(drop),
            Op::EncryptFinal(data, cap) => {
                let mut out = vec![0u8; usize::from(*cap)];
                session.encrypt_final(data, &mut out).map(drop)
            }
            Op::DecryptFinal(data, cap) => {
                let mut out = vec![0xA5u8; usize::from(*cap)];
                let result = session.decrypt_final(data, &mut out);
                if result.is_err() {
                    assert!(out.iter().all(|&b| b == 0xA5));
                }
                result.map(drop)
            }
            Op::Save => session.save(),
            Op::Restore => session.restore(),
            Op::Reset => session.reset(),
        };
        assert!(session.buffered_len() <= MAX_BUFFER);
        assert!(session.aad_len() <= MAX_BUFFER);
    }

    // Roundtrip with an optional single-bit forgery
    let mut enc = AeadSession::new(AesGcm::new());
    if enc.init(Direction::Encrypting, key, nonce, tag_len).is_err() {
        return;
    }
    let Ok(mut sealed) = enc.encrypt_final_vec(&input.plaintext) else {
        return;
    };

    let forged = match input.flip {
        Some(bit) if !sealed.is_empty() => {
            let bit = usize::from(bit) % (sealed.len() * 8);
            sealed[bit / 8] ^= 1 << (bit % 8);
            true
        }
        _ => false,
    };

    let mut dec = AeadSession::new(AesGcm::new());
    if dec.init(Direction::Decrypting, key, nonce, tag_len).is_err() {
        return;
    }
    match dec.decrypt_final_vec(&sealed) {
        Ok(plaintext) => {
            assert!(!forged);
            assert_eq!(plaintext, input.plaintext);
        }
        Err(err) => {
            assert!(forged);
            assert_eq!(err, SessionError::AuthenticationFailed);
        }
    }
});

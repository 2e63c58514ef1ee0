//! Property-based tests for VEIL sessions
//!
//! Uses proptest to verify session invariants across large input spaces.

use proptest::prelude::*;
use veil_crypto::{AeadPrimitive, AesGcm};
use veil_integration_tests::session;
use veil_session::{AeadSession, Direction, SessionConfig, SessionError};

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 16),
        prop::collection::vec(any::<u8>(), 24),
        prop::collection::vec(any::<u8>(), 32),
    ]
}

fn nonce_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 12),
        prop::collection::vec(any::<u8>(), 16),
    ]
}

/// Sorted, deduplicated cut offsets into `data`, always including both ends.
fn split_points(data: &[u8], cuts: &[usize]) -> Vec<usize> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (data.len() + 1)).collect();
    points.push(0);
    points.push(data.len());
    points.sort_unstable();
    points.dedup();
    points
}

// ============================================================================
// Roundtrip Properties
// ============================================================================

mod roundtrip_properties {
    use super::*;

    proptest! {
        /// Decrypting a streamed encryption recovers the plaintext for any
        /// valid parameters and any chunking.
        #[test]
        fn streamed_roundtrip(
            key in key_strategy(),
            nonce in nonce_strategy(),
            tag_len in 12usize..=16,
            aad in prop::collection::vec(any::<u8>(), 0..64),
            blocks in 0usize..8,
            tail in prop::collection::vec(any::<u8>(), 0..16),
            cuts in prop::collection::vec(any::<usize>(), 0..6),
        ) {
            let body: Vec<u8> = (0..blocks * 16).map(|i| (i * 31) as u8).collect();

            let mut enc = session(AesGcm::new(), Direction::Encrypting, &key, &nonce, tag_len).unwrap();
            enc.update_aad(&aad).unwrap();
            for block in body.chunks(16) {
                enc.encrypt(block).unwrap();
            }
            let sealed = enc.encrypt_final_vec(&tail).unwrap();
            prop_assert_eq!(sealed.len(), body.len() + tail.len() + tag_len);

            let mut dec = session(AesGcm::new(), Direction::Decrypting, &key, &nonce, tag_len).unwrap();
            dec.update_aad(&aad).unwrap();
            let points = split_points(&sealed, &cuts);
            let (last, rest) = points.split_last().unwrap();
            let final_start = rest.last().copied().unwrap_or(*last);
            for window in rest.windows(2) {
                dec.decrypt(&sealed[window[0]..window[1]]).unwrap();
            }
            let recovered = dec.decrypt_final_vec(&sealed[final_start..]).unwrap();

            let mut expected = body.clone();
            expected.extend_from_slice(&tail);
            prop_assert_eq!(recovered, expected);
        }

        /// Session output equals the primitive's one-shot seal.
        #[test]
        fn session_matches_primitive(
            key in key_strategy(),
            nonce in nonce_strategy(),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
            aad in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            let mut enc = session(AesGcm::new(), Direction::Encrypting, &key, &nonce, 16).unwrap();
            enc.update_aad(&aad).unwrap();
            let sealed = enc.encrypt_final_vec(&plaintext).unwrap();

            let expected = AesGcm::new().seal(&key, &nonce, &plaintext, &aad, 16).unwrap();
            prop_assert_eq!(sealed, expected);
        }
    }
}

// ============================================================================
// Authentication Properties
// ============================================================================

mod authentication_properties {
    use super::*;

    proptest! {
        /// Any single bit flip is rejected and releases nothing.
        #[test]
        fn bit_flip_rejected(
            key in key_strategy(),
            plaintext in prop::collection::vec(any::<u8>(), 0..128),
            flip_byte in any::<usize>(),
            flip_bit in 0u8..8,
        ) {
            let nonce = [0x11u8; 12];
            let mut enc = session(AesGcm::new(), Direction::Encrypting, &key, &nonce, 16).unwrap();
            let mut sealed = enc.encrypt_final_vec(&plaintext).unwrap();

            let idx = flip_byte % sealed.len();
            sealed[idx] ^= 1 << flip_bit;

            let mut dec = session(AesGcm::new(), Direction::Decrypting, &key, &nonce, 16).unwrap();
            let mut out = vec![0xA5u8; plaintext.len()];
            let result = dec.decrypt_final(&sealed, &mut out);

            prop_assert_eq!(result, Err(SessionError::AuthenticationFailed));
            prop_assert!(out.iter().all(|&b| b == 0xA5));
            prop_assert_eq!(dec.buffered_len(), 0);
        }

        /// Mismatched AAD is rejected.
        #[test]
        fn wrong_aad_rejected(
            aad in prop::collection::vec(any::<u8>(), 1..32),
            plaintext in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let key = [0x22u8; 16];
            let nonce = [0x33u8; 12];
            let mut enc = session(AesGcm::new(), Direction::Encrypting, &key, &nonce, 16).unwrap();
            enc.update_aad(&aad).unwrap();
            let sealed = enc.encrypt_final_vec(&plaintext).unwrap();

            let mut dec = session(AesGcm::new(), Direction::Decrypting, &key, &nonce, 16).unwrap();
            dec.update_aad(&aad[1..]).unwrap();
            prop_assert_eq!(
                dec.decrypt_final_vec(&sealed),
                Err(SessionError::AuthenticationFailed)
            );
        }

        /// Inputs shorter than the tag fail before any cryptography runs.
        #[test]
        fn short_input_is_tag_too_short(
            tag_len in 12usize..=16,
            input in prop::collection::vec(any::<u8>(), 0..12),
        ) {
            let mut dec = session(AesGcm::new(), Direction::Decrypting, &[0u8; 16], &[0u8; 12], tag_len).unwrap();
            let result = dec.decrypt_final_vec(&input);
            prop_assert_eq!(
                result,
                Err(SessionError::TagTooShort { len: input.len(), tag_len })
            );
        }
    }
}

// ============================================================================
// Ordering and Checkpoint Properties
// ============================================================================

mod state_properties {
    use super::*;

    proptest! {
        /// After any payload call, AAD is refused until the epoch ends.
        #[test]
        fn aad_refused_after_payload(
            first_aad in prop::collection::vec(any::<u8>(), 0..16),
            payload_blocks in 0usize..4,
            late_aad in prop::collection::vec(any::<u8>(), 0..16),
        ) {
            let mut enc = session(AesGcm::new(), Direction::Encrypting, &[0u8; 16], &[0u8; 12], 16).unwrap();
            enc.update_aad(&first_aad).unwrap();
            enc.encrypt(&vec![0u8; payload_blocks * 16]).unwrap();

            prop_assert_eq!(enc.update_aad(&late_aad), Err(SessionError::AadAfterPayload));
            prop_assert_eq!(enc.aad_len(), first_aad.len());

            enc.encrypt_final_vec(&[]).unwrap();
            prop_assert!(enc.update_aad(&late_aad).is_ok());
        }

        /// Restoring a checkpoint makes any intervening input irrelevant.
        #[test]
        fn restore_is_transparent(
            prefix_blocks in 0usize..4,
            noise_blocks in 0usize..4,
            tail in prop::collection::vec(any::<u8>(), 0..20),
        ) {
            let key = [0x44u8; 32];
            let nonce = [0x55u8; 12];
            let prefix = vec![0x01u8; prefix_blocks * 16];

            let mut enc = session(AesGcm::new(), Direction::Encrypting, &key, &nonce, 16).unwrap();
            enc.update_aad(b"checkpoint").unwrap();
            enc.encrypt(&prefix).unwrap();
            enc.save().unwrap();
            enc.encrypt(&vec![0xFFu8; noise_blocks * 16]).unwrap();
            enc.restore().unwrap();
            let restored = enc.encrypt_final_vec(&tail).unwrap();

            let mut direct = session(AesGcm::new(), Direction::Encrypting, &key, &nonce, 16).unwrap();
            direct.update_aad(b"checkpoint").unwrap();
            direct.encrypt(&prefix).unwrap();
            prop_assert_eq!(restored, direct.encrypt_final_vec(&tail).unwrap());
        }

        /// Buffered length never exceeds the configured ceiling.
        #[test]
        fn ceiling_is_enforced(
            max in 16usize..256,
            chunks in prop::collection::vec(0usize..64, 1..12),
        ) {
            let config = SessionConfig::default().with_max_buffer_size(max);
            let mut dec = AeadSession::with_config(AesGcm::new(), config).unwrap();
            dec.init(Direction::Decrypting, &[0u8; 16], &[0u8; 12], 16).unwrap();

            for len in chunks {
                let before = dec.buffered_len();
                match dec.decrypt(&vec![0u8; len]) {
                    Ok(_) => prop_assert!(before + len <= max),
                    Err(SessionError::SizeLimitExceeded { limit, requested }) => {
                        prop_assert_eq!(limit, max);
                        prop_assert_eq!(requested, before + len);
                        prop_assert_eq!(dec.buffered_len(), before);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {}", other),
                }
                prop_assert!(dec.buffered_len() <= max);
            }
        }

        /// Truncated tags are prefixes of the full tag.
        #[test]
        fn truncated_tag_is_prefix(
            tag_len in 12usize..16,
            plaintext in prop::collection::vec(any::<u8>(), 0..48),
        ) {
            let key = [0x66u8; 16];
            let nonce = [0x77u8; 12];
            let full = AesGcm::new().seal(&key, &nonce, &plaintext, b"", 16).unwrap();

            let mut enc = session(AesGcm::new(), Direction::Encrypting, &key, &nonce, tag_len).unwrap();
            let truncated = enc.encrypt_final_vec(&plaintext).unwrap();
            prop_assert_eq!(&truncated[..], &full[..plaintext.len() + tag_len]);
        }
    }
}

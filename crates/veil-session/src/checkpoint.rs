//! Single-slot snapshots of buffered session input.
//!
//! A checkpoint copies the AAD buffer, the payload buffer, the direction the
//! payload was buffered for and whether AAD was already sealed. Key, nonce and
//! tag length are never part of it.

use zeroize::Zeroizing;

use crate::{ByteAccumulator, Direction, PayloadBuffer};

/// Immutable copy of a session's buffers.
pub struct Checkpoint {
    direction: Direction,
    aad: Zeroizing<Vec<u8>>,
    payload: Zeroizing<Vec<u8>>,
    aad_sealed: bool,
}

impl Checkpoint {
    /// Capture the given buffers.
    #[must_use]
    pub fn capture(aad: &ByteAccumulator, payload: &PayloadBuffer, aad_sealed: bool) -> Self {
        Self {
            direction: payload.direction(),
            aad: aad.snapshot(),
            payload: payload.bytes().snapshot(),
            aad_sealed,
        }
    }

    /// Direction the payload was buffered for.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Saved associated data.
    #[must_use]
    pub fn aad(&self) -> &[u8] {
        &self.aad
    }

    /// Saved payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether payload had started when the checkpoint was taken.
    #[must_use]
    pub fn aad_sealed(&self) -> bool {
        self.aad_sealed
    }

    /// Write the saved contents back into the given buffers.
    ///
    /// Returns the saved sealed flag. The checkpoint itself is unchanged and
    /// can be applied again. Callers check [`direction`](Self::direction)
    /// against the payload buffer first.
    pub fn apply(&self, aad: &mut ByteAccumulator, payload: &mut PayloadBuffer) -> bool {
        aad.replace_with(&self.aad);
        payload.bytes_mut().replace_with(&self.payload);
        self.aad_sealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_apply() {
        let mut aad = ByteAccumulator::new();
        let mut payload = PayloadBuffer::new(Direction::Encrypting);
        aad.append(b"header");
        payload.bytes_mut().append(&[1u8; 16]);

        let cp = Checkpoint::capture(&aad, &payload, true);
        payload.bytes_mut().append(&[2u8; 16]);
        aad.clear();

        assert!(cp.apply(&mut aad, &mut payload));
        assert_eq!(aad.as_slice(), b"header");
        assert_eq!(payload.bytes().as_slice(), &[1u8; 16]);
        assert_eq!(cp.direction(), Direction::Encrypting);
    }

    #[test]
    fn test_apply_is_repeatable() {
        let mut aad = ByteAccumulator::new();
        let mut payload = PayloadBuffer::new(Direction::Decrypting);
        payload.bytes_mut().append(b"base");

        let cp = Checkpoint::capture(&aad, &payload, false);

        for _ in 0..3 {
            payload.bytes_mut().append(b"extra");
            aad.append(b"more");
            assert!(!cp.apply(&mut aad, &mut payload));
            assert_eq!(payload.bytes().as_slice(), b"base");
            assert!(aad.is_empty());
        }
        assert_eq!(cp.payload(), b"base");
        assert_eq!(cp.aad(), b"");
        assert_eq!(cp.direction(), Direction::Decrypting);
    }
}

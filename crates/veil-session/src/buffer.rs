//! Byte accumulators for associated data and payload.
//!
//! Both buffers may hold sensitive bytes (plaintext on the encrypt path), so
//! every clear and every drop zeroizes the contents first.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Direction a session was initialized for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Buffers plaintext, finalizes with seal
    Encrypting,
    /// Buffers ciphertext and tag, finalizes with open
    Decrypting,
}

/// Owned, append-only byte sequence.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct ByteAccumulator {
    bytes: Vec<u8>,
}

impl ByteAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Buffered bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy `data` onto the end of the buffer.
    pub fn append(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        if self.bytes.capacity() - self.bytes.len() < data.len() {
            self.grow(data.len());
        }
        self.bytes.extend_from_slice(data);
    }

    /// Immutable copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.bytes.clone())
    }

    /// Replace the contents with `data`.
    pub fn replace_with(&mut self, data: &[u8]) {
        self.clear();
        self.append(data);
    }

    /// Move the contents out, leaving the accumulator empty.
    #[must_use]
    pub fn take(&mut self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(std::mem::take(&mut self.bytes))
    }

    /// Zeroize and empty the buffer, keeping its allocation.
    pub fn clear(&mut self) {
        self.bytes.zeroize();
    }

    // Reallocate by hand so the old allocation is wiped instead of being
    // released with buffered bytes still in it.
    fn grow(&mut self, additional: usize) {
        let required = self.bytes.len() + additional;
        let capacity = required.max(self.bytes.capacity() * 2);
        let mut grown = Vec::with_capacity(capacity);
        grown.extend_from_slice(&self.bytes);
        self.bytes.zeroize();
        self.bytes = grown;
    }
}

/// Payload buffer tagged with the session direction.
///
/// Only one payload buffer exists per session; its variant is fixed at init.
pub enum PayloadBuffer {
    /// Plaintext awaiting seal
    Encrypting(ByteAccumulator),
    /// Ciphertext and tag awaiting open
    Decrypting(ByteAccumulator),
}

impl PayloadBuffer {
    /// Empty buffer for `direction`.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        match direction {
            Direction::Encrypting => Self::Encrypting(ByteAccumulator::new()),
            Direction::Decrypting => Self::Decrypting(ByteAccumulator::new()),
        }
    }

    /// Direction this buffer serves.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Encrypting(_) => Direction::Encrypting,
            Self::Decrypting(_) => Direction::Decrypting,
        }
    }

    /// Underlying accumulator.
    #[must_use]
    pub fn bytes(&self) -> &ByteAccumulator {
        match self {
            Self::Encrypting(buf) | Self::Decrypting(buf) => buf,
        }
    }

    /// Underlying accumulator, mutably.
    pub fn bytes_mut(&mut self) -> &mut ByteAccumulator {
        match self {
            Self::Encrypting(buf) | Self::Decrypting(buf) => buf,
        }
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }
}

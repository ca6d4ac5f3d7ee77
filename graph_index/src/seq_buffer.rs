//! A growable 4-bit-packed IUPAC sequence buffer.
//!
//! This is the 4-bit sibling of this workspace's 2-bit `DnaString`: bases
//! are packed 16-to-a-`u64`, most significant nibble first, so that a
//! segment's base offset is a stable `(word, nibble)` pair that never moves
//! once allocated (the buffer only ever grows at the tail).

use crate::iupac::ascii_to_four_bit;
use serde::{Deserialize, Serialize};

const WIDTH: usize = 4;
const BLOCK_BITS: usize = 64;
const BASES_PER_WORD: usize = BLOCK_BITS / WIDTH;
const MASK: u64 = 0xF;

/// Owns its storage, or borrows a caller-supplied pre-encoded buffer.
///
/// `Borrowed` is how `copy_mode = NOCOPY` is honored for pre-encoded 4-bit
/// input: the caller's `Vec<u64>` is moved in (not re-encoded, not copied
/// element by element) and read in place for the lifetime of the index.
/// A true zero-copy *borrow* across the Pool/Archive/Index state machine
/// would need unsafe lifetime threading through every lifecycle transition
/// (see DESIGN.md) — moving ownership gets the same "no re-encode, no
/// duplicate allocation" benefit without it.
pub enum SeqBuffer {
    Owned(OwnedSeqBuffer),
    Borrowed(BorrowedSeqBuffer),
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OwnedSeqBuffer {
    storage: Vec<u64>,
    len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowedSeqBuffer {
    storage: Vec<u64>,
    len: usize,
}

impl SeqBuffer {
    pub fn new_owned() -> Self {
        SeqBuffer::Owned(OwnedSeqBuffer::default())
    }

    /// Adopt a pre-encoded nibble-packed buffer without copying it.
    pub fn from_packed_words(storage: Vec<u64>, len: usize) -> Self {
        SeqBuffer::Borrowed(BorrowedSeqBuffer { storage, len })
    }

    pub fn len(&self) -> usize {
        match self {
            SeqBuffer::Owned(b) => b.len,
            SeqBuffer::Borrowed(b) => b.len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode and append an ASCII sequence, returning the base offset the
    /// sequence was written at. Fails only if growing the backing storage
    /// fails to allocate.
    pub fn push_ascii(&mut self, bases: &[u8]) -> Result<usize, crate::error::GraphError> {
        match self {
            SeqBuffer::Owned(b) => b.push_ascii(bases),
            SeqBuffer::Borrowed(_) => {
                // A borrowed (NOCOPY) buffer was already fully supplied at
                // construction time; appending to it would violate the
                // "caller owns this memory" contract, so callers in COPY
                // mode always carry an Owned buffer instead.
                Err(crate::error::GraphError::InvalidState(
                    "cannot append ASCII bases to a zero-copy (NOCOPY) sequence buffer",
                ))
            }
        }
    }

    /// Append pre-encoded 4-bit IUPAC union codes directly, skipping the
    /// ASCII lookup step (`seq_format = FOUR_BIT`, `copy_mode = COPY`).
    pub fn push_codes(&mut self, codes: &[u8]) -> Result<usize, crate::error::GraphError> {
        match self {
            SeqBuffer::Owned(b) => b.push_codes(codes),
            SeqBuffer::Borrowed(_) => Err(crate::error::GraphError::InvalidState(
                "cannot append codes to a zero-copy (NOCOPY) sequence buffer",
            )),
        }
    }

    /// Get the 4-bit code at absolute position `i`.
    #[inline]
    pub fn get(&self, i: usize) -> u8 {
        match self {
            SeqBuffer::Owned(b) => b.get(i),
            SeqBuffer::Borrowed(b) => b.get(i),
        }
    }
}

impl OwnedSeqBuffer {
    #[inline]
    fn addr(i: usize) -> (usize, usize) {
        (i / BASES_PER_WORD, i % BASES_PER_WORD)
    }

    #[inline]
    fn get_impl(storage: &[u64], i: usize) -> u8 {
        let (word, slot) = Self::addr(i);
        let shift = BLOCK_BITS - WIDTH * (slot + 1);
        ((storage[word] >> shift) & MASK) as u8
    }

    #[inline]
    fn push_nibble(storage: &mut Vec<u64>, len: &mut usize, value: u8) {
        let (word, slot) = Self::addr(*len);
        if slot == 0 {
            storage.push(0);
        }
        let shift = BLOCK_BITS - WIDTH * (slot + 1);
        storage[word] |= (value as u64 & MASK) << shift;
        *len += 1;
    }

    pub fn push_ascii(&mut self, bases: &[u8]) -> Result<usize, crate::error::GraphError> {
        let base_offset = self.len;
        self.storage.try_reserve((bases.len() + BASES_PER_WORD - 1) / BASES_PER_WORD)
            .map_err(|_| crate::error::GraphError::OutOfMemory("sequence buffer growth"))?;
        for &b in bases {
            Self::push_nibble(&mut self.storage, &mut self.len, ascii_to_four_bit(b));
        }
        Ok(base_offset)
    }

    pub fn push_codes(&mut self, codes: &[u8]) -> Result<usize, crate::error::GraphError> {
        let base_offset = self.len;
        self.storage.try_reserve((codes.len() + BASES_PER_WORD - 1) / BASES_PER_WORD)
            .map_err(|_| crate::error::GraphError::OutOfMemory("sequence buffer growth"))?;
        for &c in codes {
            Self::push_nibble(&mut self.storage, &mut self.len, c & (MASK as u8));
        }
        Ok(base_offset)
    }

    #[inline]
    pub fn get(&self, i: usize) -> u8 {
        Self::get_impl(&self.storage, i)
    }
}

impl BorrowedSeqBuffer {
    #[inline]
    pub fn get(&self, i: usize) -> u8 {
        OwnedSeqBuffer::get_impl(&self.storage, i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_round_trips() {
        let mut buf = SeqBuffer::new_owned();
        let base = buf.push_ascii(b"ACGTN").unwrap();
        assert_eq!(base, 0);
        assert_eq!(buf.get(0), ascii_to_four_bit(b'A'));
        assert_eq!(buf.get(1), ascii_to_four_bit(b'C'));
        assert_eq!(buf.get(2), ascii_to_four_bit(b'G'));
        assert_eq!(buf.get(3), ascii_to_four_bit(b'T'));
        assert_eq!(buf.get(4), 0); // N is a gap
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn base_offsets_never_move_on_growth() {
        let mut buf = SeqBuffer::new_owned();
        let a = buf.push_ascii(b"ACGT").unwrap();
        let b = buf.push_ascii(&b"A".repeat(40)).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 4);
        assert_eq!(buf.get(0), ascii_to_four_bit(b'A'));
        assert_eq!(buf.get(b), ascii_to_four_bit(b'A'));
    }

    #[test]
    fn borrowed_buffer_reads_packed_words_without_copying() {
        // Pack "ACGT" by hand: A=1,C=2,G=4,T=8 in the top nibbles of one word.
        let word = (1u64 << 60) | (2u64 << 56) | (4u64 << 52) | (8u64 << 48);
        let buf = SeqBuffer::from_packed_words(vec![word], 4);
        assert_eq!(buf.get(0), 1);
        assert_eq!(buf.get(1), 2);
        assert_eq!(buf.get(2), 4);
        assert_eq!(buf.get(3), 8);
    }
}

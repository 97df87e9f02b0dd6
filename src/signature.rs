//! Packed occupancy signatures for duplicate detection.

use std::fmt;

/// Maximum number of cubicles a signature can describe.
pub const MAX_CELLS: usize = 27;

const BITS_PER_CELL: usize = 4;
const CELL_MASK: u128 = 0xf;

/// Piece codes (0 for empty, 1..=7 for pieces) of every cubicle of a figure,
/// in canonical geometric order.
///
/// Stored as 4-bit nibbles in a single `u128`, so equality, ordering and
/// hashing are single word operations.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature(u128);

impl Signature {
    /// Builds a signature from codes in canonical order.
    pub fn from_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut signature = Signature::default();
        for (index, code) in codes.into_iter().enumerate() {
            signature.set(index, code);
        }
        signature
    }

    /// Code stored for the cubicle at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        debug_assert!(index < MAX_CELLS);
        ((self.0 >> (index * BITS_PER_CELL)) & CELL_MASK) as u8
    }

    #[inline]
    pub fn set(&mut self, index: usize, code: u8) {
        debug_assert!(index < MAX_CELLS);
        let shift = index * BITS_PER_CELL;
        self.0 = (self.0 & !(CELL_MASK << shift)) | ((code as u128 & CELL_MASK) << shift);
    }

    /// Appends `other`, holding `len` codes, after the first `offset` codes.
    ///
    /// Used to concatenate the signatures of a figure's separated
    /// components.
    pub fn splice(&mut self, offset: usize, other: &Signature, len: usize) {
        for index in 0..len {
            self.set(offset + index, other.get(index));
        }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: String = (0..MAX_CELLS)
            .map(|index| char::from(b'0' + self.get(index)))
            .collect();
        write!(f, "Signature({codes})")
    }
}

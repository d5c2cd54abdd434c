//! Bitboard helpers: rank/file masks and small bit tricks.

use crate::game_state::chess_types::Square;

pub const RANKS: [u64; 8] = generate_ranks();
pub const FILES: [u64; 8] = generate_files();

const fn generate_ranks() -> [u64; 8] {
    let mut table = [0u64; 8];
    let mut rank = 0usize;
    while rank < 8 {
        table[rank] = 0xffu64 << (rank * 8);
        rank += 1;
    }
    table
}

const fn generate_files() -> [u64; 8] {
    let mut table = [0u64; 8];
    let mut file = 0usize;
    while file < 8 {
        table[file] = 0x0101_0101_0101_0101u64 << file;
        file += 1;
    }
    table
}

/// Index of the least significant set bit. `bb` must be non-zero.
#[inline]
pub fn lsb(bb: u64) -> Square {
    bb.trailing_zeros() as Square
}

#[inline]
pub const fn more_than_one(bb: u64) -> bool {
    (bb & bb.wrapping_sub(1)) != 0
}

#[inline]
pub const fn contains(bb: u64, square: Square) -> bool {
    (bb & (1u64 << square)) != 0
}

/// Iterate the squares of a bitboard from a1 towards h8.
pub fn squares(bb: u64) -> impl Iterator<Item = Square> {
    let mut remaining = bb;
    std::iter::from_fn(move || {
        if remaining == 0 {
            None
        } else {
            let sq = lsb(remaining);
            remaining &= remaining - 1;
            Some(sq)
        }
    })
}

/// Rotate a bitboard by 180 degrees (a1 <-> h8).
#[inline]
pub const fn rotate180(bb: u64) -> u64 {
    bb.reverse_bits()
}

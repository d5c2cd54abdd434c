//! Square conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and internal
//! square/bitboard representations reused by FEN, SAN and UCI text.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{file_of, rank_of, Square};

/// Convert algebraic notation (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> ChessResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidAlgebraic(square.to_owned()));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidAlgebraic(square.to_owned()));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Convert a square index (`0..=63`) to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> ChessResult<String> {
    if square > 63 {
        return Err(ChessError::InvalidAlgebraic(format!("square index {square}")));
    }

    Ok(format!("{}{}", file_char(square), rank_char(square)))
}

#[inline]
pub fn file_char(square: Square) -> char {
    char::from(b'a' + file_of(square))
}

#[inline]
pub fn rank_char(square: Square) -> char {
    char::from(b'1' + rank_of(square))
}

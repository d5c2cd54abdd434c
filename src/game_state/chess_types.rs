//! Core value types shared by the engine, the protocol decoders and the
//! move parser.

pub use crate::game_state::position::Position;

/// Board square index (`0..=63`, `0 == a1`, `63 == h8`).
pub type Square = u8;

/// Bitboard with one bit per square still eligible as a castling rook origin.
pub type CastlingRights = u64;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub const fn is_white(self) -> bool {
        matches!(self, Color::White)
    }
}

/// Piece role (color is represented separately for cache-friendly layouts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

pub const ALL_ROLES: [Role; 6] = [
    Role::Pawn,
    Role::Knight,
    Role::Bishop,
    Role::Rook,
    Role::Queen,
    Role::King,
];

impl Role {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Role::Pawn => 0,
            Role::Knight => 1,
            Role::Bishop => 2,
            Role::Rook => 3,
            Role::Queen => 4,
            Role::King => 5,
        }
    }

    /// SAN letter; pawns have none.
    #[inline]
    pub const fn symbol(self) -> &'static str {
        match self {
            Role::Pawn => "",
            Role::Knight => "N",
            Role::Bishop => "B",
            Role::Rook => "R",
            Role::Queen => "Q",
            Role::King => "K",
        }
    }

    /// Upper-case FEN letter.
    #[inline]
    pub const fn fen_char(self) -> char {
        match self {
            Role::Pawn => 'P',
            Role::Knight => 'N',
            Role::Bishop => 'B',
            Role::Rook => 'R',
            Role::Queen => 'Q',
            Role::King => 'K',
        }
    }
}

/// A colored piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, role: Role) -> Self {
        Self { color, role }
    }

    pub fn fen_char(self) -> char {
        let ch = self.role.fen_char();
        if self.color.is_white() {
            ch
        } else {
            ch.to_ascii_lowercase()
        }
    }
}

/// Outcome of a recorded game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
    Unknown,
}

impl GameResult {
    /// PGN result token.
    pub const fn as_pgn(self) -> &'static str {
        match self {
            GameResult::WhiteWin => "1-0",
            GameResult::BlackWin => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }
}

#[inline]
pub const fn square(file: u8, rank: u8) -> Square {
    file ^ (rank << 3)
}

#[inline]
pub const fn file_of(square: Square) -> u8 {
    square & 7
}

#[inline]
pub const fn rank_of(square: Square) -> u8 {
    square >> 3
}

/// Flip a square vertically (a1 <-> a8).
#[inline]
pub const fn mirror(square: Square) -> Square {
    square ^ 0x38
}

/// The square on `a`'s file and `b`'s rank.
#[inline]
pub const fn combine(a: Square, b: Square) -> Square {
    square(file_of(a), rank_of(b))
}

/// Chebyshev distance between two squares.
#[inline]
pub const fn distance(a: Square, b: Square) -> u8 {
    let df = (file_of(a) as i8 - file_of(b) as i8).unsigned_abs();
    let dr = (rank_of(a) as i8 - rank_of(b) as i8).unsigned_abs();
    if df > dr {
        df
    } else {
        dr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_takes_file_then_rank() {
        // e1 file with h8 rank is e8.
        assert_eq!(combine(4, 63), 60);
        assert_eq!(square(3, 4), 35);
        assert_eq!(mirror(0), 56);
    }

    #[test]
    fn distance_is_chebyshev() {
        assert_eq!(distance(0, 63), 7);
        assert_eq!(distance(27, 36), 1);
        assert_eq!(distance(7, 8), 7);
    }
}

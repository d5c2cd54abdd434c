//! Bitboard position.
//!
//! Six role bitboards, two color bitboards and a redundant occupancy
//! bitboard. `put` and `discard` are the only primitives that touch piece
//! placement, and both keep occupancy and the incremental hash in step with
//! the bitboards. Move application and generation live in
//! `move_generation` as further `impl Position` blocks.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::*;
use crate::game_state::chess_types::*;
use crate::game_state::zobrist;
use crate::moves::bitboard::{contains, lsb, rotate180, squares};

/// Piece placement only. Two positions with equal setups look identical on a
/// physical board regardless of turn, castling rights or en passant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Setup {
    pub pawns: u64,
    pub knights: u64,
    pub bishops: u64,
    pub rooks: u64,
    pub queens: u64,
    pub kings: u64,
    pub white: u64,
    pub black: u64,
}

impl Setup {
    pub const fn standard() -> Self {
        Self {
            pawns: START_PAWNS,
            knights: START_KNIGHTS,
            bishops: START_BISHOPS,
            rooks: START_ROOKS,
            queens: START_QUEENS,
            kings: START_KINGS,
            white: START_WHITE,
            black: START_BLACK,
        }
    }

    #[inline]
    pub const fn occupied(&self) -> u64 {
        self.white | self.black
    }

    pub const fn rotate180(&self) -> Self {
        Self {
            pawns: rotate180(self.pawns),
            knights: rotate180(self.knights),
            bishops: rotate180(self.bishops),
            rooks: rotate180(self.rooks),
            queens: rotate180(self.queens),
            kings: rotate180(self.kings),
            white: rotate180(self.white),
            black: rotate180(self.black),
        }
    }

    /// Every occupied square must carry exactly one role and one color.
    pub fn validate(&self) -> ChessResult<()> {
        if self.white & self.black != 0 {
            return Err(ChessError::InconsistentBitboards(
                "white and black overlap".to_owned(),
            ));
        }

        let roles = [
            self.pawns,
            self.knights,
            self.bishops,
            self.rooks,
            self.queens,
            self.kings,
        ];
        let mut seen = 0u64;
        for bb in roles {
            if seen & bb != 0 {
                return Err(ChessError::InconsistentBitboards(format!(
                    "square {} claimed by two roles",
                    lsb(seen & bb)
                )));
            }
            seen |= bb;
        }

        if seen != self.occupied() {
            return Err(ChessError::InconsistentBitboards(
                "role bitboards do not cover the color bitboards".to_owned(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) pawns: u64,
    pub(crate) knights: u64,
    pub(crate) bishops: u64,
    pub(crate) rooks: u64,
    pub(crate) queens: u64,
    pub(crate) kings: u64,
    pub(crate) white: u64,
    pub(crate) black: u64,
    pub(crate) occupied: u64,
    pub(crate) turn: Color,
    pub(crate) ep_square: Option<Square>,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) incremental_hash: u64,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Standard starting position, white to move, all castling rights.
    pub fn new() -> Self {
        let mut position = Self::with_setup(Setup::standard(), Color::White, None, START_ROOKS);
        position.refresh_hash();
        position
    }

    /// Board with no pieces, white to move.
    pub fn empty() -> Self {
        let mut position = Self::with_setup(Setup::default(), Color::White, None, 0);
        position.refresh_hash();
        position
    }

    /// Build a position from raw bitboards, rejecting inconsistent occupancy.
    pub fn from_parts(
        setup: Setup,
        turn: Color,
        ep_square: Option<Square>,
        castling_rights: CastlingRights,
    ) -> ChessResult<Self> {
        setup.validate()?;
        if let Some(ep) = ep_square {
            if ep > 63 {
                return Err(ChessError::InconsistentBitboards(format!(
                    "en passant square {ep} is off the board"
                )));
            }
        }
        let mut position = Self::with_setup(setup, turn, ep_square, castling_rights);
        position.refresh_hash();
        Ok(position)
    }

    fn with_setup(
        setup: Setup,
        turn: Color,
        ep_square: Option<Square>,
        castling_rights: CastlingRights,
    ) -> Self {
        Self {
            pawns: setup.pawns,
            knights: setup.knights,
            bishops: setup.bishops,
            rooks: setup.rooks,
            queens: setup.queens,
            kings: setup.kings,
            white: setup.white,
            black: setup.black,
            occupied: setup.occupied(),
            turn,
            ep_square,
            castling_rights,
            incremental_hash: 0,
        }
    }

    fn refresh_hash(&mut self) {
        self.incremental_hash = zobrist::hash_pieces(self) ^ zobrist::hash_turn(self);
    }

    pub fn setup(&self) -> Setup {
        Setup {
            pawns: self.pawns,
            knights: self.knights,
            bishops: self.bishops,
            rooks: self.rooks,
            queens: self.queens,
            kings: self.kings,
            white: self.white,
            black: self.black,
        }
    }

    /// Same piece placement, ignoring turn, rights and en passant.
    #[inline]
    pub fn equal_setup(&self, other: &Position) -> bool {
        self.setup() == other.setup()
    }

    #[inline]
    pub fn pawns(&self) -> u64 {
        self.pawns
    }

    #[inline]
    pub fn knights(&self) -> u64 {
        self.knights
    }

    #[inline]
    pub fn bishops(&self) -> u64 {
        self.bishops
    }

    #[inline]
    pub fn rooks(&self) -> u64 {
        self.rooks
    }

    #[inline]
    pub fn queens(&self) -> u64 {
        self.queens
    }

    #[inline]
    pub fn kings(&self) -> u64 {
        self.kings
    }

    #[inline]
    pub fn occupied(&self) -> u64 {
        self.occupied
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn incremental_hash(&self) -> u64 {
        self.incremental_hash
    }

    #[inline]
    pub fn by_color(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline]
    pub fn by_role(&self, role: Role) -> u64 {
        match role {
            Role::Pawn => self.pawns,
            Role::Knight => self.knights,
            Role::Bishop => self.bishops,
            Role::Rook => self.rooks,
            Role::Queen => self.queens,
            Role::King => self.kings,
        }
    }

    #[inline]
    pub fn us(&self) -> u64 {
        self.by_color(self.turn)
    }

    #[inline]
    pub fn them(&self) -> u64 {
        self.by_color(self.turn.opposite())
    }

    pub fn king(&self, color: Color) -> Option<Square> {
        let kings = self.kings & self.by_color(color);
        if kings == 0 {
            None
        } else {
            Some(lsb(kings))
        }
    }

    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        contains(self.occupied, square)
    }

    pub fn role_at(&self, square: Square) -> Option<Role> {
        ALL_ROLES
            .into_iter()
            .find(|role| contains(self.by_role(*role), square))
    }

    pub fn color_at(&self, square: Square) -> Option<Color> {
        if contains(self.white, square) {
            Some(Color::White)
        } else if contains(self.black, square) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        Some(Piece::new(self.color_at(square)?, self.role_at(square)?))
    }

    /// Occupied squares and their pieces, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        squares(self.occupied).filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    fn role_bitboard_mut(&mut self, role: Role) -> &mut u64 {
        match role {
            Role::Pawn => &mut self.pawns,
            Role::Knight => &mut self.knights,
            Role::Bishop => &mut self.bishops,
            Role::Rook => &mut self.rooks,
            Role::Queen => &mut self.queens,
            Role::King => &mut self.kings,
        }
    }

    fn color_bitboard_mut(&mut self, color: Color) -> &mut u64 {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Remove whatever stands on `square`. No-op on an empty square.
    pub fn discard(&mut self, square: Square) {
        let Some(piece) = self.piece_at(square) else {
            return;
        };
        let mask = 1u64 << square;
        *self.role_bitboard_mut(piece.role) ^= mask;
        *self.color_bitboard_mut(piece.color) ^= mask;
        self.occupied ^= mask;
        self.incremental_hash ^= zobrist::piece_square_key(piece.color, piece.role, square);
    }

    /// Place a piece, replacing any occupant.
    pub fn put(&mut self, square: Square, piece: Piece) {
        self.discard(square);
        let mask = 1u64 << square;
        *self.role_bitboard_mut(piece.role) ^= mask;
        *self.color_bitboard_mut(piece.color) ^= mask;
        self.occupied ^= mask;
        self.incremental_hash ^= zobrist::piece_square_key(piece.color, piece.role, square);
    }

    /// Full hash: pieces, turn, castling rights, and the en passant file when
    /// an en passant capture is actually legal.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = self.incremental_hash ^ zobrist::castling_key(self.castling_rights);
        if let Some(ep) = self.ep_square {
            if self.has_legal_en_passant() {
                hash ^= zobrist::en_passant_file_key(file_of(ep));
            }
        }
        hash
    }

    /// Turn the board around (a1 <-> h8). Colors stay as they were.
    pub fn rotate180(&mut self) {
        let setup = self.setup().rotate180();
        let turn = self.turn;
        let ep_square = self.ep_square.map(|sq| 63 - sq);
        let castling_rights = rotate180(self.castling_rights);
        *self = Self::with_setup(setup, turn, ep_square, castling_rights);
        self.refresh_hash();
    }

    /// Both kings parked on d4/d5/e4/e5 signal a finished game.
    ///
    /// e4 + d5 is a white win, e5 + d4 a black win, any other central pair a
    /// draw. The color of each king does not matter.
    pub fn result_signal(&self) -> Option<GameResult> {
        if self.kings & self.white & CENTRAL_SQUARES == 0
            || self.kings & self.black & CENTRAL_SQUARES == 0
        {
            None
        } else if self.kings & E4 != 0 && self.kings & D5 != 0 {
            Some(GameResult::WhiteWin)
        } else if self.kings & E5 != 0 && self.kings & D4 != 0 {
            Some(GameResult::BlackWin)
        } else {
            Some(GameResult::Draw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn starting_position_is_consistent() {
        let position = Position::new();
        assert_eq!(position.occupied(), position.by_color(Color::White) | position.by_color(Color::Black));
        assert!(position.setup().validate().is_ok());
        assert_eq!(position.king(Color::White), Some(4));
        assert_eq!(position.king(Color::Black), Some(60));
        assert_eq!(
            position.piece_at(3),
            Some(Piece::new(Color::White, Role::Queen))
        );
        assert_eq!(position.piece_at(27), None);
        assert_eq!(position.castling_rights(), START_ROOKS);
    }

    #[test]
    fn put_and_discard_keep_hash_in_sync() {
        let mut position = Position::new();
        let before = position.incremental_hash();

        position.put(27, Piece::new(Color::Black, Role::Knight));
        assert_ne!(position.incremental_hash(), before);
        position.put(27, Piece::new(Color::White, Role::Queen));
        assert_eq!(position.role_at(27), Some(Role::Queen));
        assert_eq!(position.color_at(27), Some(Color::White));
        position.discard(27);
        position.discard(27);

        assert_eq!(position.incremental_hash(), before);
        assert_eq!(position, Position::new());
    }

    #[test]
    fn from_parts_rejects_overlapping_roles() {
        let mut setup = Setup::standard();
        setup.knights |= 1 << 8;
        let err = Position::from_parts(setup, Color::White, None, 0).expect_err("must reject");
        assert!(matches!(err, ChessError::InconsistentBitboards(_)));

        let mut setup = Setup::standard();
        setup.white |= 1 << 30;
        assert!(Position::from_parts(setup, Color::White, None, 0).is_err());
    }

    #[test]
    fn rotating_twice_restores_position() {
        let mut position = parse_fen("r3k2r/8/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1").expect("FEN should parse");
        let original = position.clone();
        position.rotate180();
        assert_eq!(position.setup(), original.setup().rotate180());
        assert_eq!(position.ep_square(), Some(63 - 43));
        position.rotate180();
        assert_eq!(position, original);
    }

    #[test]
    fn rotated_start_setup_has_white_on_top() {
        let rotated = Setup::standard().rotate180();
        assert_eq!(rotated.white, START_BLACK);
        assert_eq!(rotated.kings, 1 << 59 | 1 << 3);
    }

    #[test]
    fn result_signal_uses_king_pairs() {
        let white_win = parse_fen("8/8/8/3k4/4K3/8/8/8 w - - 0 1").expect("FEN should parse");
        assert_eq!(white_win.result_signal(), Some(GameResult::WhiteWin));

        let black_win = parse_fen("8/8/8/4k3/3K4/8/8/8 w - - 0 1").expect("FEN should parse");
        assert_eq!(black_win.result_signal(), Some(GameResult::BlackWin));

        let draw = parse_fen("8/8/8/3kK3/8/8/8/8 w - - 0 1").expect("FEN should parse");
        assert_eq!(draw.result_signal(), Some(GameResult::Draw));

        assert_eq!(Position::new().result_signal(), None);
        let one_central = parse_fen("8/8/8/3k4/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(one_central.result_signal(), None);
    }
}

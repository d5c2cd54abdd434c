//! Zobrist hashing support for fast position identity.
//!
//! The keys are drawn from a fixed-seed generator so hashes are deterministic
//! across runs, which is useful for testing and debugging. Piece placement and
//! side to move are maintained incrementally by `Position`; castling and
//! en-passant terms are folded in only when the full hash is read.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::chess_types::*;

const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    white_to_move: u64,
    castling: [u64; 64],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for role in color {
            for sq in role {
                *sq = rng.random();
            }
        }
    }

    let white_to_move = rng.random();

    let mut castling = [0u64; 64];
    for key in &mut castling {
        *key = rng.random();
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = rng.random();
    }

    ZobristTables {
        piece_square,
        white_to_move,
        castling,
        en_passant_file,
    }
}

/// Return the Zobrist key for a `(color, role, square)` occupancy term.
#[inline]
pub fn piece_square_key(color: Color, role: Role, square: Square) -> u64 {
    tables().piece_square[color.index()][role.index()][square as usize]
}

/// Key xor-ed in while white is to move.
#[inline]
pub fn turn_key() -> u64 {
    tables().white_to_move
}

/// Castling contribution: one key per rook origin square still eligible.
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    let mut key = 0u64;
    let mut rights = castling_rights;
    while rights != 0 {
        key ^= tables().castling[rights.trailing_zeros() as usize];
        rights &= rights - 1;
    }
    key
}

#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    tables().en_passant_file[file as usize]
}

/// Hash of piece placement only.
pub fn hash_pieces(position: &Position) -> u64 {
    let mut key = 0u64;
    let mut occupied = position.occupied();
    while occupied != 0 {
        let sq = occupied.trailing_zeros() as Square;
        if let Some(piece) = position.piece_at(sq) {
            key ^= piece_square_key(piece.color, piece.role, sq);
        }
        occupied &= occupied - 1;
    }
    key
}

#[inline]
pub fn hash_turn(position: &Position) -> u64 {
    if position.turn().is_white() {
        turn_key()
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn starting_position_hash_is_deterministic() {
        let a = Position::new();
        let b = Position::new();
        assert_eq!(a.zobrist_hash(), b.zobrist_hash());
    }

    #[test]
    fn side_to_move_changes_hash() {
        let w = parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let b = parse_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_ne!(w.zobrist_hash(), b.zobrist_hash());
    }

    #[test]
    fn castling_rights_change_hash() {
        let with_rights = parse_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let without_rights =
            parse_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").expect("FEN should parse");
        assert_ne!(with_rights.zobrist_hash(), without_rights.zobrist_hash());
    }

    #[test]
    fn en_passant_only_hashed_when_capturable() {
        // Black pawn on d4 can take e3.
        let ep = parse_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").expect("FEN should parse");
        let no_ep = parse_fen("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_ne!(ep.zobrist_hash(), no_ep.zobrist_hash());

        // Nobody can take on e3, so the square does not change the hash.
        let dead_ep = parse_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").expect("FEN should parse");
        let dead_no_ep = parse_fen("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_eq!(dead_ep.zobrist_hash(), dead_no_ep.zobrist_hash());
    }

    #[test]
    fn incremental_hash_matches_recompute_after_moves() {
        let mut position = Position::new();
        for _ in 0..6 {
            let moves = position.legal_moves();
            let mv = *moves.iter().next().expect("position should have moves");
            position.apply_move(&mv);
            assert_eq!(
                position.incremental_hash(),
                hash_pieces(&position) ^ hash_turn(&position)
            );
        }
    }
}

use crate::game_state::chess_types::*;
use crate::game_state::zobrist;
use crate::moves::attack_tables::attack_tables;
use crate::moves::bitboard::RANKS;
use crate::moves::chess_move::{Move, MoveKind};

impl Position {
    /// Play a legal move in place.
    ///
    /// The move must come from `legal_moves()` of this position; nothing is
    /// re-validated here.
    pub fn apply_move(&mut self, mv: &Move) {
        let turn = self.turn;
        self.ep_square = None;

        match mv.kind {
            MoveKind::Normal {
                role,
                from,
                capture,
                to,
                promotion,
            } => {
                if role == Role::Pawn && from.abs_diff(to) == 16 {
                    let their_pawns = self.them() & self.pawns;
                    let skipped = match turn {
                        Color::White => from + 8,
                        Color::Black => from - 8,
                    };
                    if attack_tables().pawn_attacks(turn, skipped) & their_pawns != 0 {
                        self.ep_square = Some(skipped);
                    }
                }

                if self.castling_rights != 0 {
                    if role == Role::King {
                        self.castling_rights &= own_back_rank_cleared(turn);
                    } else if role == Role::Rook {
                        self.castling_rights &= !(1u64 << from);
                    }
                    if capture {
                        self.castling_rights &= !(1u64 << to);
                    }
                }

                self.discard(from);
                self.put(to, Piece::new(turn, promotion.unwrap_or(role)));
            }
            MoveKind::Castling { king, rook } => {
                self.castling_rights &= own_back_rank_cleared(turn);
                let queen_side = rook < king;
                let rook_to = combine(if queen_side { 3 } else { 5 }, rook);
                let king_to = combine(if queen_side { 2 } else { 6 }, king);
                self.discard(king);
                self.discard(rook);
                self.put(rook_to, Piece::new(turn, Role::Rook));
                self.put(king_to, Piece::new(turn, Role::King));
            }
            MoveKind::EnPassant { from, to } => {
                self.discard(combine(to, from));
                self.discard(from);
                self.put(to, Piece::new(turn, Role::Pawn));
            }
        }

        self.turn = turn.opposite();
        self.incremental_hash ^= zobrist::turn_key();
    }

    /// Copy of this position with `mv` played.
    pub fn after(&self, mv: &Move) -> Position {
        let mut next = self.clone();
        next.apply_move(mv);
        next
    }
}

/// Mask keeping only the opponent's castling rights.
#[inline]
fn own_back_rank_cleared(turn: Color) -> u64 {
    match turn {
        Color::White => RANKS[7],
        Color::Black => RANKS[0],
    }
}

//! Standard algebraic notation for moves found by the move parser.

use crate::game_state::chess_types::*;
use crate::moves::chess_move::{Move, MoveKind};
use crate::utils::algebraic::{file_char, rank_char};

/// SAN for `mv` played from `before`, with `after` the resulting position.
///
/// Disambiguates against other legal moves of the same role to the same
/// square: by file when that separates them, otherwise by rank. Check and
/// mate suffixes come from the legal replies in `after`.
pub fn move_to_san(before: &Position, mv: &Move, after: &Position) -> String {
    let mut san = String::with_capacity(8);

    match mv.kind {
        MoveKind::Castling { king, rook } => {
            san.push_str(if file_of(rook) > file_of(king) { "O-O" } else { "O-O-O" });
        }
        MoveKind::EnPassant { from, to } => {
            san.push(file_char(from));
            san.push('x');
            push_square(&mut san, to);
        }
        MoveKind::Normal {
            role,
            from,
            capture,
            to,
            promotion,
        } => {
            if role == Role::Pawn {
                if capture {
                    san.push(file_char(from));
                }
            } else {
                san.push_str(role.symbol());
                let (by_file, by_rank) = disambiguation(before, role, from, to);
                if by_file {
                    san.push(file_char(from));
                }
                if by_rank {
                    san.push(rank_char(from));
                }
            }
            if capture {
                san.push('x');
            }
            push_square(&mut san, to);
            if let Some(promoted) = promotion {
                san.push('=');
                san.push_str(promoted.symbol());
            }
        }
    }

    if after.is_check() {
        san.push(if after.legal_moves().is_empty() { '#' } else { '+' });
    }
    san
}

fn disambiguation(before: &Position, role: Role, from: Square, to: Square) -> (bool, bool) {
    let mut by_file = false;
    let mut by_rank = false;
    for other in &before.legal_moves() {
        if other.role() != role || other.from() == from || other.to() != to {
            continue;
        }
        if matches!(other.kind, MoveKind::Castling { .. }) {
            continue;
        }
        if rank_of(other.from()) == rank_of(from) || file_of(other.from()) != file_of(from) {
            by_file = true;
        } else {
            by_rank = true;
        }
    }
    (by_file, by_rank)
}

fn push_square(san: &mut String, square: Square) {
    san.push(file_char(square));
    san.push(rank_char(square));
}

//! Move value type.
//!
//! A move is one of three shapes (normal, en passant, castling) plus an
//! ordering score computed at generation time. The score only orders moves
//! deterministically; nothing in the driver plays by it.

use crate::game_state::chess_types::*;
use crate::moves::attack_tables::attack_tables;

/// Castling is encoded king-captures-own-rook: `rook` is the rook's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal {
        role: Role,
        from: Square,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
    EnPassant {
        from: Square,
        to: Square,
    },
    Castling {
        king: Square,
        rook: Square,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub kind: MoveKind,
    pub score: u32,
}

impl Move {
    pub fn normal(
        position: &Position,
        role: Role,
        from: Square,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    ) -> Self {
        Self::scored(
            position,
            MoveKind::Normal {
                role,
                from,
                capture,
                to,
                promotion,
            },
        )
    }

    pub fn en_passant(position: &Position, from: Square, to: Square) -> Self {
        Self::scored(position, MoveKind::EnPassant { from, to })
    }

    pub fn castling(position: &Position, king: Square, rook: Square) -> Self {
        Self::scored(position, MoveKind::Castling { king, rook })
    }

    fn scored(position: &Position, kind: MoveKind) -> Self {
        let mut mv = Move { kind, score: 0 };
        mv.score = move_score(position, &mv);
        mv
    }

    #[inline]
    pub fn role(&self) -> Role {
        match self.kind {
            MoveKind::Normal { role, .. } => role,
            MoveKind::EnPassant { .. } => Role::Pawn,
            MoveKind::Castling { .. } => Role::King,
        }
    }

    #[inline]
    pub fn from(&self) -> Square {
        match self.kind {
            MoveKind::Normal { from, .. } | MoveKind::EnPassant { from, .. } => from,
            MoveKind::Castling { king, .. } => king,
        }
    }

    /// Destination as generated; for castling this is the rook square.
    #[inline]
    pub fn to(&self) -> Square {
        match self.kind {
            MoveKind::Normal { to, .. } | MoveKind::EnPassant { to, .. } => to,
            MoveKind::Castling { rook, .. } => rook,
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        match self.kind {
            MoveKind::Normal { capture, .. } => capture,
            MoveKind::EnPassant { .. } => true,
            MoveKind::Castling { .. } => false,
        }
    }

    #[inline]
    pub fn promotion(&self) -> Option<Role> {
        match self.kind {
            MoveKind::Normal { promotion, .. } => promotion,
            _ => None,
        }
    }

    /// Where the king lands. Castling uses the c/g file on the king's rank.
    pub fn king_destination(&self) -> Square {
        match self.kind {
            MoveKind::Castling { king, rook } => {
                let target_file = if rook < king { 2 } else { 6 };
                square(target_file, rank_of(king))
            }
            _ => self.to(),
        }
    }

    /// Coordinate notation, e.g. `e2e4`, `e7e8q`, `e1g1`.
    pub fn uci(&self) -> String {
        let mut text = String::with_capacity(5);
        push_square(&mut text, self.from());
        push_square(&mut text, self.king_destination());
        if let Some(promotion) = self.promotion() {
            text.push(promotion.fen_char().to_ascii_lowercase());
        }
        text
    }
}

fn push_square(text: &mut String, sq: Square) {
    text.push((b'a' + file_of(sq)) as char);
    text.push((b'1' + rank_of(sq)) as char);
}

fn move_score(position: &Position, mv: &Move) -> u32 {
    let turn = position.turn();
    let role = mv.role();
    let (from, to) = (mv.from(), mv.to());

    let defending_pawns =
        attack_tables().pawn_attacks(turn, to) & position.pawns() & position.them();
    let guard = if defending_pawns == 0 {
        6
    } else {
        5 - role.index() as i32
    };
    let move_value = piece_value(turn, role, to) - piece_value(turn, role, from);

    let promotion = mv.promotion().map_or(0, |p| (p.index() as i32) << 26);
    let capture = if mv.is_capture() { 1 << 25 } else { 0 };

    (promotion + capture + (guard << 22) + ((512 + move_value) << 12) + ((to as i32) << 6) + from as i32)
        as u32
}

/// Tables are laid out rank 8 first from white's point of view.
#[inline]
fn piece_value(turn: Color, role: Role, sq: Square) -> i32 {
    let index = if turn.is_white() { sq ^ 56 } else { sq };
    PSQT[role.index()][index as usize]
}

#[rustfmt::skip]
const PSQT: [[i32; 64]; 6] = [
    [
         0,  0,  0,  0,  0,  0,  0,  0,
        50, 50, 50, 50, 50, 50, 50, 50,
        10, 10, 20, 30, 30, 20, 10, 10,
         5,  5, 10, 25, 25, 10,  5,  5,
         0,  0,  0, 20, 21,  0,  0,  0,
         5, -5,-10,  0,  0,-10, -5,  5,
         5, 10, 10,-31,-31, 10, 10,  5,
         0,  0,  0,  0,  0,  0,  0,  0,
    ],
    [
        -50,-40,-30,-30,-30,-30,-40,-50,
        -40,-20,  0,  0,  0,  0,-20,-40,
        -30,  0, 10, 15, 15, 10,  0,-30,
        -30,  5, 15, 20, 20, 15,  5,-30,
        -30,  0, 15, 20, 20, 15,  0,-30,
        -30,  5, 10, 15, 15, 11,  5,-30,
        -40,-20,  0,  5,  5,  0,-20,-40,
        -50,-40,-30,-30,-30,-30,-40,-50,
    ],
    [
        -20,-10,-10,-10,-10,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5, 10, 10,  5,  0,-10,
        -10,  5,  5, 10, 10,  5,  5,-10,
        -10,  0, 10, 10, 10, 10,  0,-10,
        -10, 10, 10, 10, 10, 10, 10,-10,
        -10,  5,  0,  0,  0,  0,  5,-10,
        -20,-10,-10,-10,-10,-10,-10,-20,
    ],
    [
         0,  0,  0,  0,  0,  0,  0,  0,
         5, 10, 10, 10, 10, 10, 10,  5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
         0,  0,  0,  5,  5,  0,  0,  0,
    ],
    [
        -20,-10,-10, -5, -5,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5,  5,  5,  5,  0,-10,
         -5,  0,  5,  5,  5,  5,  0, -5,
          0,  0,  5,  5,  5,  5,  0, -5,
        -10,  5,  5,  5,  5,  5,  0,-10,
        -10,  0,  5,  0,  0,  0,  0,-10,
        -20,-10,-10, -5, -5,-10,-10,-20,
    ],
    [
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -20,-30,-30,-40,-40,-30,-30,-20,
        -10,-20,-20,-20,-20,-20,-20,-10,
         20, 20,  0,  0,  0,  0, 20, 20,
          0, 30, 10,  0,  0, 10, 30,  0,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uci_text_for_castling_uses_king_destination() {
        let position = Position::new();
        let short = Move::castling(&position, 4, 7);
        let long = Move::castling(&position, 4, 0);
        assert_eq!(short.uci(), "e1g1");
        assert_eq!(long.uci(), "e1c1");
        assert_eq!(short.role(), Role::King);
        assert!(!short.is_capture());
    }

    #[test]
    fn uci_text_for_promotion_has_lowercase_suffix() {
        let position = Position::empty();
        let mv = Move::normal(&position, Role::Pawn, 52, false, 60, Some(Role::Queen));
        assert_eq!(mv.uci(), "e7e8q");
        assert!(!mv.is_capture());
    }

    #[test]
    fn score_ranks_promotions_above_captures_above_quiet_moves() {
        let position = Position::empty();
        let quiet = Move::normal(&position, Role::Knight, 1, false, 18, None);
        let capture = Move::normal(&position, Role::Knight, 1, true, 18, None);
        let promotion = Move::normal(&position, Role::Pawn, 52, false, 60, Some(Role::Queen));
        assert!(quiet.score < capture.score);
        assert!(capture.score < promotion.score);
    }

    #[test]
    fn centralising_pawn_push_scores_above_edge_push() {
        let position = Position::new();
        let e4 = Move::normal(&position, Role::Pawn, 12, false, 28, None);
        let a4 = Move::normal(&position, Role::Pawn, 8, false, 24, None);
        assert!(e4.score > a4.score);
    }
}

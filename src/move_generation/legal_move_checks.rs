use crate::game_state::chess_types::*;
use crate::moves::attack_tables::attack_tables;
use crate::moves::bitboard::{contains, more_than_one, squares};
use crate::moves::chess_move::{Move, MoveKind};

impl Position {
    /// Pieces of `attacker` that attack `square` given `occupied` as blockers.
    pub fn attacks_to(&self, square: Square, attacker: Color, occupied: u64) -> u64 {
        let tables = attack_tables();
        self.by_color(attacker)
            & ((tables.rook_attacks(square, occupied) & (self.rooks ^ self.queens))
                | (tables.bishop_attacks(square, occupied) & (self.bishops ^ self.queens))
                | (tables.knight_attacks(square) & self.knights)
                | (tables.king_attacks(square) & self.kings)
                | (tables.pawn_attacks(attacker.opposite(), square) & self.pawns))
    }

    #[inline]
    pub fn is_square_attacked(&self, square: Square, attacker: Color) -> bool {
        self.attacks_to(square, attacker, self.occupied) != 0
    }

    /// Enemy pieces giving check to the side to move.
    pub fn checkers(&self) -> u64 {
        match self.king(self.turn) {
            Some(king) => self.attacks_to(king, self.turn.opposite(), self.occupied),
            None => 0,
        }
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.checkers() != 0
    }

    /// Pieces standing alone between `king` and an enemy slider aimed at it.
    pub fn slider_blockers(&self, king: Square) -> u64 {
        let tables = attack_tables();
        let snipers = self.them()
            & ((tables.rook_attacks(king, 0) & (self.rooks ^ self.queens))
                | (tables.bishop_attacks(king, 0) & (self.bishops ^ self.queens)));

        let mut blockers = 0u64;
        for sniper in squares(snipers) {
            let between = tables.between(king, sniper) & self.occupied;
            if !more_than_one(between) {
                blockers |= between;
            }
        }
        blockers
    }

    /// Whether a generated move keeps the mover's king out of check.
    ///
    /// Pinned pieces may only slide along the pin line. En passant removes
    /// two pieces from the board at once, so it is re-checked against the
    /// resulting occupancy.
    pub(crate) fn is_safe(&self, king: Square, mv: &Move, blockers: u64) -> bool {
        match mv.kind {
            MoveKind::Normal { from, to, .. } => {
                !contains(self.us() & blockers, from) || attack_tables().aligned(from, to, king)
            }
            MoveKind::EnPassant { from, to } => {
                let captured = combine(to, from);
                let occupied = (self.occupied ^ (1u64 << from) ^ (1u64 << captured)) | (1u64 << to);
                self.attacks_to(king, self.turn.opposite(), occupied) & !(1u64 << captured) == 0
            }
            MoveKind::Castling { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game_state::chess_types::*;
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn starting_position_has_no_checkers() {
        let position = Position::new();
        assert!(!position.is_check());
        assert!(position.is_square_attacked(20, Color::White));
        assert!(!position.is_square_attacked(28, Color::White));
    }

    #[test]
    fn detects_knight_and_slider_checks() {
        let knight = parse_fen("4k3/8/3N4/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert!(knight.is_check());

        let double = parse_fen("4k3/8/3N4/8/8/8/8/4RK2 b - - 0 1").expect("FEN should parse");
        assert_eq!(double.checkers().count_ones(), 2);
    }

    #[test]
    fn pinned_piece_is_a_blocker() {
        // Black bishop on b4 pins the white knight on d2 to the king on e1.
        let position = parse_fen("4k3/8/8/8/1b6/8/3N4/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(position.slider_blockers(4), 1 << 11);

        // Two pieces on the line means no pin.
        let shielded = parse_fen("4k3/8/8/8/1b6/2P5/3N4/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(shielded.slider_blockers(4), 0);
    }
}

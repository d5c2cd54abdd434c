//! Legal move generation.
//!
//! Moves are produced directly as legal moves: king steps are checked
//! against attacks with the king lifted off the board, evasions restrict
//! targets to the checking line, and a final pass drops moves by pinned
//! pieces that leave the pin line.

use crate::game_state::chess_types::*;
use crate::moves::attack_tables::attack_tables;
use crate::moves::bitboard::{lsb, more_than_one, squares, RANKS};
use crate::moves::move_list::MoveList;

impl Position {
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        self.legal_moves_into(&mut moves);
        moves
    }

    /// Fill `moves` with every legal move, reusing its allocation.
    pub fn legal_moves_into(&self, moves: &mut MoveList) {
        moves.clear();

        if self.ep_square.is_some() {
            self.gen_en_passant(moves);
        }

        let Some(king) = self.king(self.turn) else {
            self.gen_non_king(!self.us(), moves);
            return;
        };

        let checkers = self.attacks_to(king, self.turn.opposite(), self.occupied);
        if checkers == 0 {
            let target = !self.us();
            self.gen_non_king(target, moves);
            self.gen_safe_king(king, target, moves);
            self.gen_castling(king, moves);
        } else {
            self.gen_evasions(king, checkers, moves);
        }

        let blockers = self.slider_blockers(king);
        if blockers != 0 || self.ep_square.is_some() {
            moves.retain(|mv| self.is_safe(king, mv, blockers));
        }
    }

    /// True when the side to move can legally capture en passant.
    pub fn has_legal_en_passant(&self) -> bool {
        if self.ep_square.is_none() {
            return false;
        }
        let Some(king) = self.king(self.turn) else {
            return false;
        };

        let mut moves = MoveList::new();
        self.gen_en_passant(&mut moves);
        let blockers = self.slider_blockers(king);
        moves.any_match(|mv| self.is_safe(king, mv, blockers))
    }

    fn gen_non_king(&self, mask: u64, moves: &mut MoveList) {
        let tables = attack_tables();
        self.gen_pawn(mask, moves);

        for from in squares(self.us() & self.knights) {
            self.push_targets(Role::Knight, from, tables.knight_attacks(from) & mask, moves);
        }
        for from in squares(self.us() & self.bishops) {
            let targets = tables.bishop_attacks(from, self.occupied) & mask;
            self.push_targets(Role::Bishop, from, targets, moves);
        }
        for from in squares(self.us() & self.rooks) {
            let targets = tables.rook_attacks(from, self.occupied) & mask;
            self.push_targets(Role::Rook, from, targets, moves);
        }
        for from in squares(self.us() & self.queens) {
            let targets = tables.queen_attacks(from, self.occupied) & mask;
            self.push_targets(Role::Queen, from, targets, moves);
        }
    }

    fn push_targets(&self, role: Role, from: Square, targets: u64, moves: &mut MoveList) {
        for to in squares(targets) {
            moves.push_normal(self, role, from, self.is_occupied(to), to);
        }
    }

    fn gen_safe_king(&self, king: Square, mask: u64, moves: &mut MoveList) {
        let them = self.turn.opposite();
        let without_king = self.occupied ^ (1u64 << king);
        for to in squares(attack_tables().king_attacks(king) & mask) {
            if self.attacks_to(to, them, without_king) == 0 {
                moves.push_normal(self, Role::King, king, self.is_occupied(to), to);
            }
        }
    }

    fn gen_evasions(&self, king: Square, checkers: u64, moves: &mut MoveList) {
        let tables = attack_tables();
        let sliders = checkers & (self.bishops ^ self.rooks ^ self.queens);
        let mut attacked = 0u64;
        for slider in squares(sliders) {
            attacked |= tables.ray(king, slider) ^ (1u64 << slider);
        }

        self.gen_safe_king(king, !self.us() & !attacked, moves);

        if checkers != 0 && !more_than_one(checkers) {
            let checker = lsb(checkers);
            let target = tables.between(king, checker) | checkers;
            self.gen_non_king(target, moves);
        }
    }

    fn gen_pawn(&self, mask: u64, moves: &mut MoveList) {
        let tables = attack_tables();
        let our_pawns = self.us() & self.pawns;

        for from in squares(our_pawns) {
            let targets = tables.pawn_attacks(self.turn, from) & self.them() & mask;
            for to in squares(targets) {
                self.add_pawn_moves(from, true, to, moves);
            }
        }

        let (single, double) = match self.turn {
            Color::White => {
                let single = (our_pawns << 8) & !self.occupied;
                (single, (single << 8) & !self.occupied & RANKS[3])
            }
            Color::Black => {
                let single = (our_pawns >> 8) & !self.occupied;
                (single, (single >> 8) & !self.occupied & RANKS[4])
            }
        };

        for to in squares(single & mask) {
            let from = match self.turn {
                Color::White => to - 8,
                Color::Black => to + 8,
            };
            self.add_pawn_moves(from, false, to, moves);
        }

        for to in squares(double & mask) {
            let from = match self.turn {
                Color::White => to - 16,
                Color::Black => to + 16,
            };
            moves.push_normal(self, Role::Pawn, from, false, to);
        }
    }

    fn add_pawn_moves(&self, from: Square, capture: bool, to: Square, moves: &mut MoveList) {
        let last_rank = if self.turn.is_white() { 7 } else { 0 };
        if rank_of(to) == last_rank {
            moves.push_promotions(self, from, capture, to);
        } else {
            moves.push_normal(self, Role::Pawn, from, capture, to);
        }
    }

    fn gen_en_passant(&self, moves: &mut MoveList) {
        let Some(ep) = self.ep_square else {
            return;
        };
        let capturers =
            self.us() & self.pawns & attack_tables().pawn_attacks(self.turn.opposite(), ep);
        for pawn in squares(capturers) {
            moves.push_en_passant(self, pawn, ep);
        }
    }

    fn gen_castling(&self, king: Square, moves: &mut MoveList) {
        let tables = attack_tables();
        let back_rank = if self.turn.is_white() { RANKS[0] } else { RANKS[7] };
        let them = self.turn.opposite();
        let without_king = self.occupied ^ (1u64 << king);

        for rook in squares(self.castling_rights & back_rank & self.us() & self.rooks) {
            if tables.between(king, rook) & self.occupied != 0 {
                continue;
            }

            let king_to = square(if rook < king { 2 } else { 6 }, rank_of(king));
            let king_path = tables.between(king, king_to) | (1u64 << king_to) | (1u64 << king);
            let safe = squares(king_path).all(|sq| self.attacks_to(sq, them, without_king) == 0);
            if safe {
                moves.push_castle(self, king, rook);
            }
        }
    }

    /// Every move the pieces could make ignoring king safety. Used to
    /// cross-check legal generation.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        self.gen_en_passant(&mut moves);
        self.gen_non_king(!self.us(), &mut moves);
        if let Some(king) = self.king(self.turn) {
            for to in squares(attack_tables().king_attacks(king) & !self.us()) {
                moves.push_normal(self, Role::King, king, self.is_occupied(to), to);
            }
            self.gen_castling(king, &mut moves);
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::game_state::chess_types::*;
    use crate::moves::chess_move::{Move, MoveKind};
    use crate::utils::fen_parser::parse_fen;

    fn uci_set(position: &Position) -> HashSet<String> {
        position.legal_moves().iter().map(Move::uci).collect()
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        assert_eq!(Position::new().legal_moves().len(), 20);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let position = parse_fen("4k3/8/3N4/8/8/8/8/4RK2 b - - 0 1").expect("FEN should parse");
        let moves = position.legal_moves();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|mv| mv.role() == Role::King));
    }

    #[test]
    fn single_check_allows_block_or_capture() {
        // Rook on e1 checks the king on e8; the b5 bishop can only interpose on e2.
        let position = parse_fen("4k3/8/8/1b6/8/8/8/4RK2 b - - 0 1").expect("FEN should parse");
        let moves = uci_set(&position);
        assert!(moves.contains("b5e2"));
        assert!(!moves.contains("b5c4"));
    }

    #[test]
    fn pinned_knight_cannot_move() {
        let position = parse_fen("4k3/8/8/8/1b6/8/3N4/4K3 w - - 0 1").expect("FEN should parse");
        assert!(position.legal_moves().iter().all(|mv| mv.role() != Role::Knight));
    }

    #[test]
    fn castling_both_sides_when_path_is_clear() {
        let position = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let castles: Vec<_> = position
            .legal_moves()
            .iter()
            .filter(|mv| matches!(mv.kind, MoveKind::Castling { .. }))
            .map(Move::uci)
            .collect();
        assert_eq!(castles.len(), 2);
        assert!(castles.contains(&"e1g1".to_owned()));
        assert!(castles.contains(&"e1c1".to_owned()));
    }

    #[test]
    fn castling_blocked_through_attacked_square() {
        // Black rook on f8 covers f1.
        let position = parse_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let moves = uci_set(&position);
        assert!(!moves.contains("e1g1"));
        assert!(moves.contains("e1c1"));
    }

    #[test]
    fn en_passant_that_exposes_king_on_rank_is_illegal() {
        // Capturing d5xe6 would clear the fifth rank between the king and rook.
        let position = parse_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").expect("FEN should parse");
        let moves = uci_set(&position);
        assert!(!moves.contains("e5d6"));
    }

    #[test]
    fn en_passant_resolves_pawn_check() {
        // The d5 pawn gives check; capturing it en passant is legal.
        let position = parse_fen("8/8/8/3pP3/4K3/8/8/7k w - d6 0 1").expect("FEN should parse");
        let moves = uci_set(&position);
        assert!(moves.contains("e5d6"));
    }

    #[test]
    fn legal_moves_equal_pseudo_legal_moves_that_keep_king_safe() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ];
        for fen in fens {
            let position = parse_fen(fen).expect("FEN should parse");
            let mover = position.turn();
            let legal: HashSet<Move> = position.legal_moves().into_iter().collect();

            let mut expected = HashSet::new();
            for mv in position.pseudo_legal_moves() {
                let mut next = position.clone();
                next.apply_move(&mv);
                let king = next.king(mover).expect("king stays on the board");
                if next.attacks_to(king, mover.opposite(), next.occupied()) == 0 {
                    expected.insert(mv);
                }
            }
            assert_eq!(legal, expected, "mismatch for {fen}");
        }
    }
}

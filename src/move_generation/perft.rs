use std::thread;

use crate::game_state::chess_types::*;
use crate::moves::chess_move::{Move, MoveKind};
use crate::moves::move_list::MoveList;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Leaf node count at `depth`.
pub fn perft(position: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = position.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .map(|mv| perft(&position.after(mv), depth - 1))
        .sum()
}

/// Leaf counts broken down by move kind, single threaded.
pub fn perft_counts(position: &Position, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut total = PerftCounts::default();
    let mut scratch = MoveList::new();
    for mv in &position.legal_moves() {
        perft_recurse(position, mv, depth, 1, &mut scratch, &mut total);
    }
    total
}

/// Same as `perft_counts`, with one scoped worker per root move.
pub fn perft_counts_parallel(position: &Position, depth: u8) -> PerftCounts {
    if depth <= 1 {
        return perft_counts(position, depth);
    }

    let root_moves = position.legal_moves();
    let mut total = PerftCounts::default();

    thread::scope(|scope| {
        let handles: Vec<_> = root_moves
            .iter()
            .map(|mv| {
                scope.spawn(move || {
                    let mut local = PerftCounts::default();
                    let mut scratch = MoveList::new();
                    perft_recurse(position, mv, depth, 1, &mut scratch, &mut local);
                    local
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(local) => total.merge(local),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    });

    total
}

fn perft_recurse(
    position: &Position,
    mv: &Move,
    search_depth: u8,
    current_depth: u8,
    scratch: &mut MoveList,
    counts: &mut PerftCounts,
) {
    let next = position.after(mv);

    if current_depth == search_depth {
        counts.nodes += 1;
        if mv.is_capture() {
            counts.captures += 1;
        }
        match mv.kind {
            MoveKind::EnPassant { .. } => counts.en_passant += 1,
            MoveKind::Castling { .. } => counts.castles += 1,
            MoveKind::Normal { promotion, .. } if promotion.is_some() => counts.promotions += 1,
            MoveKind::Normal { .. } => {}
        }
        if next.is_check() {
            counts.checks += 1;
            next.legal_moves_into(scratch);
            if scratch.is_empty() {
                counts.checkmates += 1;
            }
        }
        return;
    }

    let children = next.legal_moves();
    for child in &children {
        perft_recurse(&next, child, search_depth, current_depth + 1, scratch, counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_parser::parse_fen;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    #[test]
    fn perft_depth_zero_counts_single_node() {
        assert_eq!(perft(&Position::new(), 0), 1);
        assert_eq!(
            perft_counts(&Position::new(), 0),
            PerftCounts {
                nodes: 1,
                ..PerftCounts::default()
            }
        );
    }

    #[test]
    fn starting_position_node_counts() {
        let position = Position::new();
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8_902);
    }

    #[test]
    fn kiwipete_breakdown() {
        let position = parse_fen(KIWIPETE).expect("FEN should parse");
        assert_eq!(
            perft_counts(&position, 1),
            PerftCounts {
                nodes: 48,
                captures: 8,
                castles: 2,
                ..PerftCounts::default()
            }
        );
        assert_eq!(
            perft_counts_parallel(&position, 2),
            PerftCounts {
                nodes: 2_039,
                captures: 351,
                en_passant: 1,
                castles: 91,
                promotions: 0,
                checks: 3,
                checkmates: 0,
            }
        );
    }

    #[test]
    fn position_3_exercises_en_passant_pins() {
        let position = parse_fen(POSITION_3).expect("FEN should parse");
        assert_eq!(perft(&position, 1), 14);
        assert_eq!(perft(&position, 2), 191);
        let counts = perft_counts(&position, 3);
        assert_eq!(counts.nodes, 2_812);
        assert_eq!(counts.captures, 209);
        assert_eq!(counts.en_passant, 2);
        assert_eq!(counts.checks, 267);
    }
}

//! Reusable move buffer filled by the legal move generator.

use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;

const DEFAULT_CAPACITY: usize = 256;

/// Promotion pieces in generation order.
pub const PROMOTION_ROLES: [Role; 4] = [Role::Queen, Role::Knight, Role::Rook, Role::Bishop];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    moves: Vec<Move>,
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            moves: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Empty the list, keeping its allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn push_normal(
        &mut self,
        position: &Position,
        role: Role,
        from: Square,
        capture: bool,
        to: Square,
    ) {
        self.moves
            .push(Move::normal(position, role, from, capture, to, None));
    }

    /// Push one pawn move per promotion role.
    pub fn push_promotions(&mut self, position: &Position, from: Square, capture: bool, to: Square) {
        for promotion in PROMOTION_ROLES {
            self.moves.push(Move::normal(
                position,
                Role::Pawn,
                from,
                capture,
                to,
                Some(promotion),
            ));
        }
    }

    pub fn push_castle(&mut self, position: &Position, king: Square, rook: Square) {
        self.moves.push(Move::castling(position, king, rook));
    }

    pub fn push_en_passant(&mut self, position: &Position, capturer: Square, to: Square) {
        self.moves.push(Move::en_passant(position, capturer, to));
    }

    /// Sort by ascending score.
    pub fn sort(&mut self) {
        self.moves.sort_by_key(|mv| mv.score);
    }

    pub fn any_match<F: FnMut(&Move) -> bool>(&self, predicate: F) -> bool {
        self.moves.iter().any(predicate)
    }

    pub fn retain<F: FnMut(&Move) -> bool>(&mut self, predicate: F) {
        self.moves.retain(predicate);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotions_push_four_moves_queen_first() {
        let position = Position::empty();
        let mut list = MoveList::new();
        list.push_promotions(&position, 52, false, 60);
        let roles: Vec<Option<Role>> = list.iter().map(|mv| mv.promotion()).collect();
        assert_eq!(
            roles,
            vec![
                Some(Role::Queen),
                Some(Role::Knight),
                Some(Role::Rook),
                Some(Role::Bishop)
            ]
        );
    }

    #[test]
    fn clear_retain_and_sort() {
        let position = Position::new();
        let mut list = MoveList::new();
        list.push_normal(&position, Role::Pawn, 12, false, 28);
        list.push_normal(&position, Role::Pawn, 8, false, 16);
        list.push_normal(&position, Role::Knight, 6, false, 21);
        list.sort();
        assert!(list.as_slice().windows(2).all(|w| w[0].score <= w[1].score));

        list.retain(|mv| mv.role() == Role::Pawn);
        assert_eq!(list.len(), 2);
        assert!(list.any_match(|mv| mv.to() == 28));

        list.clear();
        assert!(list.is_empty());
    }
}

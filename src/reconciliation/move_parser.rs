//! Turns board snapshots into legal moves.
//!
//! The parser keeps every position it has expanded in an arena, root first,
//! and indexes all of them by piece placement. Each confirmed node gets its
//! one-ply expansion added to the index, and earlier generations stay in it.
//! A full board state derived from a dump or a field update is looked up in
//! that index, so it may land on a child of the last confirmed node (a move),
//! on an ancestor (a takeback) or on a sibling of a move confirmed too early
//! (a rook that stopped on its way, or castling done rook first). Anything
//! else is the central-kings result signal or a transient state while a
//! piece is in the air.

use std::collections::HashMap;
use std::ops::Range;

use tracing::{debug, info, trace, Level};

use crate::errors::ReconcileError;
use crate::game_state::chess_types::*;
use crate::game_state::position::Setup;
use crate::moves::chess_move::Move;
use crate::protocol::dgt_constants::PieceCode;
use crate::protocol::messages::{ClockTime, DgtMessage, FieldUpdate};
use crate::reconciliation::game::{Game, PlayedMove};
use crate::utils::san::move_to_san;

pub type NodeId = usize;

#[derive(Debug, Clone)]
struct ReachablePosition {
    position: Position,
    parent: Option<NodeId>,
    via: Option<Move>,
    clock: Option<ClockTime>,
    /// Arena slots of the legal continuations, once expanded.
    children: Option<Range<NodeId>>,
}

#[derive(Debug, Default)]
pub struct MoveParser {
    nodes: Vec<ReachablePosition>,
    /// Every expanded node by placement. A later expansion of the same
    /// placement replaces the earlier entry.
    positions: HashMap<Setup, NodeId>,
    last_confirmed: Option<NodeId>,
    /// Last full physical board, in engine orientation once it is known.
    board_state: Option<Position>,
    rotate: bool,
}

impl MoveParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one decoded board message. Returns a game when the result signal
    /// ends it.
    pub fn got_message(&mut self, message: &DgtMessage) -> Result<Option<Game>, ReconcileError> {
        match message {
            DgtMessage::BoardDump(dump) => {
                let mut state = dump.to_position();
                if self.rotate {
                    state.rotate180();
                }
                Ok(self.update_board(state))
            }
            DgtMessage::FieldUpdate(update) => self.apply_field_update(*update),
            DgtMessage::ClockTime(clock) => {
                self.set_clock(*clock);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Apply a single square change to the last full board.
    pub fn apply_field_update(&mut self, update: FieldUpdate) -> Result<Option<Game>, ReconcileError> {
        let mut state = self
            .board_state
            .clone()
            .ok_or(ReconcileError::FieldUpdateBeforeBoardDump)?;
        let square = if self.rotate { update.square ^ 63 } else { update.square };

        match update.piece {
            PieceCode::Piece(piece) => state.put(square, piece),
            PieceCode::Empty => {
                if !state.is_occupied(square) {
                    return Err(ReconcileError::RemovedFromEmptySquare(square));
                }
                state.discard(square);
            }
            PieceCode::DrawSignal | PieceCode::WhiteWinSignal | PieceCode::BlackWinSignal => {
                state.discard(square)
            }
        }
        Ok(self.update_board(state))
    }

    /// Attach a clock report to the newest confirmed position.
    pub fn set_clock(&mut self, clock: ClockTime) {
        let clock = if self.rotate { clock.rotated() } else { clock };
        if let Some(node) = self.last_confirmed.and_then(|id| self.nodes.get_mut(id)) {
            node.clock = Some(clock);
        }
    }

    /// Handle a new full board state, in engine orientation.
    pub fn update_board(&mut self, state: Position) -> Option<Game> {
        self.board_state = Some(state);
        if self.last_confirmed.is_none() {
            self.detect_initial_position();
            None
        } else {
            self.reconcile()
        }
    }

    fn detect_initial_position(&mut self) {
        let Some(state) = self.board_state.as_mut() else {
            return;
        };
        let standard = Setup::standard();
        if state.setup() == standard {
            self.start_game(false);
        } else if state.setup() == standard.rotate180() {
            state.rotate180();
            self.start_game(true);
        }
    }

    /// Begin a game from the standard setup, discarding any tracked game.
    pub fn start_game(&mut self, rotated: bool) {
        info!(rotated, "initial position");
        self.nodes.clear();
        self.positions.clear();
        let root = Position::new();
        self.positions.insert(root.setup(), 0);
        self.nodes.push(ReachablePosition {
            position: root,
            parent: None,
            via: None,
            clock: None,
            children: None,
        });
        self.last_confirmed = Some(0);
        self.rotate = rotated;
        if self.board_state.is_none() {
            self.board_state = Some(Position::new());
        }
        self.expand(0);
    }

    fn reconcile(&mut self) -> Option<Game> {
        let state = self.board_state.as_ref()?;
        let current = self.last_confirmed?;
        let setup = state.setup();

        if self.nodes[current].position.setup() == setup {
            return None;
        }
        if let Some(&node) = self.positions.get(&setup) {
            self.confirm(current, node);
            return None;
        }
        if let Some(result) = state.result_signal() {
            let game = self.current_game(result);
            info!(result = result.as_pgn(), plies = game.len(), "game finished");
            self.reset();
            return Some(game);
        }

        trace!(pieces = state.occupied().count_ones(), "ignoring unmatched board");
        None
    }

    fn confirm(&mut self, current: NodeId, node: NodeId) {
        if tracing::enabled!(Level::DEBUG) {
            if self.is_ancestor(node, current) {
                debug!(plies = self.depth(current) - self.depth(node), "takeback");
            } else if let (Some(parent), Some(mv)) = (self.nodes[node].parent, self.nodes[node].via) {
                let san = move_to_san(&self.nodes[parent].position, &mv, &self.nodes[node].position);
                let replaced = self.nodes[node].parent != Some(current);
                debug!(%san, ply = self.depth(node), replaced, "move");
            }
        }
        self.last_confirmed = Some(node);
        self.expand(node);
    }

    /// Index the children of `id`, generating them on first use. Children
    /// are laid out in ascending move score.
    fn expand(&mut self, id: NodeId) {
        if let Some(children) = self.nodes[id].children.clone() {
            for child in children {
                self.positions.insert(self.nodes[child].position.setup(), child);
            }
            return;
        }

        let position = self.nodes[id].position.clone();
        let mut moves = position.legal_moves();
        moves.sort();
        let first = self.nodes.len();
        for mv in &moves {
            let after = position.after(mv);
            self.positions.insert(after.setup(), self.nodes.len());
            self.nodes.push(ReachablePosition {
                position: after,
                parent: Some(id),
                via: Some(*mv),
                clock: None,
                children: None,
            });
        }
        self.nodes[id].children = Some(first..self.nodes.len());
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cursor = self.nodes[of].parent;
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.nodes[id].parent;
        }
        false
    }

    fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes[node].parent;
        while let Some(id) = cursor {
            depth += 1;
            cursor = self.nodes[id].parent;
        }
        depth
    }

    /// Flush the tracked game with an unknown result, if one was started.
    pub fn end_game(&mut self) -> Option<Game> {
        self.last_confirmed?;
        let game = self.current_game(GameResult::Unknown);
        info!(plies = game.len(), "game flushed");
        self.reset();
        Some(game)
    }

    /// Moves confirmed so far, root first.
    pub fn current_game(&self, result: GameResult) -> Game {
        let mut moves = Vec::new();
        let mut cursor = self.last_confirmed;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if let (Some(parent), Some(mv)) = (node.parent, node.via) {
                moves.push(PlayedMove {
                    mv,
                    san: move_to_san(&self.nodes[parent].position, &mv, &node.position),
                    clock: node.clock,
                    position: node.position.clone(),
                });
            }
            cursor = node.parent;
        }
        moves.reverse();
        Game::new(moves, result)
    }

    /// Forget the game. The physical board state is kept, turned back to the
    /// board's own orientation.
    pub fn reset(&mut self) {
        if self.rotate {
            if let Some(state) = self.board_state.as_mut() {
                state.rotate180();
            }
        }
        self.nodes.clear();
        self.positions.clear();
        self.last_confirmed = None;
        self.rotate = false;
    }

    pub fn seen_initial_position(&self) -> bool {
        self.last_confirmed.is_some()
    }

    pub fn is_rotated(&self) -> bool {
        self.rotate
    }

    pub fn board_state(&self) -> Option<&Position> {
        self.board_state.as_ref()
    }

    /// Position after the last confirmed move.
    pub fn current_position(&self) -> Option<&Position> {
        self.last_confirmed.map(|id| &self.nodes[id].position)
    }

    /// Nodes held by the arena: every position expanded so far this game.
    pub fn tracked_positions(&self) -> usize {
        self.nodes.len()
    }
}

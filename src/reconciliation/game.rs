//! Finished (or flushed) game records.

use std::fmt::Write as _;

use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;
use crate::protocol::messages::ClockTime;

/// One ply as it was confirmed on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub mv: Move,
    pub san: String,
    /// Last clock report while this move was the newest confirmed one,
    /// already oriented so that left is white.
    pub clock: Option<ClockTime>,
    /// Position after the move.
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub moves: Vec<PlayedMove>,
    pub result: GameResult,
}

impl Game {
    pub fn new(moves: Vec<PlayedMove>, result: GameResult) -> Self {
        Self { moves, result }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn san_moves(&self) -> Vec<&str> {
        self.moves.iter().map(|played| played.san.as_str()).collect()
    }

    /// Movetext in coordinate notation, one move pair per line.
    pub fn uci(&self) -> String {
        self.movetext(|played| (played.mv.uci(), None))
    }

    /// PGN movetext, one move pair per line, ending with the result token.
    ///
    /// With `include_clock`, each move carries a `{[%clk H:MM:SS]}` comment
    /// for the mover's remaining time: the left side for white moves and the
    /// right side for black moves.
    pub fn pgn(&self, include_clock: bool) -> String {
        let mut ply = 0usize;
        self.movetext(|played| {
            let clock = played
                .clock
                .filter(|_| include_clock)
                .map(|clock| {
                    if ply % 2 == 0 {
                        clock.left_time_string()
                    } else {
                        clock.right_time_string()
                    }
                });
            ply += 1;
            (played.san.clone(), clock)
        })
    }

    fn movetext<F>(&self, mut text: F) -> String
    where
        F: FnMut(&PlayedMove) -> (String, Option<String>),
    {
        let mut out = String::new();
        for (ply, played) in self.moves.iter().enumerate() {
            let (notation, clock) = text(played);
            if ply % 2 == 0 {
                let _ = write!(out, "{}. {}", ply / 2 + 1, notation);
            } else {
                let _ = write!(out, " {}", notation);
            }
            if let Some(clock) = clock {
                let _ = write!(out, " {{[%clk {clock}]}}");
            }
            if ply % 2 == 1 {
                out.push('\n');
            }
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push(' ');
        }
        out.push_str(self.result.as_pgn());
        out.push('\n');
        out
    }
}

//! Crate root module declarations for the DGT board recorder.
//!
//! This file exposes the bitboard chess core (position, move generation,
//! attack tables), the board wire protocol (framer, decoders, clock
//! commands), the move reconciliation that turns board snapshots into
//! games, and the notation helpers, so the binary, tests and benches can
//! import stable module paths.

pub mod capture;
pub mod errors;
pub mod recorder;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod position;
    pub mod zobrist;
}

pub mod moves {
    pub mod attack_tables;
    pub mod bitboard;
    pub mod chess_move;
    pub mod move_list;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
}

pub mod protocol {
    pub mod clock_commands;
    pub mod dgt_constants;
    pub mod driver;
    pub mod ee_moves;
    pub mod framer;
    pub mod messages;
}

pub mod reconciliation {
    pub mod ee_replay;
    pub mod game;
    pub mod move_parser;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod pgn;
    pub mod render_position;
    pub mod san;
}

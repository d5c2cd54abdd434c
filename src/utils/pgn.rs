//! PGN output for recorded games.
//!
//! Serializes the tag pairs followed by the game's movetext. Tags are
//! written in the order given.

use std::fmt::Write as _;

use crate::reconciliation::game::Game;

/// The tags written for every recorded game.
pub fn default_headers(game: &Game) -> Vec<(String, String)> {
    vec![
        ("White".to_owned(), "White".to_owned()),
        ("Black".to_owned(), "Black".to_owned()),
        ("Result".to_owned(), game.result.as_pgn().to_owned()),
    ]
}

pub fn write_pgn(game: &Game, headers: &[(String, String)], include_clock: bool) -> String {
    let mut out = String::new();
    for (key, value) in headers {
        let _ = writeln!(out, "[{} \"{}\"]", key, escape_pgn_value(value));
    }
    out.push('\n');
    out.push_str(&game.pgn(include_clock));
    out
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

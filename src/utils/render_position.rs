//! Plain-text board renderer for logs and test output.

use crate::game_state::chess_types::*;

/// Render the board rank 8 first: upper case for white, lower case for
/// black, `.` for an empty square.
pub fn render_position(position: &Position) -> String {
    let mut out = String::with_capacity(8 * 16);

    for rank in (0..8u8).rev() {
        for file in 0..8u8 {
            if file > 0 {
                out.push(' ');
            }
            match position.piece_at(square(file, rank)) {
                Some(piece) => out.push(piece.fen_char()),
                None => out.push('.'),
            }
        }
        out.push('\n');
    }

    out
}

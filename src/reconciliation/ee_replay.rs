//! Games recovered from the board's EEPROM log.

use tracing::{debug, trace, warn};

use crate::game_state::chess_types::*;
use crate::protocol::ee_moves::{EeEvent, SimpleEvent};
use crate::protocol::messages::{ClockTime, FieldUpdate};
use crate::reconciliation::game::Game;
use crate::reconciliation::move_parser::MoveParser;

/// Replay a logged event stream through a fresh move parser per game.
///
/// A begin-position marker starts a game from the standard setup (turned
/// around for the rotated marker). The game ends on the result signal, on
/// end of file, or when the next game begins; the last two flush it with an
/// unknown result.
pub fn replay_ee_events(events: &[EeEvent]) -> Vec<Game> {
    let mut games = Vec::new();
    let mut parser = MoveParser::new();
    let mut clock = ClockTime::default();

    for event in events {
        match *event {
            EeEvent::Simple(SimpleEvent::BeginPos) | EeEvent::Simple(SimpleEvent::BeginPosRotated) => {
                games.extend(parser.end_game());
                parser = MoveParser::new();
                clock = ClockTime::default();
                let mut initial = Position::new();
                if *event == EeEvent::Simple(SimpleEvent::BeginPosRotated) {
                    initial.rotate180();
                }
                parser.update_board(initial);
            }
            EeEvent::Simple(SimpleEvent::Eof) => {
                games.extend(parser.end_game());
            }
            EeEvent::Simple(other) => trace!(?other, "EEPROM event"),
            EeEvent::Field { square, piece } => {
                match parser.apply_field_update(FieldUpdate { square, piece }) {
                    Ok(finished) => games.extend(finished),
                    Err(err) if !parser.seen_initial_position() => {
                        debug!(%err, "field event outside a game")
                    }
                    Err(err) => warn!(%err, "skipping EEPROM field event"),
                }
            }
            EeEvent::Clock { is_left, time } => {
                if is_left {
                    clock.left = time;
                } else {
                    clock.right = time;
                }
                parser.set_clock(clock);
            }
        }
    }

    games.extend(parser.end_game());
    games
}

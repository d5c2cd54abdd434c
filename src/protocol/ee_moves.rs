use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::{ProtocolError, ProtocolResult};
use crate::game_state::chess_types::Square;
use crate::protocol::dgt_constants::{dgt_code_to_square, PieceCode};
use crate::protocol::messages::clock_duration;

/// One-byte markers written to the EEPROM log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleEvent {
    PowerUp,
    Eof,
    FourRows,
    EmptyBoard,
    Downloaded,
    BeginPos,
    BeginPosRotated,
    StartTag,
    WatchdogAction,
    Future1,
    Future2,
    Nop,
}

impl SimpleEvent {
    pub fn from_code(code: u8) -> ProtocolResult<Self> {
        Ok(match code {
            0x6a => SimpleEvent::PowerUp,
            0x6b => SimpleEvent::Eof,
            0x6c => SimpleEvent::FourRows,
            0x6d => SimpleEvent::EmptyBoard,
            0x6e => SimpleEvent::Downloaded,
            0x6f => SimpleEvent::BeginPos,
            0x7a => SimpleEvent::BeginPosRotated,
            0x7b => SimpleEvent::StartTag,
            0x7c => SimpleEvent::WatchdogAction,
            0x7d => SimpleEvent::Future1,
            0x7e => SimpleEvent::Future2,
            0x7f | 0x00 => SimpleEvent::Nop,
            other => return Err(ProtocolError::UnknownSimpleEvent(other)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EeEvent {
    Simple(SimpleEvent),
    Field { square: Square, piece: PieceCode },
    Clock { is_left: bool, time: Duration },
}

/// Decoded EEPROM move log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EeMoves {
    pub events: Vec<EeEvent>,
}

impl EeMoves {
    /// Decode the event stream.
    ///
    /// A truncated trailing event ends the log; the events before it are
    /// kept. Bytes that start no known event are skipped.
    pub fn from_payload(data: &[u8]) -> ProtocolResult<Self> {
        let mut events = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            match next_event(data, offset) {
                Ok((Some(event), consumed)) => {
                    events.push(event);
                    offset += consumed;
                }
                Ok((None, consumed)) => offset += consumed,
                Err(err @ ProtocolError::TruncatedEeEvent { .. }) => {
                    warn!(%err, "EEPROM log ends mid-event");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn next_event(data: &[u8], offset: usize) -> ProtocolResult<(Option<EeEvent>, usize)> {
    let code = data[offset];

    match code {
        0x00 | 0x6a..=0x6f | 0x7a..=0x7f => {
            Ok((Some(EeEvent::Simple(SimpleEvent::from_code(code)?)), 1))
        }
        0x40..=0x5f => {
            let rest = operands(data, offset, 2)?;
            let piece = PieceCode::from_dgt(code & 0x0f)?;
            match dgt_code_to_square(rest[0]) {
                Ok(square) => Ok((Some(EeEvent::Field { square, piece }), 2)),
                Err(err) => {
                    debug!(%err, offset, "skipping EEPROM field event");
                    Ok((None, 2))
                }
            }
        }
        0x60..=0x69 | 0x70..=0x79 => {
            let rest = operands(data, offset, 3)?;
            Ok((
                Some(EeEvent::Clock {
                    is_left: code & 0x10 != 0,
                    time: clock_duration(code & 0x0f, rest[0], rest[1]),
                }),
                3,
            ))
        }
        _ => Ok((None, 1)),
    }
}

/// Bytes following the event code at `offset`, for an event `count` bytes long.
fn operands(data: &[u8], offset: usize, count: usize) -> ProtocolResult<&[u8]> {
    data.get(offset + 1..offset + count)
        .ok_or(ProtocolError::TruncatedEeEvent {
            code: data[offset],
            offset,
        })
}

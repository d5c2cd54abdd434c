//! Errors used throughout the driver and the chess core.
//!
//! Each subsystem gets its own enum so callers can tell a malformed wire
//! message apart from an engine precondition failure:
//! - `ChessError` covers board construction, notation parsing and the
//!   one-time attack table build.
//! - `ProtocolError` covers payload decoding. The framer drops the offending
//!   message and keeps reading.
//! - `ReconcileError` covers board updates that cannot be applied to the
//!   tracked physical board state.
//! - `RecorderError` covers I/O at the edges (input stream, PGN files).

use thiserror::Error;

use crate::game_state::chess_types::Square;

/// Engine-side failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// Bitboards handed to `Position::from_parts` violate the occupancy invariant.
    #[error("inconsistent bitboards: {0}")]
    InconsistentBitboards(String),

    /// The provided FEN string is invalid or could not be parsed.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// The provided algebraic square could not be parsed.
    #[error("invalid algebraic square: {0}")]
    InvalidAlgebraic(String),

    /// Two different attack sets hashed to the same slot of the magic table.
    ///
    /// This means a wrong magic factor and is never recoverable.
    #[error("magic collision for square {square}")]
    MagicCollision { square: Square },

    /// No magic factor could be found for the square within the attempt budget.
    #[error("no magic factor found for square {square}")]
    MagicNotFound { square: Square },
}

pub type ChessResult<T> = Result<T, ChessError>;

/// Failures decoding a single framed message from the board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{message} expects {expected} bytes of data (got {actual})")]
    InvalidLength {
        message: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid square code {0}")]
    InvalidSquareCode(u8),

    #[error("invalid piece code 0x{0:02x}")]
    InvalidPieceCode(u8),

    #[error("unknown message id 0x{0:02x} from board")]
    UnknownMessageId(u8),

    #[error("unknown EEPROM simple event code 0x{0:02x}")]
    UnknownSimpleEvent(u8),

    #[error("EEPROM event 0x{code:02x} truncated at offset {offset}")]
    TruncatedEeEvent { code: u8, offset: usize },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Board updates the move parser cannot apply to its tracked board state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("got a field update before the initial board dump")]
    FieldUpdateBeforeBoardDump,

    #[error("piece removed from empty square {0}")]
    RemovedFromEmptySquare(Square),
}

/// Failures at the I/O edges of the recorder.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RecorderResult<T> = Result<T, RecorderError>;

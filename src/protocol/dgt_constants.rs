//! Wire constants for the DGT board and clock, plus the board-native piece
//! and square code conversions.

use crate::errors::{ProtocolError, ProtocolResult};
use crate::game_state::chess_types::*;

// Message ids from the board (low seven bits of the id byte).
pub const DGT_NONE: u8 = 0x00;
pub const DGT_BOARD_DUMP: u8 = 0x06;
pub const DGT_BWTIME: u8 = 0x0d;
pub const DGT_FIELD_UPDATE: u8 = 0x0e;
pub const DGT_EE_MOVES: u8 = 0x0f;
pub const DGT_BUSADRES: u8 = 0x10;
pub const DGT_SERIALNR: u8 = 0x11;
pub const DGT_TRADEMARK: u8 = 0x12;
pub const DGT_VERSION: u8 = 0x13;
pub const DGT_BOARD_DUMP_50B: u8 = 0x14;
pub const DGT_BOARD_DUMP_50W: u8 = 0x15;
pub const DGT_LONG_SERIALNR: u8 = 0x22;

// Clock command framing.
pub const DGT_CLOCK_MESSAGE: u8 = 0x2b;
pub const DGT_CMD_CLOCK_START_MESSAGE: u8 = 0x03;
pub const DGT_CMD_CLOCK_END_MESSAGE: u8 = 0x00;

pub const DGT_CMD_CLOCK_DISPLAY: u8 = 0x01;
pub const DGT_CMD_CLOCK_ICONS: u8 = 0x02;
pub const DGT_CMD_CLOCK_END: u8 = 0x03;
pub const DGT_CMD_CLOCK_BUTTON: u8 = 0x08;
pub const DGT_CMD_CLOCK_VERSION: u8 = 0x09;
pub const DGT_CMD_CLOCK_SETNRUN: u8 = 0x0a;
pub const DGT_CMD_CLOCK_BEEP: u8 = 0x0b;

/// Single-byte commands sent to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCommand {
    Reset,
    SendClock,
    SendBoard,
    Update,
    UpdateBoard,
    SerialNumber,
    BusAddress,
    Trademark,
    EeMoves,
    BusMode,
    UpdateNice,
    BatteryStatus,
    Version,
    StartBootloader,
    LongSerialNumber,
}

impl BoardCommand {
    pub const fn code(self) -> u8 {
        match self {
            BoardCommand::Reset => 0x40,
            BoardCommand::SendClock => 0x41,
            BoardCommand::SendBoard => 0x42,
            BoardCommand::Update => 0x43,
            BoardCommand::UpdateBoard => 0x44,
            BoardCommand::SerialNumber => 0x45,
            BoardCommand::BusAddress => 0x46,
            BoardCommand::Trademark => 0x47,
            BoardCommand::EeMoves => 0x49,
            BoardCommand::BusMode => 0x4a,
            BoardCommand::UpdateNice => 0x4b,
            BoardCommand::BatteryStatus => 0x4c,
            BoardCommand::Version => 0x4d,
            BoardCommand::StartBootloader => 0x4e,
            BoardCommand::LongSerialNumber => 0x55,
        }
    }
}

/// Contents of one board square as reported by the board.
///
/// The three signal codes are special pieces placed on the board to
/// announce a result; they carry no chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceCode {
    Empty,
    Piece(Piece),
    DrawSignal,
    WhiteWinSignal,
    BlackWinSignal,
}

impl PieceCode {
    pub fn from_dgt(code: u8) -> ProtocolResult<Self> {
        use Color::{Black, White};
        use Role::*;

        let piece = |color: Color, role: Role| -> ProtocolResult<PieceCode> {
            Ok(PieceCode::Piece(Piece::new(color, role)))
        };
        match code {
            0x00 => Ok(PieceCode::Empty),
            0x01 => piece(White, Pawn),
            0x02 => piece(White, Rook),
            0x03 => piece(White, Knight),
            0x04 => piece(White, Bishop),
            0x05 => piece(White, King),
            0x06 => piece(White, Queen),
            0x07 => piece(Black, Pawn),
            0x08 => piece(Black, Rook),
            0x09 => piece(Black, Knight),
            0x0a => piece(Black, Bishop),
            0x0b => piece(Black, King),
            0x0c => piece(Black, Queen),
            0x0d => Ok(PieceCode::DrawSignal),
            0x0e => Ok(PieceCode::WhiteWinSignal),
            0x0f => Ok(PieceCode::BlackWinSignal),
            other => Err(ProtocolError::InvalidPieceCode(other)),
        }
    }

    pub fn to_dgt(self) -> u8 {
        match self {
            PieceCode::Empty => 0x00,
            PieceCode::Piece(Piece { color, role }) => {
                let base = match role {
                    Role::Pawn => 0x01,
                    Role::Rook => 0x02,
                    Role::Knight => 0x03,
                    Role::Bishop => 0x04,
                    Role::King => 0x05,
                    Role::Queen => 0x06,
                };
                if color.is_white() {
                    base
                } else {
                    base + 6
                }
            }
            PieceCode::DrawSignal => 0x0d,
            PieceCode::WhiteWinSignal => 0x0e,
            PieceCode::BlackWinSignal => 0x0f,
        }
    }

    /// The chess piece, if any. Signal codes read as an empty square.
    pub fn piece(self) -> Option<Piece> {
        match self {
            PieceCode::Piece(piece) => Some(piece),
            _ => None,
        }
    }
}

/// Board-native square code (a8 = 0, h8 = 7, a7 = 8, ..., h1 = 63) to
/// engine square (a1 = 0).
pub fn dgt_code_to_square(code: u8) -> ProtocolResult<Square> {
    if code >= 64 {
        return Err(ProtocolError::InvalidSquareCode(code));
    }
    Ok(square(code % 8, 7 - code / 8))
}

pub fn square_to_dgt_code(square: Square) -> u8 {
    (7 - rank_of(square)) * 8 + file_of(square)
}

//! Typed payloads of the messages the board sends.
//!
//! Every decoder is a pure function of the payload slice (the frame minus
//! its 3-byte header) and reports a malformed payload as a `ProtocolError`.

use std::fmt;
use std::time::Duration;

use crate::errors::{ProtocolError, ProtocolResult};
use crate::game_state::chess_types::*;
use crate::protocol::dgt_constants::*;
use crate::protocol::ee_moves::EeMoves;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DgtMessage {
    BoardDump(BoardDump),
    FieldUpdate(FieldUpdate),
    ClockTime(ClockTime),
    ClockAck(ClockAck),
    EeMoves(EeMoves),
    BusAddress(u16),
    SerialNumber(String),
    LongSerialNumber(String),
    Trademark(String),
    Version(Version),
}

/// Decode one framed payload by message id.
///
/// `Ok(None)` means the message is valid but carries nothing for callers:
/// the empty message, draughts dumps and the all-zero clock heartbeat.
pub fn decode_message(id: u8, data: &[u8]) -> ProtocolResult<Option<DgtMessage>> {
    let message = match id {
        DGT_NONE | DGT_BOARD_DUMP_50B | DGT_BOARD_DUMP_50W => return Ok(None),
        DGT_BOARD_DUMP => DgtMessage::BoardDump(BoardDump::from_payload(data)?),
        DGT_BWTIME => {
            expect_len("ClockTime", data, 7)?;
            if data[0] & 0x0f == 0x0a || data[3] & 0x0f == 0x0a {
                DgtMessage::ClockAck(ClockAck::from_payload(data)?)
            } else if data.iter().all(|&b| b == 0) {
                return Ok(None);
            } else {
                DgtMessage::ClockTime(ClockTime::from_payload(data)?)
            }
        }
        DGT_FIELD_UPDATE => DgtMessage::FieldUpdate(FieldUpdate::from_payload(data)?),
        DGT_EE_MOVES => DgtMessage::EeMoves(EeMoves::from_payload(data)?),
        DGT_BUSADRES => {
            expect_len("BusAddress", data, 2)?;
            DgtMessage::BusAddress((u16::from(data[0]) << 7) | u16::from(data[1]))
        }
        DGT_SERIALNR => DgtMessage::SerialNumber(ascii_text(data)),
        DGT_LONG_SERIALNR => DgtMessage::LongSerialNumber(ascii_text(data)),
        DGT_TRADEMARK => DgtMessage::Trademark(ascii_text(data)),
        DGT_VERSION => DgtMessage::Version(Version::from_payload(data)?),
        other => return Err(ProtocolError::UnknownMessageId(other)),
    };
    Ok(Some(message))
}

pub(crate) fn expect_len(message: &'static str, data: &[u8], expected: usize) -> ProtocolResult<()> {
    if data.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::InvalidLength {
            message,
            expected,
            actual: data.len(),
        })
    }
}

fn ascii_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_owned()
}

#[inline]
pub(crate) fn decode_bcd(byte: u8) -> u64 {
    u64::from(byte >> 4) * 10 + u64::from(byte & 0x0f)
}

pub(crate) fn clock_duration(hours: u8, minutes: u8, seconds: u8) -> Duration {
    Duration::from_secs(u64::from(hours) * 3600 + decode_bcd(minutes) * 60 + decode_bcd(seconds))
}

/// `H:MM:SS`, as used in `[%clk]` annotations.
pub fn format_clock(time: Duration) -> String {
    let total = time.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Full board contents, indexed by engine square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardDump {
    squares: [PieceCode; 64],
}

impl BoardDump {
    pub fn from_payload(data: &[u8]) -> ProtocolResult<Self> {
        expect_len("BoardDump", data, 64)?;
        let mut squares = [PieceCode::Empty; 64];
        for (code, &piece) in data.iter().enumerate() {
            squares[dgt_code_to_square(code as u8)? as usize] = PieceCode::from_dgt(piece)?;
        }
        Ok(Self { squares })
    }

    /// Dump the board would send for `position`.
    pub fn from_position(position: &Position) -> Self {
        let mut squares = [PieceCode::Empty; 64];
        for (sq, piece) in position.pieces() {
            squares[sq as usize] = PieceCode::Piece(piece);
        }
        Self { squares }
    }

    /// Payload bytes in board-native square order.
    pub fn to_payload(&self) -> [u8; 64] {
        let mut data = [0u8; 64];
        for (sq, code) in (0u8..).zip(self.squares.iter()) {
            data[square_to_dgt_code(sq) as usize] = code.to_dgt();
        }
        data
    }

    #[inline]
    pub fn code_at(&self, square: Square) -> PieceCode {
        self.squares[square as usize]
    }

    pub fn set_code(&mut self, square: Square, code: PieceCode) {
        self.squares[square as usize] = code;
    }

    /// Chess pieces on the board. Signal pieces are left out.
    pub fn to_position(&self) -> Position {
        let mut position = Position::empty();
        for (sq, code) in (0u8..).zip(self.squares.iter()) {
            if let Some(piece) = code.piece() {
                position.put(sq, piece);
            }
        }
        position
    }
}

/// One square changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldUpdate {
    pub square: Square,
    pub piece: PieceCode,
}

impl FieldUpdate {
    pub fn from_payload(data: &[u8]) -> ProtocolResult<Self> {
        expect_len("FieldUpdate", data, 2)?;
        Ok(Self {
            square: dgt_code_to_square(data[0])?,
            piece: PieceCode::from_dgt(data[1])?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub fn from_payload(data: &[u8]) -> ProtocolResult<Self> {
        expect_len("Version", data, 2)?;
        Ok(Self {
            major: data[0],
            minor: data[1],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Clock state. The clock only knows a left and a right player; which one
/// is white is decided by the board orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTime {
    pub left: Duration,
    pub left_flags: u8,
    pub right: Duration,
    pub right_flags: u8,
    pub status: u8,
}

const FLAG_FINAL: u8 = 0x01;
const FLAG_TIME_PER_MOVE: u8 = 0x02;
const FLAG_FLAG: u8 = 0x04;

const STATUS_RUNNING: u8 = 0x01;
const STATUS_RIGHT_HIGH: u8 = 0x02;
const STATUS_BATTERY_LOW: u8 = 0x04;
const STATUS_LEFT_TO_MOVE: u8 = 0x08;
const STATUS_RIGHT_TO_MOVE: u8 = 0x10;
const STATUS_CONNECTED: u8 = 0x20;

impl ClockTime {
    pub fn from_payload(data: &[u8]) -> ProtocolResult<Self> {
        expect_len("ClockTime", data, 7)?;
        Ok(Self {
            right_flags: data[0] >> 4,
            right: clock_duration(data[0] & 0x0f, data[1], data[2]),
            left_flags: data[3] >> 4,
            left: clock_duration(data[3] & 0x0f, data[4], data[5]),
            status: data[6],
        })
    }

    /// Swap sides, as seen from the other end of the board.
    pub fn rotated(&self) -> Self {
        Self {
            left: self.right,
            left_flags: self.right_flags,
            right: self.left,
            right_flags: self.left_flags,
            status: self.status ^ (STATUS_RIGHT_HIGH | STATUS_LEFT_TO_MOVE | STATUS_RIGHT_TO_MOVE),
        }
    }

    pub fn left_time_string(&self) -> String {
        format_clock(self.left)
    }

    pub fn right_time_string(&self) -> String {
        format_clock(self.right)
    }

    pub fn left_final_flag(&self) -> bool {
        self.left_flags & FLAG_FINAL != 0
    }

    pub fn left_time_per_move(&self) -> bool {
        self.left_flags & FLAG_TIME_PER_MOVE != 0
    }

    pub fn left_flag(&self) -> bool {
        self.left_flags & FLAG_FLAG != 0
    }

    pub fn right_final_flag(&self) -> bool {
        self.right_flags & FLAG_FINAL != 0
    }

    pub fn right_time_per_move(&self) -> bool {
        self.right_flags & FLAG_TIME_PER_MOVE != 0
    }

    pub fn right_flag(&self) -> bool {
        self.right_flags & FLAG_FLAG != 0
    }

    pub fn clock_running(&self) -> bool {
        self.status & STATUS_RUNNING != 0
    }

    /// Lever high on the left side.
    pub fn left_high(&self) -> bool {
        self.status & STATUS_RIGHT_HIGH == 0
    }

    pub fn right_high(&self) -> bool {
        self.status & STATUS_RIGHT_HIGH != 0
    }

    pub fn battery_low(&self) -> bool {
        self.status & STATUS_BATTERY_LOW != 0
    }

    pub fn left_to_move(&self) -> bool {
        self.status & STATUS_LEFT_TO_MOVE != 0
    }

    pub fn right_to_move(&self) -> bool {
        self.status & STATUS_RIGHT_TO_MOVE != 0
    }

    pub fn clock_connected(&self) -> bool {
        self.status & STATUS_CONNECTED != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Back,
    Plus,
    Run,
    Minus,
    Ok,
}

/// Acknowledgement of a clock command, sent under the clock-time id.
///
/// The four ack bytes are spread over the 7-byte payload with their high
/// bits packed into bytes 0 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAck {
    pub ack0: u8,
    pub ack1: u8,
    pub ack2: u8,
    pub ack3: u8,
}

impl ClockAck {
    pub fn from_payload(data: &[u8]) -> ProtocolResult<Self> {
        expect_len("ClockAck", data, 7)?;
        Ok(Self {
            ack0: (data[1] & 0x7f) | ((data[3] << 3) & 0x80),
            ack1: (data[2] & 0x7f) | ((data[3] << 2) & 0x80),
            ack2: (data[4] & 0x7f) | ((data[0] << 3) & 0x80),
            ack3: (data[5] & 0x7f) | ((data[0] << 2) & 0x80),
        })
    }

    pub fn is_error(&self) -> bool {
        self.ack0 == 0x40
    }

    pub fn is_auto_generated(&self) -> bool {
        self.ack1 & 0x80 != 0
    }

    pub fn is_ready(&self) -> bool {
        self.ack1 == 0x81
    }

    pub fn button_pressed(&self) -> Option<Button> {
        match self.ack3 {
            0x31 => Some(Button::Back),
            0x32 => Some(Button::Plus),
            0x33 => Some(Button::Run),
            0x34 => Some(Button::Minus),
            0x35 => Some(Button::Ok),
            _ => None,
        }
    }

    pub fn is_display_ack(&self) -> bool {
        self.ack1 == DGT_CMD_CLOCK_DISPLAY
    }

    pub fn is_button_ack(&self) -> bool {
        self.ack1 == DGT_CMD_CLOCK_BUTTON
    }

    pub fn is_version_ack(&self) -> bool {
        self.ack1 == DGT_CMD_CLOCK_VERSION
    }

    pub fn is_set_n_run_ack(&self) -> bool {
        self.ack1 == DGT_CMD_CLOCK_SETNRUN
    }

    pub fn is_beep_ack(&self) -> bool {
        self.ack1 == DGT_CMD_CLOCK_BEEP
    }

    /// `[major, minor]` of the clock firmware, valid on a version ack.
    pub fn clock_version(&self) -> [u8; 2] {
        [self.ack2 >> 4, self.ack2 & 0x0f]
    }
}

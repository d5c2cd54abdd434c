//! Commands sent to the clock through the board.
//!
//! Every command is wrapped as
//! `[0x2b][payload + 3][0x03][command id][payload...][0x00]`.

use std::ops::BitOr;
use std::time::Duration;

use crate::protocol::dgt_constants::*;

/// Segments of one seven-segment digit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SevenSegment(pub u8);

impl SevenSegment {
    pub const BLANK: Self = Self(0x00);
    pub const TOP: Self = Self(0x01);
    pub const RIGHT_TOP: Self = Self(0x02);
    pub const RIGHT_BOTTOM: Self = Self(0x04);
    pub const BOTTOM: Self = Self(0x08);
    pub const LEFT_BOTTOM: Self = Self(0x10);
    pub const LEFT_TOP: Self = Self(0x20);
    pub const CENTER: Self = Self(0x40);

    /// Segments lit for a decimal digit. Anything above 9 is blank.
    pub const fn digit(value: u8) -> Self {
        Self(match value {
            0 => 0x3f,
            1 => 0x06,
            2 => 0x5b,
            3 => 0x4f,
            4 => 0x66,
            5 => 0x6d,
            6 => 0x7d,
            7 => 0x07,
            8 => 0x7f,
            9 => 0x6f,
            _ => 0x00,
        })
    }
}

impl BitOr for SevenSegment {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Dots, colons and leading ones between the digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DotsAndOnes(pub u8);

impl DotsAndOnes {
    pub const NONE: Self = Self(0x00);
    pub const RIGHT_DOT: Self = Self(0x01);
    pub const RIGHT_SEMICOLON: Self = Self(0x02);
    pub const RIGHT_ONE: Self = Self(0x04);
    pub const LEFT_DOT: Self = Self(0x08);
    pub const LEFT_SEMICOLON: Self = Self(0x10);
    pub const LEFT_ONE: Self = Self(0x20);
}

impl BitOr for DotsAndOnes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Icons shown on one side of the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Icons {
    pub time: bool,
    pub fisch: bool,
    pub delay: bool,
    pub hourglass: bool,
    pub up_count: bool,
    pub byo: bool,
    pub end: bool,
    pub periods: [bool; 5],
    pub flag: bool,
}

impl Icons {
    pub fn byte1(&self) -> u8 {
        pack(&[
            self.time,
            self.fisch,
            self.delay,
            self.hourglass,
            self.up_count,
            self.byo,
            self.end,
        ])
    }

    pub fn byte2(&self) -> u8 {
        pack(&self.periods) | if self.flag { 0x20 } else { 0 }
    }
}

/// Icons not tied to either side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneralIcons {
    pub clear: bool,
    pub sound: bool,
    pub black_white: bool,
    pub white_black: bool,
    pub battery: bool,
    pub remain: bool,
}

impl GeneralIcons {
    pub fn value(&self) -> u8 {
        pack(&[
            self.clear,
            self.sound,
            self.black_white,
            self.white_black,
            self.battery,
        ]) | if self.remain { 0x40 } else { 0 }
    }
}

/// Bit `i` set for each true flag at index `i`.
fn pack(flags: &[bool]) -> u8 {
    flags
        .iter()
        .enumerate()
        .filter(|&(_, &set)| set)
        .fold(0, |acc, (bit, _)| acc | (1 << bit))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockCommand {
    /// Six digits, `a` leftmost.
    Display {
        a: SevenSegment,
        b: SevenSegment,
        c: SevenSegment,
        d: SevenSegment,
        e: SevenSegment,
        f: SevenSegment,
        dots: DotsAndOnes,
        beep: bool,
    },
    Icons {
        left: Icons,
        right: Icons,
        general: GeneralIcons,
    },
    /// Return the clock to its own display.
    End,
    Button,
    Version,
    SetAndRun {
        left: Duration,
        left_counts_up: bool,
        right: Duration,
        right_counts_up: bool,
        pause: bool,
        toggle_on_lever: bool,
    },
    /// Beep for `duration` units of 64 ms.
    Beep { duration: u8 },
}

impl ClockCommand {
    pub fn id(&self) -> u8 {
        match self {
            ClockCommand::Display { .. } => DGT_CMD_CLOCK_DISPLAY,
            ClockCommand::Icons { .. } => DGT_CMD_CLOCK_ICONS,
            ClockCommand::End => DGT_CMD_CLOCK_END,
            ClockCommand::Button => DGT_CMD_CLOCK_BUTTON,
            ClockCommand::Version => DGT_CMD_CLOCK_VERSION,
            ClockCommand::SetAndRun { .. } => DGT_CMD_CLOCK_SETNRUN,
            ClockCommand::Beep { .. } => DGT_CMD_CLOCK_BEEP,
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        match *self {
            ClockCommand::Display {
                a,
                b,
                c,
                d,
                e,
                f,
                dots,
                beep,
            } => vec![
                c.0,
                b.0,
                a.0,
                f.0,
                e.0,
                d.0,
                dots.0,
                if beep { 0x03 } else { 0x01 },
            ],
            ClockCommand::Icons {
                left,
                right,
                general,
            } => vec![
                left.byte1(),
                right.byte1(),
                left.byte2(),
                right.byte2(),
                general.value(),
                0x00,
            ],
            ClockCommand::End | ClockCommand::Button | ClockCommand::Version => Vec::new(),
            ClockCommand::SetAndRun {
                left,
                left_counts_up,
                right,
                right_counts_up,
                pause,
                toggle_on_lever,
            } => {
                let mut payload = Vec::with_capacity(7);
                payload.extend(side_time(left, left_counts_up));
                payload.extend(side_time(right, right_counts_up));
                let mut flags = 0;
                if !left_counts_up {
                    flags |= 0x01;
                }
                if !right_counts_up {
                    flags |= 0x02;
                }
                if pause {
                    flags |= 0x04;
                }
                if toggle_on_lever {
                    flags |= 0x08;
                }
                payload.push(flags);
                payload
            }
            ClockCommand::Beep { duration } => vec![duration],
        }
    }

    /// Complete frame ready for the transport.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = self.payload();
        let mut bytes = Vec::with_capacity(payload.len() + 5);
        bytes.push(DGT_CLOCK_MESSAGE);
        bytes.push((payload.len() + 3) as u8);
        bytes.push(DGT_CMD_CLOCK_START_MESSAGE);
        bytes.push(self.id());
        bytes.extend_from_slice(&payload);
        bytes.push(DGT_CMD_CLOCK_END_MESSAGE);
        bytes
    }
}

/// Hours (with the count-up bit), minutes and seconds as plain binary.
fn side_time(time: Duration, counts_up: bool) -> [u8; 3] {
    let total = time.as_secs();
    let hours = (total / 3600).min(0x0f) as u8;
    [
        hours | if counts_up { 0x10 } else { 0 },
        ((total / 60) % 60) as u8,
        (total % 60) as u8,
    ]
}

//! Canonical chess-rule constants.
//!
//! Standard setup bitboards, the starting FEN, and the central squares used by
//! the king-placement convention for signalling a finished game.

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const START_PAWNS: u64 = 0x00ff_0000_0000_ff00;
pub const START_KNIGHTS: u64 = 0x4200_0000_0000_0042;
pub const START_BISHOPS: u64 = 0x2400_0000_0000_0024;
pub const START_ROOKS: u64 = 0x8100_0000_0000_0081;
pub const START_QUEENS: u64 = 0x0800_0000_0000_0008;
pub const START_KINGS: u64 = 0x1000_0000_0000_0010;
pub const START_WHITE: u64 = 0x0000_0000_0000_ffff;
pub const START_BLACK: u64 = 0xffff_0000_0000_0000;

pub const D4: u64 = 1 << 27;
pub const E4: u64 = 1 << 28;
pub const D5: u64 = 1 << 35;
pub const E5: u64 = 1 << 36;
pub const CENTRAL_SQUARES: u64 = D4 | D5 | E4 | E5;

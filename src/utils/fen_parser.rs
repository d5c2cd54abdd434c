//! FEN-to-Position parser.
//!
//! Builds a validated `Position` from a Forsyth-Edwards Notation string.
//! Move counters are checked for shape but not stored; the driver has no use
//! for them.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::game_state::position::Setup;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> ChessResult<Position> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side-to-move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;

    for counter in parts.by_ref().take(2) {
        counter
            .parse::<u16>()
            .map_err(|_| invalid(&format!("invalid move counter: {counter}")))?;
    }
    if parts.next().is_some() {
        return Err(invalid("FEN has extra trailing fields"));
    }

    let setup = parse_board(board_part)?;
    let turn = parse_side_to_move(side_part)?;
    let castling_rights = parse_castling_rights(castling_part, &setup)?;
    let ep_square = parse_en_passant_square(en_passant_part)?;

    Position::from_parts(setup, turn, ep_square, castling_rights)
}

fn invalid(reason: &str) -> ChessError {
    ChessError::InvalidFen(reason.to_owned())
}

fn parse_board(board_part: &str) -> ChessResult<Setup> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    let mut position = Position::empty();

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(&format!("invalid empty-square count '{ch}'")));
                }
                file += empty_count as u8;
                continue;
            }

            let piece = piece_from_fen_char(ch)
                .ok_or_else(|| invalid(&format!("invalid piece character '{ch}'")))?;

            if file >= 8 {
                return Err(invalid("board rank has too many files"));
            }

            position.put(square(file, board_rank), piece);
            file += 1;
        }

        if file != 8 {
            return Err(invalid("board rank does not sum to 8 files"));
        }
    }

    Ok(position.setup())
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(&format!("invalid side-to-move field: {side_part}"))),
    }
}

/// Rights are stored as rook origin squares; a right whose rook is missing
/// is dropped.
fn parse_castling_rights(castling_part: &str, setup: &Setup) -> ChessResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;
    for ch in castling_part.chars() {
        let (rook_square, color_bb) = match ch {
            'K' => (7, setup.white),
            'Q' => (0, setup.white),
            'k' => (63, setup.black),
            'q' => (56, setup.black),
            _ => return Err(invalid(&format!("invalid castling rights character: {ch}"))),
        };
        if setup.rooks & color_bb & (1u64 << rook_square) != 0 {
            rights |= 1u64 << rook_square;
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    algebraic_to_square(en_passant_part)
        .map(Some)
        .map_err(|_| invalid(&format!("invalid en-passant square: {en_passant_part}")))
}

fn piece_from_fen_char(ch: char) -> Option<Piece> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else if ch.is_ascii_lowercase() {
        Color::Black
    } else {
        return None;
    };

    let role = match ch.to_ascii_lowercase() {
        'p' => Role::Pawn,
        'n' => Role::Knight,
        'b' => Role::Bishop,
        'r' => Role::Rook,
        'q' => Role::Queen,
        'k' => Role::King,
        _ => return None,
    };

    Some(Piece::new(color, role))
}

use crate::game_state::chess_types::*;
use crate::utils::algebraic::square_to_algebraic;

/// FEN for a position. Move counters are not tracked and print as `0 1`.
pub fn generate_fen(position: &Position) -> String {
    let side_to_move = match position.turn() {
        Color::White => "w",
        Color::Black => "b",
    };
    let en_passant = position
        .ep_square()
        .and_then(|sq| square_to_algebraic(sq).ok())
        .unwrap_or_else(|| "-".to_owned());

    format!(
        "{} {} {} {} 0 1",
        generate_board_field(position),
        side_to_move,
        generate_castling_field(position.castling_rights()),
        en_passant
    )
}

pub fn generate_board_field(position: &Position) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            if let Some(piece) = position.piece_at(square(file, rank)) {
                if empty_count > 0 {
                    out.push(char::from(b'0' + empty_count));
                    empty_count = 0;
                }
                out.push(piece.fen_char());
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(rights: CastlingRights) -> String {
    let mut out = String::new();

    for (rook_square, ch) in [(7u8, 'K'), (0, 'Q'), (63, 'k'), (56, 'q')] {
        if rights & (1u64 << rook_square) != 0 {
            out.push(ch);
        }
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::generate_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::*;
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn round_trip_starting_position_fen() {
        let parsed = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        let generated = generate_fen(&parsed);

        assert_eq!(generated, STARTING_POSITION_FEN);
        assert_eq!(generate_fen(&Position::new()), STARTING_POSITION_FEN);
    }

    #[test]
    fn round_trip_custom_position_fen() {
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 0 1";
        let parsed = parse_fen(fen).expect("custom FEN should parse");
        let generated = generate_fen(&parsed);
        let reparsed = parse_fen(&generated).expect("generated FEN should parse");

        assert_eq!(generated, fen);
        assert_eq!(reparsed, parsed);
        assert_eq!(reparsed.turn(), Color::Black);
        assert_eq!(reparsed.castling_rights(), (1 << 56) | (1 << 63));
    }

    #[test]
    fn en_passant_square_is_written() {
        let fen = "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1";
        let parsed = parse_fen(fen).expect("FEN should parse");
        assert_eq!(generate_fen(&parsed), fen);
    }
}

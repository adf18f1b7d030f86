//! Position-to-FEN encoder. Output is canonical: castling letters in `KQkq`
//! order, lowercase en-passant square, runs of empty squares collapsed.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::notation::algebraic::square_name;

pub fn generate_fen(position: &Position) -> String {
    let side_to_move = match position.side_to_move() {
        Color::Light => "w",
        Color::Dark => "b",
    };
    let en_passant = position
        .en_passant_square()
        .map_or_else(|| "-".to_owned(), square_name);

    format!(
        "{} {} {} {} {} {}",
        generate_board_field(position),
        side_to_move,
        generate_castling_field(position.castling_rights()),
        en_passant,
        position.halfmove_clock(),
        position.fullmove_number()
    )
}

fn generate_board_field(position: &Position) -> String {
    let mut out = String::with_capacity(64);

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            match position.piece_at(make_square(file, rank)) {
                Some((color, piece)) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece_to_fen_char(color, piece));
                }
                None => empty_count += 1,
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

pub(crate) fn piece_to_fen_char(color: Color, piece: PieceKind) -> char {
    let upper = piece.san_letter().unwrap_or('P');
    match color {
        Color::Light => upper,
        Color::Dark => upper.to_ascii_lowercase(),
    }
}

fn generate_castling_field(rights: CastlingRights) -> String {
    let out: String = [
        (CASTLE_LIGHT_KINGSIDE, 'K'),
        (CASTLE_LIGHT_QUEENSIDE, 'Q'),
        (CASTLE_DARK_KINGSIDE, 'k'),
        (CASTLE_DARK_QUEENSIDE, 'q'),
    ]
    .into_iter()
    .filter(|(right, _)| rights & right != 0)
    .map(|(_, letter)| letter)
    .collect();

    if out.is_empty() {
        "-".to_owned()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::seq::IndexedRandom;
    use rand::SeedableRng;

    use super::generate_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{
        Color, PieceKind, CASTLE_DARK_KINGSIDE, CASTLE_DARK_QUEENSIDE,
    };
    use crate::game_state::position::Position;
    use crate::move_generation::legal_move_apply::apply;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn round_trip_starting_position_fen() {
        let parsed = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        let generated = generate_fen(&parsed);

        assert_eq!(generated, STARTING_POSITION_FEN);
        assert_eq!(parse_fen(&generated).expect("generated FEN should parse"), parsed);
    }

    #[test]
    fn round_trip_custom_position_fen() {
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 4 6";
        let parsed = parse_fen(fen).expect("custom FEN should parse");

        assert_eq!(generate_fen(&parsed), fen);
        assert_eq!(parsed.side_to_move(), Color::Dark);
        assert_eq!(
            parsed.castling_rights(),
            CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE
        );
        assert_eq!(parsed.halfmove_clock(), 4);
        assert_eq!(parsed.fullmove_number(), 6);
    }

    fn assert_round_trips(position: &Position) {
        let fen = generate_fen(position);
        let decoded = parse_fen(&fen).expect("generated FEN should parse");
        assert_eq!(&decoded, position, "{fen}");
        assert_eq!(generate_fen(&decoded), fen);
    }

    fn assert_one_king_each(position: &Position) {
        for color in [Color::Light, Color::Dark] {
            assert_eq!(
                position.pieces(color, PieceKind::King).count_ones(),
                1,
                "{color:?} king count in {position}"
            );
        }
    }

    #[test]
    fn castling_and_promotion_results_round_trip() {
        for fen in [
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1",
            "1n2k3/P7/8/8/8/8/7p/4K1N1 w - - 0 1",
            "1n2k3/P7/8/8/8/8/7p/4K1N1 b - - 0 1",
        ] {
            let before = parse_fen(fen).expect("FEN should parse");
            for mv in legal_moves(&before) {
                let after = apply(&before, &mv);
                assert_one_king_each(&after);
                assert_round_trips(&after);
            }
        }
    }

    #[test]
    fn random_playouts_keep_kings_and_round_trip() {
        let mut rng = StdRng::seed_from_u64(0xF3E_2024);

        for _ in 0..40 {
            let mut board = Position::new_game();
            for _ in 0..150 {
                let moves = legal_moves(&board);
                let Some(chosen) = moves.choose(&mut rng) else {
                    break;
                };
                board = apply(&board, chosen);
                assert_one_king_each(&board);
                assert_round_trips(&board);
            }
        }
    }

    #[test]
    fn en_passant_square_is_written_lowercase() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let parsed = parse_fen(fen).expect("FEN should parse");
        assert_eq!(generate_fen(&parsed), fen);
    }
}

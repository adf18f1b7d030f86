//! FEN-to-Position parser.
//!
//! Builds a fully-populated position from a Forsyth-Edwards Notation string,
//! including piece bitboards, rights, clocks and occupancies. Positions
//! without exactly one king per side are rejected since no rule in the crate
//! is defined for them.

use crate::errors::FenError;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::notation::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(FenError::MissingField("board layout"))?;
    let side_part = parts.next().ok_or(FenError::MissingField("side-to-move"))?;
    let castling_part = parts.next().ok_or(FenError::MissingField("castling rights"))?;
    let en_passant_part = parts.next().ok_or(FenError::MissingField("en-passant square"))?;
    let halfmove_part = parts.next().ok_or(FenError::MissingField("halfmove clock"))?;
    let fullmove_part = parts.next().ok_or(FenError::MissingField("fullmove number"))?;

    if let Some(extra) = parts.next() {
        return Err(FenError::TrailingField(extra.to_owned()));
    }

    let mut position = Position::empty();

    parse_board(board_part, &mut position)?;
    position.side_to_move = parse_side_to_move(side_part)?;
    position.castling_rights = parse_castling_rights(castling_part)?;
    position.en_passant_square = parse_en_passant_square(en_passant_part)?;
    check_en_passant_square(&position, en_passant_part)?;
    position.halfmove_clock = parse_counter("halfmove clock", halfmove_part)?;
    position.fullmove_number = parse_counter("fullmove number", fullmove_part)?;
    position.refresh_occupancy();

    for (color, label) in [(Color::Light, "white"), (Color::Dark, "black")] {
        let count = position.pieces(color, PieceKind::King).count_ones();
        if count != 1 {
            return Err(FenError::KingCount { color: label, count });
        }
    }

    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> Result<(), FenError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::Board(format!(
            "expected 8 ranks, found {}",
            ranks.len()
        )));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(FenError::Board(format!("invalid empty-square count '{ch}'")));
                }
                file += empty_count as u8;
                if file > 8 {
                    return Err(FenError::Board(format!("rank '{rank_str}' has too many files")));
                }
                continue;
            }

            let (color, piece) = piece_from_fen_char(ch)
                .ok_or_else(|| FenError::Board(format!("invalid piece character '{ch}'")))?;

            if file >= 8 {
                return Err(FenError::Board(format!("rank '{rank_str}' has too many files")));
            }
            if piece == PieceKind::Pawn && (board_rank == 0 || board_rank == 7) {
                return Err(FenError::Board(format!("pawn on back rank '{rank_str}'")));
            }

            position.put(color, piece, make_square(file, board_rank));
            file += 1;
        }

        if file != 8 {
            return Err(FenError::Board(format!("rank '{rank_str}' does not sum to 8 files")));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> Result<Color, FenError> {
    match side_part {
        "w" => Ok(Color::Light),
        "b" => Ok(Color::Dark),
        _ => Err(FenError::SideToMove(side_part.to_owned())),
    }
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, FenError> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;
    for ch in castling_part.chars() {
        let right = match ch {
            'K' => CASTLE_LIGHT_KINGSIDE,
            'Q' => CASTLE_LIGHT_QUEENSIDE,
            'k' => CASTLE_DARK_KINGSIDE,
            'q' => CASTLE_DARK_QUEENSIDE,
            _ => return Err(FenError::Castling(castling_part.to_owned())),
        };
        if rights & right != 0 {
            return Err(FenError::Castling(castling_part.to_owned()));
        }
        rights |= right;
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> Result<Option<Square>, FenError> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)
        .filter(|_| en_passant_part.bytes().all(|b| !b.is_ascii_uppercase()))
        .ok_or_else(|| FenError::EnPassant(en_passant_part.to_owned()))?;
    if !matches!(square_rank(square), 2 | 5) {
        return Err(FenError::EnPassant(en_passant_part.to_owned()));
    }
    Ok(Some(square))
}

/// The target must sit behind a pawn of the side that just moved, on the
/// rank a double push crosses, with the pushed-over squares empty.
fn check_en_passant_square(position: &Position, en_passant_part: &str) -> Result<(), FenError> {
    let Some(target) = position.en_passant_square else {
        return Ok(());
    };
    let (target_rank, pushed_to, pushed_from) = match position.side_to_move {
        Color::Light => (5, target.wrapping_sub(8), target.wrapping_add(8)),
        Color::Dark => (2, target.wrapping_add(8), target.wrapping_sub(8)),
    };
    let mover = position.side_to_move.opposite();
    let consistent = square_rank(target) == target_rank
        && position.piece_at(pushed_to) == Some((mover, PieceKind::Pawn))
        && position.piece_at(target).is_none()
        && position.piece_at(pushed_from).is_none();
    if consistent {
        Ok(())
    } else {
        Err(FenError::EnPassant(en_passant_part.to_owned()))
    }
}

fn parse_counter(field: &'static str, text: &str) -> Result<u16, FenError> {
    text.parse::<u16>().map_err(|_| FenError::Counter {
        field,
        value: text.to_owned(),
    })
}

fn piece_from_fen_char(ch: char) -> Option<(Color, PieceKind)> {
    let color = if ch.is_ascii_uppercase() {
        Color::Light
    } else if ch.is_ascii_lowercase() {
        Color::Dark
    } else {
        return None;
    };

    let piece = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };

    Some((color, piece))
}

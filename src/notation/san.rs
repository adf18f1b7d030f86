//! Standard algebraic notation: syntactic parsing and formatting.
//!
//! Parsing here only splits the text into its parts; matching those parts
//! against the legal moves of a position happens in the move parser.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::game_status::{status, GameStatus};
use crate::move_generation::legal_move_apply::apply;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::notation::algebraic::{file_char, file_from_char, rank_from_char, square_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanToken {
    Castle(CastleSide),
    Move {
        piece: PieceKind,
        from_file: Option<u8>,
        from_rank: Option<u8>,
        capture: bool,
        to: Square,
        promotion: Option<PieceKind>,
    },
}

/// Strip the informational suffixes SAN allows after a move: check and mate
/// markers, `!`/`?` annotations and an `e.p.` tag.
pub fn strip_annotations(text: &str) -> &str {
    let mut rest = text.trim();
    loop {
        let before = rest;
        rest = rest.trim_end_matches(['+', '#', '!', '?']).trim_end();
        if let Some(head) = rest.len().checked_sub(4).and_then(|cut| {
            rest.get(cut..)
                .filter(|tail| tail.eq_ignore_ascii_case("e.p."))
                .map(|_| &rest[..cut])
        }) {
            rest = head.trim_end();
        }
        if rest == before {
            return rest;
        }
    }
}

/// Split SAN text into its parts. Returns `None` when the text does not
/// follow the grammar at all.
pub fn parse_san(text: &str) -> Option<SanToken> {
    let body = strip_annotations(text);
    if !body.is_ascii() || body.is_empty() {
        return None;
    }

    let castle: String = body
        .chars()
        .map(|c| match c {
            '0' | 'o' => 'O',
            other => other,
        })
        .collect();
    match castle.as_str() {
        "O-O" => return Some(SanToken::Castle(CastleSide::Kingside)),
        "O-O-O" => return Some(SanToken::Castle(CastleSide::Queenside)),
        _ => {}
    }

    let mut chars: Vec<char> = body.chars().collect();

    let mut promotion = None;
    if chars.last().is_some_and(|c| c.is_ascii_alphabetic()) {
        let letter = chars.pop()?;
        promotion = Some(PieceKind::from_letter(letter).filter(|kind| {
            PieceKind::PROMOTIONS.contains(kind)
        })?);
        if chars.last() == Some(&'=') {
            chars.pop();
        }
    }

    if chars.len() < 2 {
        return None;
    }
    let rank = rank_from_char(chars.pop()?)?;
    let file = file_from_char(chars.pop()?)?;
    let to = make_square(file, rank);

    let mut prefix = chars.into_iter().peekable();
    let piece = match prefix.peek() {
        Some(&c) if matches!(c, 'K' | 'Q' | 'R' | 'N' | 'B' | 'k' | 'q' | 'r' | 'n') => {
            prefix.next();
            PieceKind::from_letter(c)?
        }
        _ => PieceKind::Pawn,
    };

    let mut from_file = None;
    let mut from_rank = None;
    let mut capture = false;
    for c in prefix {
        if capture {
            return None;
        }
        if c == 'x' || c == 'X' || c == ':' {
            capture = true;
        } else if let (None, None, Some(f)) = (from_file, from_rank, file_from_char(c)) {
            from_file = Some(f);
        } else if let (None, Some(r)) = (from_rank, rank_from_char(c)) {
            from_rank = Some(r);
        } else {
            return None;
        }
    }

    if promotion.is_some() && piece != PieceKind::Pawn {
        return None;
    }

    Some(SanToken::Move {
        piece,
        from_file,
        from_rank,
        capture,
        to,
        promotion,
    })
}

/// Render a legal move in SAN with minimal disambiguation and a `+`/`#`
/// suffix.
pub fn format_san(position: &Position, mv: &Move) -> String {
    let mut out = if mv.flags.contains(MoveFlags::CASTLE_KINGSIDE) {
        "O-O".to_owned()
    } else if mv.flags.contains(MoveFlags::CASTLE_QUEENSIDE) {
        "O-O-O".to_owned()
    } else {
        format_body(position, mv)
    };

    let after = apply(position, mv);
    match status(&after) {
        GameStatus::Checkmate => out.push('#'),
        _ if is_king_in_check(&after, after.side_to_move()) => out.push('+'),
        _ => {}
    }
    out
}

fn format_body(position: &Position, mv: &Move) -> String {
    let mut out = String::with_capacity(8);

    match mv.piece.san_letter() {
        None => {
            if mv.is_capture() {
                out.push(file_char(square_file(mv.from)));
            }
        }
        Some(letter) => {
            out.push(letter);
            out.push_str(&disambiguation(position, mv));
        }
    }

    if mv.is_capture() {
        out.push('x');
    }
    out.push_str(&square_name(mv.to));

    if let Some(letter) = mv.promotion.and_then(PieceKind::san_letter) {
        out.push('=');
        out.push(letter);
    }
    out
}

fn disambiguation(position: &Position, mv: &Move) -> String {
    let rivals: Vec<Square> = legal_moves(position)
        .into_iter()
        .filter(|other| other.piece == mv.piece && other.to == mv.to && other.from != mv.from)
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    let file = square_file(mv.from);
    let rank = square_rank(mv.from);
    if rivals.iter().all(|&sq| square_file(sq) != file) {
        file_char(file).to_string()
    } else if rivals.iter().all(|&sq| square_rank(sq) != rank) {
        char::from(b'1' + rank).to_string()
    } else {
        square_name(mv.from)
    }
}

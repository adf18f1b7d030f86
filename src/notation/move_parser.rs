//! Human move input: the `reset` control token, coordinate notation and
//! SAN, resolved against the legal moves of a position.
//!
//! Coordinate notation is tried first since its grammar is strict; SAN is
//! the fallback. Resolution never guesses: text naming no legal move is
//! `Illegal`, text naming several is `Ambiguous`.

use crate::errors::{Grammar, MoveParseError};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::notation::long_algebraic::{parse_coordinate, CoordinateText};
use crate::notation::san::{format_san, parse_san, strip_annotations, CastleSide, SanToken};

pub const RESET_TOKEN: &str = "reset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    Reset,
    Move(Move),
}

/// Parse one line of human input against `position`.
pub fn parse(text: &str, position: &Position) -> Result<ParsedInput, MoveParseError> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case(RESET_TOKEN) {
        return Ok(ParsedInput::Reset);
    }

    let legal = legal_moves(position);

    if let Some(coordinate) = parse_coordinate(trimmed) {
        let candidates = match_coordinate(&legal, &coordinate);
        return resolve(trimmed, Grammar::Coordinate, position, candidates).map(ParsedInput::Move);
    }

    let Some(token) = parse_san(trimmed) else {
        return Err(MoveParseError::Malformed {
            text: trimmed.to_owned(),
            grammar: resemblance(trimmed),
        });
    };

    let mut candidates = match_san(&legal, &token);
    if candidates.is_empty() {
        if let Some(other) = b_letter_reading(trimmed, &token) {
            candidates = match_san(&legal, &other);
        }
    }
    resolve(trimmed, Grammar::Algebraic, position, candidates).map(ParsedInput::Move)
}

fn resolve(
    text: &str,
    grammar: Grammar,
    position: &Position,
    candidates: Vec<Move>,
) -> Result<Move, MoveParseError> {
    match candidates.as_slice() {
        [] => Err(MoveParseError::Illegal {
            text: text.to_owned(),
            grammar,
        }),
        [single] => Ok(*single),
        several => Err(MoveParseError::Ambiguous {
            text: text.to_owned(),
            grammar,
            candidates: several.iter().map(|mv| format_san(position, mv)).collect(),
        }),
    }
}

/// Promotions without an explicit piece are read as queen promotions.
fn promotion_matches(requested: Option<PieceKind>, mv: &Move) -> bool {
    match (requested, mv.promotion) {
        (Some(wanted), Some(actual)) => wanted == actual,
        (None, Some(actual)) => actual == PieceKind::Queen,
        (None, None) => true,
        (Some(_), None) => false,
    }
}

fn match_coordinate(legal: &[Move], coordinate: &CoordinateText) -> Vec<Move> {
    legal
        .iter()
        .filter(|mv| {
            mv.from == coordinate.from
                && mv.to == coordinate.to
                && promotion_matches(coordinate.promotion, mv)
        })
        .copied()
        .collect()
}

fn match_san(legal: &[Move], token: &SanToken) -> Vec<Move> {
    legal
        .iter()
        .filter(|mv| match *token {
            SanToken::Castle(CastleSide::Kingside) => {
                mv.flags.contains(MoveFlags::CASTLE_KINGSIDE)
            }
            SanToken::Castle(CastleSide::Queenside) => {
                mv.flags.contains(MoveFlags::CASTLE_QUEENSIDE)
            }
            SanToken::Move {
                piece,
                from_file,
                from_rank,
                to,
                promotion,
                ..
            } => {
                // A pawn without a file letter can only be pushing.
                let pawn_push_only = piece == PieceKind::Pawn && from_file.is_none();
                mv.piece == piece
                    && mv.to == to
                    && !mv.is_castle()
                    && from_file.is_none_or(|file| square_file(mv.from) == file)
                    && from_rank.is_none_or(|rank| square_rank(mv.from) == rank)
                    && (!pawn_push_only || square_file(mv.from) == square_file(mv.to))
                    && promotion_matches(promotion, mv)
            }
        })
        .copied()
        .collect()
}

/// The letter `b` names both the bishop and the b-file. Text is read first
/// with its own case (`b` a pawn, `B` a bishop); when that names nothing, the
/// other reading is tried.
fn b_letter_reading(text: &str, token: &SanToken) -> Option<SanToken> {
    let body = strip_annotations(text);
    match token {
        SanToken::Move {
            piece: PieceKind::Pawn,
            from_file: Some(1),
            promotion: None,
            ..
        } => {
            let rest = body.strip_prefix('b')?;
            parse_san(&format!("B{rest}")).filter(|reading| {
                matches!(reading, SanToken::Move { piece: PieceKind::Bishop, .. })
            })
        }
        SanToken::Move {
            piece: PieceKind::Bishop,
            ..
        } => {
            let rest = body.strip_prefix('B')?;
            parse_san(&format!("b{rest}")).filter(|reading| {
                matches!(
                    reading,
                    SanToken::Move {
                        piece: PieceKind::Pawn,
                        from_file: Some(1),
                        ..
                    }
                )
            })
        }
        _ => None,
    }
}

/// Best guess at which grammar unparseable text was aiming for.
fn resemblance(text: &str) -> Grammar {
    let chars: Vec<char> = text.chars().collect();
    let squareish = |c: Option<&char>, d: Option<&char>| {
        c.is_some_and(|c| c.is_ascii_alphabetic()) && d.is_some_and(|d| d.is_ascii_digit())
    };
    if chars.len() >= 4 && squareish(chars.first(), chars.get(1)) && squareish(chars.get(2), chars.get(3))
    {
        return Grammar::Coordinate;
    }
    let first = chars.first().copied().unwrap_or(' ');
    if "KQRBN".contains(first)
        || text.starts_with(['O', '0', 'o'])
        || text.contains(['x', '=', '+', '#'])
        || squareish(chars.get(chars.len().wrapping_sub(2)), chars.last())
    {
        return Grammar::Algebraic;
    }
    Grammar::Unrecognized
}

//! Coordinate notation (`e2e4`, `e7e8q`), the form UCI engines speak.

use crate::game_state::chess_types::{Move, PieceKind, Square};
use crate::notation::algebraic::{algebraic_to_square, square_name};

/// Syntactic content of a coordinate move string, not yet matched against a
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateText {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

/// Render a move as origin, destination and lowercase promotion letter.
pub fn to_coordinate(mv: &Move) -> String {
    let mut out = square_name(mv.from);
    out.push_str(&square_name(mv.to));
    if let Some(letter) = mv.promotion.and_then(PieceKind::san_letter) {
        out.push(letter.to_ascii_lowercase());
    }
    out
}

/// Parse `^[a-h][1-8][a-h][1-8][qrbn]?$`, case-insensitive.
pub fn parse_coordinate(text: &str) -> Option<CoordinateText> {
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return None;
    }
    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(letter) => match PieceKind::from_letter(letter)? {
            kind @ (PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen) => {
                Some(kind)
            }
            _ => return None,
        },
    };
    Some(CoordinateText { from, to, promotion })
}

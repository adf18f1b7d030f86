//! Attack and check queries.
//!
//! All lookups work in reverse from the target square: a square is attacked
//! by a knight of color C if a knight of C sits on one of the knight
//! squares of the target, and likewise for the other piece kinds.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};

/// Bitboard of `attacker_color` pieces attacking `square`, with sliders
/// traced through `occupancy` rather than the position's own occupancy.
pub fn attackers_with_occupancy(
    position: &Position,
    square: Square,
    attacker_color: Color,
    occupancy: u64,
) -> u64 {
    let pieces = |kind| position.pieces(attacker_color, kind) & occupancy;
    let diagonal = pieces(PieceKind::Bishop) | pieces(PieceKind::Queen);
    let straight = pieces(PieceKind::Rook) | pieces(PieceKind::Queen);

    (pawn_attacks(attacker_color.opposite(), square) & pieces(PieceKind::Pawn))
        | (knight_attacks(square) & pieces(PieceKind::Knight))
        | (king_attacks(square) & pieces(PieceKind::King))
        | (bishop_attacks(square, occupancy) & diagonal)
        | (rook_attacks(square, occupancy) & straight)
}

#[inline]
pub fn attackers_bitboard(position: &Position, square: Square, attacker_color: Color) -> u64 {
    attackers_with_occupancy(position, square, attacker_color, position.occupancy_all())
}

#[inline]
pub fn is_square_attacked(position: &Position, square: Square, attacker_color: Color) -> bool {
    attackers_bitboard(position, square, attacker_color) != 0
}

#[inline]
pub fn is_king_in_check(position: &Position, color: Color) -> bool {
    let Some(king_sq) = position.king_square(color) else {
        return false;
    };
    is_square_attacked(position, king_sq, color.opposite())
}

/// Attacking pieces of `attacker_color` on `square`, ascending by square.
pub fn attackers_to_square(
    position: &Position,
    square: Square,
    attacker_color: Color,
) -> Vec<(Square, PieceKind)> {
    squares_of(attackers_bitboard(position, square, attacker_color))
        .filter_map(|from| position.piece_at(from).map(|(_, kind)| (from, kind)))
        .collect()
}

/// Value of the cheapest `attacker_color` piece attacking `square`, if any.
pub fn cheapest_attacker_value(
    position: &Position,
    square: Square,
    attacker_color: Color,
    occupancy: u64,
) -> Option<i32> {
    let attackers = attackers_with_occupancy(position, square, attacker_color, occupancy);
    PieceKind::ALL
        .into_iter()
        .find(|&kind| attackers & position.pieces(attacker_color, kind) != 0)
        .map(|kind| match kind {
            PieceKind::King => 100,
            other => other.value(),
        })
}

//! Static positional evaluation for the last reply tier.
//!
//! A move is scored by how much it changes the mover's evaluation:
//! `evaluate(after) - evaluate(before)`, both from the mover's side. Terms
//! are in centipawn-like units so the material term (100 per point) and the
//! shape terms can be summed directly.

use crate::engines::strategy::Difficulty;
use crate::engines::tactics::hanging_value;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;

/// Non-pawn material (both sides, in points) at or below which the
/// position counts as an endgame.
pub const ENDGAME_MATERIAL: i32 = 26;

const CENTER: u64 = square_bit(27) | square_bit(28) | square_bit(35) | square_bit(36);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalWeights {
    pub center: i32,
    pub development: i32,
    pub castled_king: i32,
    pub castling_right: i32,
    pub pawn_shield: i32,
    pub king_activity: i32,
    pub doubled_pawn: i32,
    pub isolated_pawn: i32,
    pub passed_pawn: i32,
    pub hanging: i32,
    pub material: i32,
}

impl PositionalWeights {
    pub const HARD: Self = Self {
        center: 30,
        development: 25,
        castled_king: 50,
        castling_right: 10,
        pawn_shield: 15,
        king_activity: 10,
        doubled_pawn: 20,
        isolated_pawn: 15,
        passed_pawn: 25,
        hanging: 90,
        material: 100,
    };

    pub const fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Hard => Self::HARD,
            Difficulty::Medium => Self::HARD.scaled(2, 3, true),
            Difficulty::Easy => Self::HARD.scaled(1, 3, false),
        }
    }

    /// Scale every shape term by `num / den`. Material is never scaled.
    const fn scaled(self, num: i32, den: i32, keep_hanging: bool) -> Self {
        Self {
            center: self.center * num / den,
            development: self.development * num / den,
            castled_king: self.castled_king * num / den,
            castling_right: self.castling_right * num / den,
            pawn_shield: self.pawn_shield * num / den,
            king_activity: self.king_activity * num / den,
            doubled_pawn: self.doubled_pawn * num / den,
            isolated_pawn: self.isolated_pawn * num / den,
            passed_pawn: self.passed_pawn * num / den,
            hanging: if keep_hanging { self.hanging * num / den } else { 0 },
            material: self.material,
        }
    }
}

/// Score of the transition `before -> after` for the side that moved.
pub fn score_transition(before: &Position, after: &Position, weights: &PositionalWeights) -> i32 {
    let mover = before.side_to_move();
    evaluate(after, mover, weights) - evaluate(before, mover, weights)
}

/// Evaluation of `position` from `color`'s point of view.
pub fn evaluate(position: &Position, color: Color, weights: &PositionalWeights) -> i32 {
    let opponent = color.opposite();
    let endgame = is_endgame(position);

    let material = (position.material(color) - position.material(opponent)) * weights.material;
    let center = (position.occupancy(color) & CENTER).count_ones() as i32 * weights.center;
    let structure = pawn_structure(position, color, weights) - pawn_structure(position, opponent, weights);
    let hanging = hanging_value(position, color) * weights.hanging;

    let king = if endgame {
        king_activity(position, color) * weights.king_activity
    } else {
        developed_minors(position, color) * weights.development
            + king_shelter(position, color, weights)
    };

    material + center + structure + king - hanging
}

pub fn is_endgame(position: &Position) -> bool {
    let non_pawn: i32 = Color::BOTH
        .into_iter()
        .flat_map(|color| {
            [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen]
                .map(|kind| position.pieces(color, kind).count_ones() as i32 * kind.value())
        })
        .sum();
    non_pawn <= ENDGAME_MATERIAL
}

/// Knights and bishops that have left their starting squares.
fn developed_minors(position: &Position, color: Color) -> i32 {
    let rank = color.home_rank();
    let home = [1, 6]
        .map(|file| (PieceKind::Knight, make_square(file, rank)))
        .into_iter()
        .chain([2, 5].map(|file| (PieceKind::Bishop, make_square(file, rank))));
    let still_home = home
        .filter(|&(kind, sq)| position.pieces(color, kind) & square_bit(sq) != 0)
        .count() as i32;
    let total = (position.pieces(color, PieceKind::Knight) | position.pieces(color, PieceKind::Bishop))
        .count_ones() as i32;
    total - still_home
}

/// Castled-king bonus with its pawn shield, plus a small credit for every
/// castling right still held.
fn king_shelter(position: &Position, color: Color, weights: &PositionalWeights) -> i32 {
    let rights = match color {
        Color::Light => position.castling_rights() & (CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE),
        Color::Dark => position.castling_rights() & (CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE),
    };
    let rights_credit = rights.count_ones() as i32 * weights.castling_right;

    let Some(king) = position.king_square(color) else {
        return rights_credit;
    };
    let castled = square_rank(king) == color.home_rank() && matches!(square_file(king), 0..=2 | 6..=7);
    if !castled {
        return rights_credit;
    }
    castled_shield(position, color, king) * weights.pawn_shield + weights.castled_king + rights_credit
}

/// Own pawns on the three squares directly in front of the king.
fn castled_shield(position: &Position, color: Color, king: Square) -> i32 {
    let shield_rank = match color {
        Color::Light => square_rank(king) + 1,
        Color::Dark => square_rank(king).wrapping_sub(1),
    };
    if shield_rank > 7 {
        return 0;
    }
    let file = square_file(king);
    let files = file.saturating_sub(1)..=(file + 1).min(7);
    let pawns = position.pieces(color, PieceKind::Pawn);
    files
        .filter(|&f| pawns & square_bit(make_square(f, shield_rank)) != 0)
        .count() as i32
}

/// 0 in a corner up to 6 in the center.
fn king_activity(position: &Position, color: Color) -> i32 {
    position.king_square(color).map_or(0, |king| {
        let file = i32::from(square_file(king));
        let rank = i32::from(square_rank(king));
        let distance = (2 * file - 7).abs() + (2 * rank - 7).abs();
        (14 - distance) / 2
    })
}

fn pawn_structure(position: &Position, color: Color, weights: &PositionalWeights) -> i32 {
    let pawns = position.pieces(color, PieceKind::Pawn);
    let enemy_pawns = position.pieces(color.opposite(), PieceKind::Pawn);

    let passed: i32 = squares_of(pawns)
        .filter(|&sq| is_passed_pawn(color, sq, enemy_pawns))
        .map(|sq| weights.passed_pawn + relative_rank(color, sq) * weights.passed_pawn / 4)
        .sum();

    passed
        - doubled_pawns(pawns) * weights.doubled_pawn
        - isolated_pawns(pawns) * weights.isolated_pawn
}

#[inline]
const fn file_mask(file: u8) -> u64 {
    0x0101_0101_0101_0101u64 << file
}

#[inline]
fn relative_rank(color: Color, square: Square) -> i32 {
    match color {
        Color::Light => i32::from(square_rank(square)),
        Color::Dark => 7 - i32::from(square_rank(square)),
    }
}

/// Pawns beyond the first on each file.
pub(crate) fn doubled_pawns(pawns: u64) -> i32 {
    (0..8)
        .map(|file| (pawns & file_mask(file)).count_ones().saturating_sub(1) as i32)
        .sum()
}

/// Pawns with no friendly pawn on an adjacent file.
pub(crate) fn isolated_pawns(pawns: u64) -> i32 {
    squares_of(pawns)
        .filter(|&sq| {
            let file = square_file(sq);
            let left = if file > 0 { file_mask(file - 1) } else { 0 };
            let right = if file < 7 { file_mask(file + 1) } else { 0 };
            pawns & (left | right) == 0
        })
        .count() as i32
}

/// No enemy pawn ahead on the same or an adjacent file.
pub(crate) fn is_passed_pawn(color: Color, square: Square, enemy_pawns: u64) -> bool {
    let file = square_file(square);
    let rank = square_rank(square);
    let files = file.saturating_sub(1)..=(file + 1).min(7);
    let ahead = |r: u8| match color {
        Color::Light => r > rank,
        Color::Dark => r < rank,
    };
    !squares_of(enemy_pawns)
        .any(|enemy| files.contains(&square_file(enemy)) && ahead(square_rank(enemy)))
}

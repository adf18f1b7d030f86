//! Attack bitboards for every piece kind.
//!
//! Leaper attacks (knight, king, pawn captures) are precomputed into const
//! tables from step lists; slider attacks are traced against the current
//! occupancy and include the first blocker in each direction.

use crate::game_state::chess_types::{Color, Square};

const KNIGHT_STEPS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const LIGHT_PAWN_CAPTURE_STEPS: [(i32, i32); 2] = [(-1, 1), (1, 1)];
const DARK_PAWN_CAPTURE_STEPS: [(i32, i32); 2] = [(-1, -1), (1, -1)];

pub const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
pub const ROOK_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

pub const KNIGHT_ATTACKS: [u64; 64] = step_table(&KNIGHT_STEPS);
pub const KING_ATTACKS: [u64; 64] = step_table(&KING_STEPS);
pub const PAWN_ATTACKS: [[u64; 64]; 2] = [
    step_table(&LIGHT_PAWN_CAPTURE_STEPS),
    step_table(&DARK_PAWN_CAPTURE_STEPS),
];

const fn step_table(steps: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < steps.len() {
            attacks |= bit_if_on_board(file + steps[i].0, rank + steps[i].1);
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn bit_if_on_board(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }
    1u64 << (rank * 8 + file)
}

#[inline]
pub const fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square as usize]
}

/// Squares a pawn of `color` standing on `square` attacks.
#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> u64 {
    PAWN_ATTACKS[color.index()][square as usize]
}

#[inline]
pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    slide(square, occupancy, &BISHOP_DIRECTIONS)
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    slide(square, occupancy, &ROOK_DIRECTIONS)
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

fn slide(square: Square, occupancy: u64, directions: &[(i32, i32)]) -> u64 {
    let origin_file = i32::from(square % 8);
    let origin_rank = i32::from(square / 8);
    let mut attacks = 0u64;

    for &(file_step, rank_step) in directions {
        let mut file = origin_file + file_step;
        let mut rank = origin_rank + rank_step;

        while (0..8).contains(&file) && (0..8).contains(&rank) {
            let bit = 1u64 << (rank * 8 + file);
            attacks |= bit;
            if occupancy & bit != 0 {
                break;
            }
            file += file_step;
            rank += rank_step;
        }
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    const D4: Square = 27;
    const A1: Square = 0;

    #[test]
    fn knight_attacks_from_center_and_corner() {
        assert_eq!(knight_attacks(D4).count_ones(), 8);
        assert_eq!(knight_attacks(A1).count_ones(), 2);
    }

    #[test]
    fn king_attacks_from_center_and_corner() {
        assert_eq!(king_attacks(D4).count_ones(), 8);
        assert_eq!(king_attacks(A1).count_ones(), 3);
    }

    #[test]
    fn pawn_attacks_point_forward_for_each_color() {
        // e4 pawn: white attacks d5/f5, black attacks d3/f3.
        let e4 = 28;
        assert_eq!(pawn_attacks(Color::Light, e4), (1u64 << 35) | (1u64 << 37));
        assert_eq!(pawn_attacks(Color::Dark, e4), (1u64 << 19) | (1u64 << 21));
        // No wraparound from the a-file.
        assert_eq!(pawn_attacks(Color::Light, 8).count_ones(), 1);
    }

    #[test]
    fn sliders_stop_at_first_blocker() {
        assert_eq!(rook_attacks(D4, 0).count_ones(), 14);
        assert_eq!(bishop_attacks(D4, 0).count_ones(), 13);
        assert_eq!(queen_attacks(D4, 0).count_ones(), 27);

        // Blocker on d6 keeps d6 but cuts d7/d8.
        let blocked = rook_attacks(D4, 1u64 << 43);
        assert_ne!(blocked & (1u64 << 43), 0);
        assert_eq!(blocked & (1u64 << 51), 0);
        assert_eq!(blocked.count_ones(), 12);
    }
}

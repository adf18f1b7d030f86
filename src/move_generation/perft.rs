//! Perft node counting for move generator validation and benchmarking.

use crate::game_state::chess_types::Move;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::{has_legal_move, legal_moves_with_positions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }

    fn leaf(mv: &Move, after: &Position) -> Self {
        let gives_check = is_king_in_check(after, after.side_to_move());
        PerftCounts {
            nodes: 1,
            captures: u64::from(mv.is_capture()),
            en_passant: u64::from(mv.is_en_passant()),
            castles: u64::from(mv.is_castle()),
            promotions: u64::from(mv.promotion.is_some()),
            checks: u64::from(gives_check),
            checkmates: u64::from(gives_check && !has_legal_move(after)),
        }
    }
}

/// Count leaf nodes of the legal move tree `depth` plies deep, with move
/// statistics gathered at the leaves.
pub fn perft(position: &Position, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut total = PerftCounts::default();
    for (mv, next) in legal_moves_with_positions(position) {
        if depth == 1 {
            total.merge(PerftCounts::leaf(&mv, &next));
        } else {
            total.merge(perft(&next, depth - 1));
        }
    }
    total
}

/// Leaf-node count per root move, for locating generator bugs.
pub fn perft_divide(position: &Position, depth: u8) -> Vec<(Move, u64)> {
    legal_moves_with_positions(position)
        .into_iter()
        .map(|(mv, next)| (mv, perft(&next, depth.saturating_sub(1)).nodes))
        .collect()
}

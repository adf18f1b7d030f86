//! Full legal move generation pipeline.
//!
//! Generates pseudo-legal moves, applies each candidate and keeps only those
//! that do not leave the mover's own king attacked.

use crate::game_state::chess_types::Move;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::apply;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::pseudo_moves::generate_pseudo_moves;

/// Every legal move in `position`, in generation order.
pub fn legal_moves(position: &Position) -> Vec<Move> {
    legal_moves_with_positions(position)
        .into_iter()
        .map(|(mv, _)| mv)
        .collect()
}

/// Legal moves paired with the position each one produces. Callers that
/// need to inspect the outcome of every move use this to avoid applying
/// twice.
pub fn legal_moves_with_positions(position: &Position) -> Vec<(Move, Position)> {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_moves(position, &mut pseudo);

    let mover = position.side_to_move();
    pseudo
        .into_iter()
        .filter_map(|mv| {
            let next = apply(position, &mv);
            (!is_king_in_check(&next, mover)).then_some((mv, next))
        })
        .collect()
}

/// True when the position has at least one legal move.
pub fn has_legal_move(position: &Position) -> bool {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_moves(position, &mut pseudo);
    let mover = position.side_to_move();
    pseudo
        .iter()
        .any(|mv| !is_king_in_check(&apply(position, mv), mover))
}

pub fn is_legal(position: &Position, mv: &Move) -> bool {
    legal_moves(position).contains(mv)
}

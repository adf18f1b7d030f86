//! One-ply tactical measures shared by the reply strategy and the ledger's
//! move-quality classification.
//!
//! The exchange estimate is one level deep: it looks at who can
//! attack and defend the destination square after the move, not at the full
//! capture sequence.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::{
    attackers_bitboard, cheapest_attacker_value, is_king_in_check,
};
use crate::move_generation::legal_move_generator::has_legal_move;

/// Piece standing on the destination after `mv` (the promoted piece when
/// promoting).
#[inline]
pub fn landed_piece(mv: &Move) -> PieceKind {
    mv.promotion.unwrap_or(mv.piece)
}

#[inline]
pub fn captured_value(mv: &Move) -> i32 {
    mv.captured.map_or(0, PieceKind::value)
}

/// Material the mover gains from the move itself: the captured piece plus
/// any promotion upgrade.
pub fn material_gain(mv: &Move) -> i32 {
    let promotion_gain = mv
        .promotion
        .map_or(0, |kind| kind.value() - PieceKind::Pawn.value());
    captured_value(mv) + promotion_gain
}

/// The side to move in `after` is in check with no legal reply.
pub fn delivers_mate(after: &Position) -> bool {
    is_king_in_check(after, after.side_to_move()) && !has_legal_move(after)
}

/// Expected loss of the moved piece on its destination in `after`.
///
/// Undefended and attacked: the whole piece. Defended: whatever the
/// opponent gains by trading its cheapest attacker for it, never negative.
pub fn exchange_risk(after: &Position, mv: &Move) -> i32 {
    let mover = after.side_to_move().opposite();
    let opponent = after.side_to_move();
    let moved_value = landed_piece(mv).value();

    let Some(cheapest) = cheapest_attacker_value(after, mv.to, opponent, after.occupancy_all())
    else {
        return 0;
    };
    if attackers_bitboard(after, mv.to, mover) == 0 {
        moved_value
    } else {
        (moved_value - cheapest).max(0)
    }
}

/// Score of a capture for the capture tier: captured value minus exchange
/// risk. `None` for non-captures.
pub fn capture_score(after: &Position, mv: &Move, include_risk: bool) -> Option<i32> {
    if !mv.is_capture() {
        return None;
    }
    let risk = if include_risk { exchange_risk(after, mv) } else { 0 };
    Some(captured_value(mv) - risk)
}

/// Value of `color`'s pieces that the opponent can win outright: attacked
/// and undefended, or attacked by something cheaper. Kings are excluded.
pub fn hanging_value(position: &Position, color: Color) -> i32 {
    let opponent = color.opposite();
    let occupancy = position.occupancy_all();
    PieceKind::ALL
        .into_iter()
        .filter(|&kind| kind != PieceKind::King)
        .flat_map(|kind| squares_of(position.pieces(color, kind)).map(move |sq| (sq, kind)))
        .filter_map(|(sq, kind)| {
            let cheapest = cheapest_attacker_value(position, sq, opponent, occupancy)?;
            let defended = attackers_bitboard(position, sq, color) != 0;
            (!defended || cheapest < kind.value()).then_some(kind.value())
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_apply::apply;
    use crate::move_generation::legal_move_generator::legal_moves;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("test FEN should parse")
    }

    fn find(board: &Position, from: Square, to: Square) -> Move {
        legal_moves(board)
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to)
            .expect("move should be legal")
    }

    #[test]
    fn undefended_capture_into_attack_risks_the_piece() {
        // Qxd5 takes a pawn defended by the e6 pawn; the queen is undefended.
        let board = position("4k3/8/4p3/3p4/8/8/3Q4/4K3 w - - 0 1");
        let mv = find(&board, 11, 35);
        let after = apply(&board, &mv);
        assert_eq!(exchange_risk(&after, &mv), 9);
        assert_eq!(capture_score(&after, &mv, true), Some(-8));
        assert_eq!(capture_score(&after, &mv, false), Some(1));
    }

    #[test]
    fn defended_capture_risks_the_difference() {
        // Nxd5 defended by the e4 pawn; d5 is attacked by the e6 pawn.
        let board = position("4k3/8/4p3/3p4/4P3/2N5/8/4K3 w - - 0 1");
        let mv = find(&board, 18, 35);
        let after = apply(&board, &mv);
        assert_eq!(exchange_risk(&after, &mv), 2);
        assert_eq!(capture_score(&after, &mv, true), Some(-1));
    }

    #[test]
    fn safe_capture_has_no_risk() {
        let board = position("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
        let mv = find(&board, 28, 35);
        let after = apply(&board, &mv);
        assert_eq!(exchange_risk(&after, &mv), 0);
        assert_eq!(capture_score(&after, &mv, true), Some(9));
        assert_eq!(material_gain(&mv), 9);
    }

    #[test]
    fn hanging_value_counts_loose_and_outgunned_pieces() {
        // The b5 knight is attacked by the a6 pawn and the h4 rook is loose
        // against the h8 rook.
        let board = position("4k2r/8/p7/1N6/7R/8/8/4K3 w - - 0 1");
        assert_eq!(hanging_value(&board, Color::Light), 3 + 5);
        assert_eq!(hanging_value(&Position::new_game(), Color::Light), 0);
    }

    #[test]
    fn promotion_counts_as_material_gain() {
        let board = position("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1");
        let mv = legal_moves(&board)
            .into_iter()
            .find(|mv| mv.promotion == Some(PieceKind::Queen))
            .expect("queen promotion should be legal");
        assert_eq!(material_gain(&mv), 8);
    }
}

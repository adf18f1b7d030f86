//! Per-move quality labels used by the ledger.

use serde::{Deserialize, Serialize};

use crate::engines::tactics::{delivers_mate, exchange_risk, landed_piece, material_gain};
use crate::game_state::chess_types::Move;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::is_king_in_check;

/// Net material at or above which a move counts as brilliant.
pub const BRILLIANT_GAIN: i32 = 5;

/// Smallest piece value that can be blundered.
pub const BLUNDER_PIECE_VALUE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveQuality {
    Brilliant,
    Good,
    Normal,
    Blunder,
}

/// Classify a move from the position before it and the position after it.
///
/// * Brilliant: mates, or nets at least [`BRILLIANT_GAIN`] after the
///   exchange estimate.
/// * Blunder: leaves a piece worth at least [`BLUNDER_PIECE_VALUE`] en prise
///   without a capture that pays for it.
/// * Good: gives check or nets material.
pub fn classify(after: &Position, mv: &Move) -> MoveQuality {
    if delivers_mate(after) {
        return MoveQuality::Brilliant;
    }
    let risk = exchange_risk(after, mv);
    let net = material_gain(mv) - risk;
    if net >= BRILLIANT_GAIN {
        return MoveQuality::Brilliant;
    }
    if landed_piece(mv).value() >= BLUNDER_PIECE_VALUE && risk > 0 && net < 0 {
        return MoveQuality::Blunder;
    }
    if net > 0 || is_king_in_check(after, after.side_to_move()) {
        return MoveQuality::Good;
    }
    MoveQuality::Normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_apply::apply;
    use crate::notation::move_parser::{parse, ParsedInput};

    fn quality(fen: &str, text: &str) -> MoveQuality {
        let before = Position::from_fen(fen).expect("test FEN should parse");
        let ParsedInput::Move(mv) = parse(text, &before).expect("legal move") else {
            panic!("expected a move");
        };
        classify(&apply(&before, &mv), &mv)
    }

    #[test]
    fn mate_is_brilliant() {
        assert_eq!(
            quality("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2", "Qh4#"),
            MoveQuality::Brilliant
        );
    }

    #[test]
    fn winning_a_loose_queen_is_brilliant() {
        assert_eq!(
            quality("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", "exd5"),
            MoveQuality::Brilliant
        );
    }

    #[test]
    fn dropping_the_queen_for_a_pawn_is_a_blunder() {
        assert_eq!(
            quality("4k3/8/4p3/3p4/8/8/3Q4/4K3 w - - 0 1", "Qxd5"),
            MoveQuality::Blunder
        );
    }

    #[test]
    fn check_or_small_gain_is_good() {
        assert_eq!(
            quality("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", "Ra8+"),
            MoveQuality::Good
        );
        assert_eq!(
            quality("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "exd5"),
            MoveQuality::Good
        );
    }

    #[test]
    fn quiet_developing_move_is_normal() {
        assert_eq!(
            quality(crate::game_state::chess_rules::STARTING_POSITION_FEN, "Nf3"),
            MoveQuality::Normal
        );
    }
}

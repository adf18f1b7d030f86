//! Terminal-state and check detection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game_state::chess_rules::{FIFTY_MOVE_HALFMOVES, REPETITION_COUNT};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::has_legal_move;
use crate::search::zobrist::position_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
    DrawByRepetition,
    DrawByFiftyMove,
    DrawByInsufficientMaterial,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing | GameStatus::Check)
    }

    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::DrawByRepetition
                | GameStatus::DrawByFiftyMove
                | GameStatus::DrawByInsufficientMaterial
        )
    }

    /// PGN result token, given the side that would move next.
    pub fn result_token(self, side_to_move: Color) -> &'static str {
        match self {
            GameStatus::Checkmate => match side_to_move {
                Color::Light => "0-1",
                Color::Dark => "1-0",
            },
            status if status.is_draw() => "1/2-1/2",
            _ => "*",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::DrawByRepetition => "draw by threefold repetition",
            GameStatus::DrawByFiftyMove => "draw by the fifty-move rule",
            GameStatus::DrawByInsufficientMaterial => "draw by insufficient material",
        };
        f.write_str(text)
    }
}

/// Status of a position on its own. Without history this never reports
/// repetition; see [`status_in_game`].
pub fn status(position: &Position) -> GameStatus {
    status_with_repetition(position, false)
}

/// Status of a position reached in a game whose earlier positions (oldest
/// first, not including `position`) are `earlier`.
pub fn status_in_game(position: &Position, earlier: &[Position]) -> GameStatus {
    let key = position_key(position);
    let occurrences = 1 + earlier
        .iter()
        .filter(|previous| position_key(previous) == key)
        .count();
    status_with_repetition(position, occurrences >= REPETITION_COUNT)
}

fn status_with_repetition(position: &Position, repeated: bool) -> GameStatus {
    let side = position.side_to_move();
    let in_check = is_king_in_check(position, side);

    if !has_legal_move(position) {
        return if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }
    if has_insufficient_material(position) {
        return GameStatus::DrawByInsufficientMaterial;
    }
    if position.halfmove_clock() >= FIFTY_MOVE_HALFMOVES {
        return GameStatus::DrawByFiftyMove;
    }
    if repeated {
        return GameStatus::DrawByRepetition;
    }
    if in_check {
        GameStatus::Check
    } else {
        GameStatus::Ongoing
    }
}

/// K v K, K+minor v K, and K+B v K+B with both bishops on the same square
/// color.
pub fn has_insufficient_material(position: &Position) -> bool {
    let heavy_or_pawn = |color| {
        position.pieces(color, PieceKind::Pawn)
            | position.pieces(color, PieceKind::Rook)
            | position.pieces(color, PieceKind::Queen)
    };
    if Color::BOTH.into_iter().any(|color| heavy_or_pawn(color) != 0) {
        return false;
    }

    let knights = |color| position.pieces(color, PieceKind::Knight).count_ones();
    let bishops = |color| position.pieces(color, PieceKind::Bishop);
    let minors = |color| knights(color) + bishops(color).count_ones();

    match (minors(Color::Light), minors(Color::Dark)) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) => {
            let light = bishops(Color::Light);
            let dark = bishops(Color::Dark);
            light != 0 && dark != 0 && square_shade(light) == square_shade(dark)
        }
        _ => false,
    }
}

/// 0 for dark squares (a1), 1 for light squares, of a single-bit board.
fn square_shade(bitboard: u64) -> u8 {
    let sq = bitboard.trailing_zeros() as Square;
    (square_file(sq) + square_rank(sq)) % 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_apply::apply;
    use crate::move_generation::legal_move_generator::legal_moves;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("test FEN should parse")
    }

    fn play_coordinates(start: &Position, moves: &[(Square, Square)]) -> Vec<Position> {
        let mut positions = vec![start.clone()];
        for &(from, to) in moves {
            let current = positions.last().expect("history is never empty").clone();
            let mv = legal_moves(&current)
                .into_iter()
                .find(|mv| mv.from == from && mv.to == to)
                .expect("scripted move should be legal");
            positions.push(apply(&current, &mv));
        }
        positions
    }

    #[test]
    fn detects_checkmate_and_stalemate() {
        let mate = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(status(&mate), GameStatus::Checkmate);

        let stalemate = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(status(&stalemate), GameStatus::Stalemate);
    }

    #[test]
    fn reports_check_and_ongoing() {
        assert_eq!(status(&Position::new_game()), GameStatus::Ongoing);
        let check = position("4k3/8/8/8/8/8/8/4RK2 b - - 0 1");
        assert_eq!(status(&check), GameStatus::Check);
    }

    #[test]
    fn insufficient_material_cases() {
        assert!(has_insufficient_material(&position("4k3/8/8/8/8/8/8/4K3 w - - 0 1")));
        assert!(has_insufficient_material(&position("4k3/8/8/8/8/8/8/4KN2 w - - 0 1")));
        assert!(has_insufficient_material(&position("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1")));
        // Opposite-colored bishops can still mate in theory.
        assert!(!has_insufficient_material(&position("4k1b1/8/8/8/8/8/8/2B1K3 w - - 0 1")));
        assert!(!has_insufficient_material(&position("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")));
        assert_eq!(
            status(&position("4k3/8/8/8/8/8/8/4K3 w - - 0 1")),
            GameStatus::DrawByInsufficientMaterial
        );
    }

    #[test]
    fn fifty_quiet_moves_per_side_draw() {
        // Knights shuffle out and back; no pawn move or capture for 100 plies.
        let shuffle = [(6, 21), (62, 45), (21, 6), (45, 62)];
        let script: Vec<_> = shuffle.iter().copied().cycle().take(100).collect();
        let positions = play_coordinates(&Position::new_game(), &script);

        let before_last = &positions[99];
        assert_eq!(before_last.halfmove_clock(), 99);
        assert_ne!(status(before_last), GameStatus::DrawByFiftyMove);

        let last = positions.last().expect("scripted game has positions");
        assert_eq!(last.halfmove_clock(), 100);
        assert_eq!(status(last), GameStatus::DrawByFiftyMove);
    }

    #[test]
    fn third_occurrence_is_a_repetition_draw() {
        let shuffle = [(6, 21), (62, 45), (21, 6), (45, 62)];
        let script: Vec<_> = shuffle.iter().copied().cycle().take(8).collect();
        let positions = play_coordinates(&Position::new_game(), &script);

        // Start position occurs at plies 0, 4 and 8.
        let (last, earlier) = positions.split_last().expect("scripted game has positions");
        assert_eq!(status_in_game(last, earlier), GameStatus::DrawByRepetition);
        assert_eq!(status(last), GameStatus::Ongoing);

        let (fifth, before_fifth) = positions[..5].split_last().expect("prefix is non-empty");
        assert_eq!(status_in_game(fifth, before_fifth), GameStatus::Ongoing);
    }

    #[test]
    fn checkmate_takes_precedence_over_fifty_move_rule() {
        let mate = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 120 3");
        assert_eq!(status(&mate), GameStatus::Checkmate);
    }

    #[test]
    fn result_tokens_follow_the_loser() {
        assert_eq!(GameStatus::Checkmate.result_token(Color::Light), "0-1");
        assert_eq!(GameStatus::Checkmate.result_token(Color::Dark), "1-0");
        assert_eq!(GameStatus::Stalemate.result_token(Color::Light), "1/2-1/2");
        assert_eq!(GameStatus::Ongoing.result_token(Color::Light), "*");
    }
}

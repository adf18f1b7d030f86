//! Reply selection: five tiers tried in order, the first that produces a
//! move wins.
//!
//! 1. a move that checkmates, or on Hard one that forces mate next move,
//! 2. the external evaluator's suggestion, when one is configured and
//!    answers in time with a legal move,
//! 3. a book reply to a known opening, during the first plies only,
//! 4. the best capture that does not lose material on the exchange,
//! 5. the best positional move.
//!
//! Every tier only ever picks from the legal move list, and ties are broken
//! by [`Move::ordering_key`], so selection is deterministic whenever the
//! evaluator is absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::engines::engine_trait::{DelegateEvaluator, SearchLimits};
use crate::engines::positional::{score_transition, PositionalWeights};
use crate::engines::tactics::{capture_score, delivers_mate};
use crate::errors::StrategyError;
use crate::game_state::chess_types::{Color, Move};
use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::legal_moves_with_positions;
use crate::notation::long_algebraic::parse_coordinate;
use crate::notation::move_parser::{parse, ParsedInput};

/// Book replies keyed by the board field of the FEN, preferred reply first.
const OPENING_BOOK: &[(&str, &[&str])] = &[
    // 1.e4
    ("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR", &["c5", "e5", "c6"]),
    // 1.d4
    ("rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR", &["Nf6", "d5", "f5"]),
    // Italian Game
    ("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R", &["f5", "Be7", "Nf6"]),
];

/// The book is only consulted while fewer plies than this have been played.
pub const OPENING_BOOK_PLIES: u16 = 12;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    #[default]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    MatingMove,
    Delegate,
    OpeningBook,
    Capture,
    Positional,
}

impl Tier {
    pub const ORDER: [Tier; 5] = [
        Tier::MatingMove,
        Tier::Delegate,
        Tier::OpeningBook,
        Tier::Capture,
        Tier::Positional,
    ];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::MatingMove => "mating move",
            Tier::Delegate => "external evaluator",
            Tier::OpeningBook => "opening book",
            Tier::Capture => "capture",
            Tier::Positional => "positional",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub mv: Move,
    pub tier: Tier,
}

/// A legal move paired with the position it leads to.
type Candidate = (Move, Position);

#[derive(Default)]
pub struct StrategyEngine {
    delegate: Option<Box<dyn DelegateEvaluator>>,
    limits: SearchLimits,
}

impl StrategyEngine {
    /// Local heuristics only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delegate(delegate: Box<dyn DelegateEvaluator>, limits: SearchLimits) -> Self {
        Self {
            delegate: Some(delegate),
            limits,
        }
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    /// Evaluator limits for a difficulty: Hard uses the configured limits,
    /// lower difficulties think for less time and to a shallower depth.
    pub fn limits_for(&self, difficulty: Difficulty) -> SearchLimits {
        let (divisor, max_depth) = match difficulty {
            Difficulty::Hard => return self.limits,
            Difficulty::Medium => (2, 10),
            Difficulty::Easy => (4, 5),
        };
        SearchLimits {
            movetime_ms: (self.limits.movetime_ms / divisor).max(1),
            depth: Some(self.limits.depth.map_or(max_depth, |depth| depth.min(max_depth))),
            timeout: self.limits.timeout,
        }
    }

    #[instrument(skip_all, fields(fen = %position, %difficulty))]
    pub fn select_move(
        &self,
        position: &Position,
        difficulty: Difficulty,
    ) -> Result<Selection, StrategyError> {
        let candidates = legal_moves_with_positions(position);
        if candidates.is_empty() {
            return Err(StrategyError::NoLegalMoves {
                fen: position.to_fen(),
            });
        }

        for tier in Tier::ORDER {
            let picked = match tier {
                Tier::MatingMove => mating_move(&candidates).or_else(|| match difficulty {
                    Difficulty::Hard => mate_in_two(&candidates),
                    Difficulty::Easy | Difficulty::Medium => None,
                }),
                Tier::Delegate => self.delegate_move(position, &candidates, difficulty),
                Tier::OpeningBook => opening_book_move(position),
                Tier::Capture => capture_move(&candidates, difficulty),
                Tier::Positional => positional_move(position, &candidates, difficulty),
            };
            if let Some(mv) = picked {
                debug!(%tier, from = mv.from, to = mv.to, "tier produced a move");
                return Ok(Selection { mv, tier });
            }
        }

        // The positional tier scores every candidate, so it cannot come up
        // empty on a non-empty list.
        Err(StrategyError::NoLegalMoves {
            fen: position.to_fen(),
        })
    }

    fn delegate_move(
        &self,
        position: &Position,
        candidates: &[Candidate],
        difficulty: Difficulty,
    ) -> Option<Move> {
        let delegate = self.delegate.as_ref()?;
        let limits = self.limits_for(difficulty);

        let answer = match delegate.best_move(position, &limits) {
            Ok(answer) => answer,
            Err(err) => {
                warn!(evaluator = delegate.name(), error = %err, "evaluator failed, using local heuristics");
                return None;
            }
        };

        let legal = parse_coordinate(&answer).and_then(|text| {
            candidates
                .iter()
                .map(|(mv, _)| *mv)
                .find(|mv| mv.from == text.from && mv.to == text.to && mv.promotion == text.promotion)
        });
        if legal.is_none() {
            warn!(evaluator = delegate.name(), %answer, "evaluator suggested an illegal move");
        }
        legal
    }
}

/// Highest score wins; equal scores go to the lowest ordering key.
fn best_scored(scored: impl IntoIterator<Item = (Move, i32)>) -> Option<Move> {
    scored
        .into_iter()
        .max_by(|(a, score_a), (b, score_b)| {
            score_a
                .cmp(score_b)
                .then_with(|| b.ordering_key().cmp(&a.ordering_key()))
        })
        .map(|(mv, _)| mv)
}

pub fn mating_move(candidates: &[Candidate]) -> Option<Move> {
    candidates
        .iter()
        .filter(|(_, after)| delivers_mate(after))
        .map(|(mv, _)| *mv)
        .min_by_key(Move::ordering_key)
}

/// A move after which the opponent has replies, and every one of them
/// walks into a mate.
pub fn mate_in_two(candidates: &[Candidate]) -> Option<Move> {
    candidates
        .iter()
        .filter(|(_, after)| every_reply_allows_mate(after))
        .map(|(mv, _)| *mv)
        .min_by_key(Move::ordering_key)
}

fn every_reply_allows_mate(after: &Position) -> bool {
    let replies = legal_moves_with_positions(after);
    !replies.is_empty()
        && replies.iter().all(|(_, reply)| {
            legal_moves_with_positions(reply)
                .iter()
                .any(|(_, finish)| delivers_mate(finish))
        })
}

fn plies_played(position: &Position) -> u16 {
    let black_to_move = u16::from(position.side_to_move() == Color::Dark);
    position
        .fullmove_number()
        .saturating_sub(1)
        .saturating_mul(2)
        .saturating_add(black_to_move)
}

/// First listed book reply that is legal here, if the board is a book
/// position and the game is still young.
pub fn opening_book_move(position: &Position) -> Option<Move> {
    if plies_played(position) >= OPENING_BOOK_PLIES {
        return None;
    }
    let fen = position.to_fen();
    let board = fen.split(' ').next()?;
    let (_, replies) = OPENING_BOOK.iter().find(|(key, _)| *key == board)?;
    replies.iter().find_map(|san| match parse(san, position) {
        Ok(ParsedInput::Move(mv)) => Some(mv),
        _ => None,
    })
}

/// Captures that do not lose material on the exchange. Easy ignores the
/// recapture risk.
pub fn capture_move(candidates: &[Candidate], difficulty: Difficulty) -> Option<Move> {
    let include_risk = difficulty != Difficulty::Easy;
    best_scored(
        candidates
            .iter()
            .filter_map(|(mv, after)| Some((*mv, capture_score(after, mv, include_risk)?)))
            .filter(|&(_, score)| score >= 0),
    )
}

pub fn positional_move(
    position: &Position,
    candidates: &[Candidate],
    difficulty: Difficulty,
) -> Option<Move> {
    let weights = PositionalWeights::for_difficulty(difficulty);
    best_scored(
        candidates
            .iter()
            .map(|(mv, after)| (*mv, score_transition(position, after, &weights))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DelegateError;
    use crate::move_generation::game_status::status;
    use crate::move_generation::legal_move_apply::apply;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::notation::long_algebraic::to_coordinate;
    use rand::rngs::StdRng;
    use rand::seq::IndexedRandom;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("test FEN should parse")
    }

    /// Evaluator with a canned answer that records the limits it was given.
    struct CannedEvaluator {
        answer: Result<String, ()>,
        seen: Arc<Mutex<Vec<SearchLimits>>>,
    }

    impl CannedEvaluator {
        fn boxed(answer: Result<&str, ()>) -> (Box<dyn DelegateEvaluator>, Arc<Mutex<Vec<SearchLimits>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let evaluator = CannedEvaluator {
                answer: answer.map(str::to_owned),
                seen: Arc::clone(&seen),
            };
            (Box::new(evaluator), seen)
        }
    }

    impl DelegateEvaluator for CannedEvaluator {
        fn name(&self) -> &str {
            "canned"
        }

        fn best_move(&self, _: &Position, limits: &SearchLimits) -> Result<String, DelegateError> {
            self.seen.lock().expect("lock").push(*limits);
            self.answer
                .clone()
                .map_err(|()| DelegateError::Timeout(limits.timeout))
        }
    }

    #[test]
    fn mating_move_beats_a_free_queen_sized_capture() {
        // Qd8 mates on the back rank; Qxa4 would win a loose rook.
        let board = position("6k1/5ppp/8/8/r7/8/8/3Q2K1 w - - 0 1");
        let candidates = legal_moves_with_positions(&board);
        let capture = capture_move(&candidates, Difficulty::Hard).expect("a capture exists");
        assert_eq!(to_coordinate(&capture), "d1a4");

        let selection = StrategyEngine::new()
            .select_move(&board, Difficulty::Hard)
            .expect("moves exist");
        assert_eq!(selection.tier, Tier::MatingMove);
        assert_eq!(to_coordinate(&selection.mv), "d1d8");
    }

    #[test]
    fn hard_finds_a_forced_mate_in_two() {
        // Ra7 leaves only Kg8, then Rb8 mates; nothing mates at once.
        let board = position("7k/8/R7/1R6/8/8/8/K7 w - - 0 1");
        let candidates = legal_moves_with_positions(&board);
        assert_eq!(mating_move(&candidates), None);

        let selection = StrategyEngine::new()
            .select_move(&board, Difficulty::Hard)
            .expect("moves exist");
        assert_eq!(selection.tier, Tier::MatingMove);
        let after = apply(&board, &selection.mv);
        let replies = legal_moves_with_positions(&after);
        assert!(!replies.is_empty());
        for (_, reply) in &replies {
            assert!(mating_move(&legal_moves_with_positions(reply)).is_some());
        }

        for difficulty in [Difficulty::Easy, Difficulty::Medium] {
            let selection = StrategyEngine::new()
                .select_move(&board, difficulty)
                .expect("moves exist");
            assert_ne!(selection.tier, Tier::MatingMove);
        }
    }

    #[test]
    fn stalemating_moves_are_not_forced_mates() {
        // Qb6 would leave the cornered king without a move.
        let board = position("k7/8/2K5/8/8/8/8/1Q6 w - - 0 1");
        let candidates = legal_moves_with_positions(&board);
        let stalemate = candidates
            .iter()
            .find(|(mv, _)| to_coordinate(mv) == "b1b6")
            .expect("Qb6 is legal");
        assert!(legal_moves_with_positions(&stalemate.1).is_empty());
        assert!(!every_reply_allows_mate(&stalemate.1));
    }

    #[test]
    fn book_replies_to_known_openings() {
        let engine = StrategyEngine::new();
        let cases = [
            ("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1", "c7c5"),
            ("rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1", "g8f6"),
            ("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3", "f7f5"),
        ];
        for (fen, expected) in cases {
            let selection = engine
                .select_move(&position(fen), Difficulty::Easy)
                .expect("moves exist");
            assert_eq!(selection.tier, Tier::OpeningBook, "{fen}");
            assert_eq!(to_coordinate(&selection.mv), expected, "{fen}");
        }
    }

    #[test]
    fn book_is_ignored_once_the_opening_is_over() {
        let late = position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 7");
        assert_eq!(opening_book_move(&late), None);
        let selection = StrategyEngine::new()
            .select_move(&late, Difficulty::Hard)
            .expect("moves exist");
        assert_ne!(selection.tier, Tier::OpeningBook);
        assert_eq!(opening_book_move(&Position::new_game()), None);
    }

    #[test]
    fn evaluator_answer_outranks_the_book() {
        let (evaluator, _) = CannedEvaluator::boxed(Ok("e7e5"));
        let engine = StrategyEngine::with_delegate(evaluator, SearchLimits::default());
        let after_e4 = position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        let selection = engine.select_move(&after_e4, Difficulty::Hard).expect("moves exist");
        assert_eq!(selection.tier, Tier::Delegate);
        assert_eq!(to_coordinate(&selection.mv), "e7e5");
    }

    #[test]
    fn losing_captures_are_skipped_on_hard_but_not_easy() {
        // Qxd5 wins a pawn but drops the queen to the e6 pawn.
        let board = position("4k3/8/4p3/3p4/8/8/3Q4/4K3 w - - 0 1");
        let candidates = legal_moves_with_positions(&board);
        assert_eq!(capture_move(&candidates, Difficulty::Hard), None);
        let easy = capture_move(&candidates, Difficulty::Easy).expect("easy ignores risk");
        assert_eq!(to_coordinate(&easy), "d2d5");

        let selection = StrategyEngine::new()
            .select_move(&board, Difficulty::Hard)
            .expect("moves exist");
        assert_eq!(selection.tier, Tier::Positional);
        assert_ne!(to_coordinate(&selection.mv), "d2d5");
    }

    #[test]
    fn best_capture_wins_and_ties_follow_move_ordering() {
        // Both rooks can take a loose knight; the a-file rook sorts first.
        let board = position("4k3/8/8/8/8/8/R1n4R/4K3 w - - 0 1");
        let candidates = legal_moves_with_positions(&board);
        let mv = capture_move(&candidates, Difficulty::Hard).expect("captures exist");
        assert_eq!(to_coordinate(&mv), "a2c2");
    }

    #[test]
    fn opening_reply_is_deterministic_without_evaluator() {
        let engine = StrategyEngine::new();
        let start = Position::new_game();
        let first = engine.select_move(&start, Difficulty::Hard).expect("moves exist");
        let second = engine.select_move(&start, Difficulty::Hard).expect("moves exist");
        assert_eq!(first, second);
        assert_eq!(first.tier, Tier::Positional);
        assert_eq!(to_coordinate(&first.mv), "d2d4");
    }

    #[test]
    fn legal_evaluator_answer_is_used() {
        let (evaluator, _) = CannedEvaluator::boxed(Ok("g1f3"));
        let engine = StrategyEngine::with_delegate(evaluator, SearchLimits::default());
        let selection = engine
            .select_move(&Position::new_game(), Difficulty::Hard)
            .expect("moves exist");
        assert_eq!(selection.tier, Tier::Delegate);
        assert_eq!(to_coordinate(&selection.mv), "g1f3");
    }

    #[test]
    fn illegal_or_failed_evaluator_falls_through() {
        for answer in [Ok("e2e5"), Ok("nonsense"), Err(())] {
            let (evaluator, _) = CannedEvaluator::boxed(answer);
            let engine = StrategyEngine::with_delegate(evaluator, SearchLimits::default());
            let selection = engine
                .select_move(&Position::new_game(), Difficulty::Hard)
                .expect("moves exist");
            assert_eq!(selection.tier, Tier::Positional);
        }
    }

    #[test]
    fn mate_is_found_before_asking_the_evaluator() {
        let (evaluator, seen) = CannedEvaluator::boxed(Ok("g1h1"));
        let engine = StrategyEngine::with_delegate(evaluator, SearchLimits::default());
        let board = position("6k1/5ppp/8/8/r7/8/8/3Q2K1 w - - 0 1");
        let selection = engine.select_move(&board, Difficulty::Hard).expect("moves exist");
        assert_eq!(selection.tier, Tier::MatingMove);
        assert!(seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn difficulty_scales_evaluator_limits() {
        let (evaluator, seen) = CannedEvaluator::boxed(Ok("e2e4"));
        let limits = SearchLimits {
            movetime_ms: 4_000,
            depth: Some(15),
            timeout: Duration::from_secs(6),
        };
        let engine = StrategyEngine::with_delegate(evaluator, limits);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            engine
                .select_move(&Position::new_game(), difficulty)
                .expect("moves exist");
        }
        let seen = seen.lock().expect("lock");
        assert_eq!(
            seen.iter().map(|l| (l.movetime_ms, l.depth)).collect::<Vec<_>>(),
            vec![(1_000, Some(5)), (2_000, Some(10)), (4_000, Some(15))]
        );
        assert!(seen.iter().all(|l| l.timeout == Duration::from_secs(6)));
    }

    #[test]
    fn terminal_position_reports_no_legal_moves() {
        let mated = position("3Q2k1/5ppp/8/8/r7/8/8/6K1 b - - 1 1");
        assert!(matches!(
            StrategyEngine::new().select_move(&mated, Difficulty::Hard),
            Err(StrategyError::NoLegalMoves { .. })
        ));
    }

    #[test]
    fn selected_replies_are_always_legal() {
        let engine = StrategyEngine::new();
        let mut rng = StdRng::seed_from_u64(0xA1_5EED);
        let mut board = Position::new_game();

        for ply in 0..120 {
            if status(&board).is_terminal() {
                board = Position::new_game();
                continue;
            }
            let legal = legal_moves(&board);
            let difficulty = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard][ply % 3];
            let selection = engine.select_move(&board, difficulty).expect("non-terminal");
            assert!(legal.contains(&selection.mv), "illegal reply in {board}");

            let random = *legal.choose(&mut rng).expect("non-terminal");
            board = apply(&board, &random);
        }
    }
}

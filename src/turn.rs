//! One trigger: a human move (or `reset`) and the automated reply, committed
//! together.

use serde::Serialize;
use tracing::{info, instrument};

use crate::engines::strategy::{Difficulty, StrategyEngine, Tier};
use crate::errors::TurnError;
use crate::game_state::chess_types::Move;
use crate::game_state::position::Position;
use crate::move_generation::game_status::{status_in_game, GameStatus};
use crate::move_generation::legal_move_apply::apply;
use crate::notation::long_algebraic::to_coordinate;
use crate::notation::move_parser::{parse, ParsedInput};
use crate::notation::san::format_san;
use crate::store::game_state_store::{GameStateStore, Ply};

pub const DEFAULT_AI_IDENTITY: &str = "AI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSettings {
    pub ai_identity: String,
    pub difficulty: Difficulty,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            ai_identity: DEFAULT_AI_IDENTITY.to_owned(),
            difficulty: Difficulty::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlyReport {
    pub mover: String,
    pub san: String,
    pub coordinate: String,
    /// Tier that picked the move; `None` for human moves.
    pub tier: Option<Tier>,
}

impl PlyReport {
    fn new(mover: &str, before: &Position, mv: &Move, tier: Option<Tier>) -> Self {
        Self {
            mover: mover.to_owned(),
            san: format_san(before, mv),
            coordinate: to_coordinate(mv),
            tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Reset {
        game_id: u64,
    },
    Played {
        human: PlyReport,
        /// Absent when the human move ended the game.
        reply: Option<PlyReport>,
        status: GameStatus,
    },
}

/// Process one line of input from `mover`.
///
/// Parse errors and game-over rejections leave the store unchanged; a played
/// turn is committed as a single transaction.
#[instrument(skip(store, strategy, settings), fields(difficulty = %settings.difficulty))]
pub fn process_turn(
    store: &mut GameStateStore,
    strategy: &StrategyEngine,
    settings: &TurnSettings,
    mover: &str,
    text: &str,
) -> Result<TurnOutcome, TurnError> {
    let current = store.current().clone();
    let status = store.status();

    let mv = match parse(text, &current) {
        Ok(ParsedInput::Reset) => {
            let game_id = store.reset().id;
            info!(mover, game_id, "game reset");
            return Ok(TurnOutcome::Reset { game_id });
        }
        _ if status.is_terminal() => return Err(TurnError::GameOver(status)),
        Ok(ParsedInput::Move(mv)) => mv,
        Err(err) => return Err(err.into()),
    };

    let history: Vec<Position> = store.current_record().positions().cloned().collect();
    let human = PlyReport::new(mover, &current, &mv, None);
    let after_human = apply(&current, &mv);
    let mut plies = vec![Ply::new(mover, mv, after_human.clone())];
    info!(mover, san = %human.san, "accepted move");

    let mut reply = None;
    if !status_in_game(&after_human, &history).is_terminal() {
        let selection = strategy.select_move(&after_human, settings.difficulty)?;
        let report = PlyReport::new(
            &settings.ai_identity,
            &after_human,
            &selection.mv,
            Some(selection.tier),
        );
        info!(san = %report.san, tier = %selection.tier, "reply selected");
        let after_reply = apply(&after_human, &selection.mv);
        plies.push(Ply::new(settings.ai_identity.as_str(), selection.mv, after_reply));
        reply = Some(report);
    }

    let status = store.commit_turn(&plies)?;
    Ok(TurnOutcome::Played {
        human,
        reply,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Grammar, MoveParseError, StoreError};
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::store::game_record::Closing;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("test FEN should parse")
    }

    fn run(store: &mut GameStateStore, mover: &str, text: &str) -> Result<TurnOutcome, TurnError> {
        process_turn(store, &StrategyEngine::new(), &TurnSettings::default(), mover, text)
    }

    #[test]
    fn opening_move_gets_a_legal_reply() {
        let mut store = GameStateStore::new();
        let outcome = run(&mut store, "alice", "e2e4").expect("legal move");

        let TurnOutcome::Played { human, reply, status } = outcome else {
            panic!("expected a played turn");
        };
        assert_eq!(human.san, "e4");
        assert_eq!(human.coordinate, "e2e4");
        assert_eq!(human.tier, None);
        assert_eq!(status, GameStatus::Ongoing);

        let entries = &store.current_record().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].position_after.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        let reply = reply.expect("the AI answers");
        assert_eq!(reply.mover, "AI");
        assert!(reply.tier.is_some());
        assert!(legal_moves(&entries[0].position_after).contains(&entries[1].mv));
        assert_eq!(store.current(), &entries[1].position_after);
        assert_eq!(entries[1].san, reply.san);
    }

    #[test]
    fn reset_opens_a_fresh_game_and_keeps_history() {
        let mut store = GameStateStore::new();
        run(&mut store, "alice", "d4").expect("legal move");
        let outcome = run(&mut store, "alice", "  RESET ").expect("reset");

        assert_eq!(outcome, TurnOutcome::Reset { game_id: 2 });
        assert_eq!(store.current(), &Position::new_game());
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.records()[0].closing, Closing::Abandoned);
        assert_eq!(store.records()[0].entries.len(), 2);
        assert!(store.current_record().entries.is_empty());
    }

    #[test]
    fn ambiguous_move_commits_nothing() {
        let board = position("4k3/8/8/8/8/8/3N3N/4K3 w - - 0 1");
        let mut store = GameStateStore::with_initial(board.clone());
        let err = run(&mut store, "alice", "Nf3").expect_err("two knights reach f3");
        assert!(matches!(
            err,
            TurnError::Parse(MoveParseError::Ambiguous { grammar: Grammar::Algebraic, .. })
        ));
        assert_eq!(store.current(), &board);
        assert!(store.current_record().entries.is_empty());
    }

    #[test]
    fn illegal_and_malformed_moves_commit_nothing() {
        let mut store = GameStateStore::new();
        assert!(matches!(
            run(&mut store, "alice", "e2e5"),
            Err(TurnError::Parse(MoveParseError::Illegal { .. }))
        ));
        assert!(matches!(
            run(&mut store, "alice", "please"),
            Err(TurnError::Parse(MoveParseError::Malformed { .. }))
        ));
        assert!(store.current_record().entries.is_empty());
    }

    #[test]
    fn mating_human_move_ends_the_game_without_reply() {
        let board = position("6k1/5ppp/8/8/8/8/8/3Q2K1 w - - 0 1");
        let mut store = GameStateStore::with_initial(board);

        let outcome = run(&mut store, "alice", "Qd8#").expect("legal move");
        let TurnOutcome::Played { reply, status, .. } = outcome else {
            panic!("expected a played turn");
        };
        assert_eq!(reply, None);
        assert_eq!(status, GameStatus::Checkmate);

        assert!(matches!(
            run(&mut store, "alice", "Kh1"),
            Err(TurnError::GameOver(GameStatus::Checkmate))
        ));
        assert!(matches!(
            run(&mut store, "alice", "garbage"),
            Err(TurnError::GameOver(_))
        ));
        assert_eq!(
            run(&mut store, "alice", "reset").expect("reset is always allowed"),
            TurnOutcome::Reset { game_id: 2 }
        );
    }

    #[test]
    fn ai_reply_that_mates_closes_the_game() {
        // After 1.f3 e5 the human plays 2.g4 and the AI finds Qh4#.
        let board = position("rnbqkbnr/pppp1ppp/8/4p3/8/5P2/PPPPP1PP/RNBQKBNR w KQkq - 0 2");
        let mut store = GameStateStore::with_initial(board);

        let outcome = run(&mut store, "alice", "g4").expect("legal move");
        let TurnOutcome::Played { reply, status, .. } = outcome else {
            panic!("expected a played turn");
        };
        let reply = reply.expect("the AI answers");
        assert_eq!(reply.san, "Qh4#");
        assert_eq!(reply.tier, Some(Tier::MatingMove));
        assert_eq!(status, GameStatus::Checkmate);
        assert!(matches!(
            store.commit_turn(&[]),
            Err(StoreError::GameOver(GameStatus::Checkmate))
        ));
    }
}

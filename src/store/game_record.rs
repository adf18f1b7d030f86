//! Append-only record of one game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::{Color, Move};
use crate::game_state::position::Position;
use crate::move_generation::game_status::GameStatus;

/// One ply as it was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub mover: String,
    pub color: Color,
    pub mv: Move,
    pub san: String,
    pub position_after: Position,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "status", rename_all = "snake_case")]
pub enum Closing {
    Open,
    Finished(GameStatus),
    /// Closed by a reset before the game reached a result.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    pub started_at: DateTime<Utc>,
    pub initial: Position,
    pub entries: Vec<RecordEntry>,
    pub closing: Closing,
}

impl GameRecord {
    pub fn new(id: u64, started_at: DateTime<Utc>) -> Self {
        Self::from_position(id, started_at, Position::new_game())
    }

    pub fn from_position(id: u64, started_at: DateTime<Utc>, initial: Position) -> Self {
        Self {
            id,
            started_at,
            initial,
            entries: Vec::new(),
            closing: Closing::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.closing == Closing::Open
    }

    /// Position after the last committed ply.
    pub fn current(&self) -> &Position {
        self.entries
            .last()
            .map_or(&self.initial, |entry| &entry.position_after)
    }

    /// Every position of the game, oldest first, ending with [`current`].
    ///
    /// [`current`]: GameRecord::current
    pub fn positions(&self) -> impl Iterator<Item = &Position> + '_ {
        std::iter::once(&self.initial).chain(self.entries.iter().map(|entry| &entry.position_after))
    }

    /// Positions before the current one, for repetition detection.
    pub fn earlier_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.positions().cloned().collect();
        positions.pop();
        positions
    }

    pub fn final_status(&self) -> Option<GameStatus> {
        match self.closing {
            Closing::Finished(status) => Some(status),
            Closing::Open | Closing::Abandoned => None,
        }
    }

    /// Color that delivered mate, if the game ended in checkmate.
    pub fn winner(&self) -> Option<Color> {
        (self.final_status() == Some(GameStatus::Checkmate))
            .then(|| self.current().side_to_move().opposite())
    }

    /// PGN result token: `1-0`, `0-1`, `1/2-1/2` or `*`.
    pub fn result_token(&self) -> &'static str {
        self.final_status()
            .map_or("*", |status| status.result_token(self.current().side_to_move()))
    }

    /// Identity that played `color` most recently in this game.
    pub fn player_of(&self, color: Color) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.color == color)
            .map(|entry| entry.mover.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_apply::apply;
    use crate::notation::move_parser::{parse, ParsedInput};
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().expect("valid timestamp")
    }

    fn play(record: &mut GameRecord, mover: &str, text: &str) {
        let before = record.current().clone();
        let ParsedInput::Move(mv) = parse(text, &before).expect("legal move") else {
            panic!("expected a move");
        };
        record.entries.push(RecordEntry {
            mover: mover.to_owned(),
            color: before.side_to_move(),
            mv,
            san: text.to_owned(),
            position_after: apply(&before, &mv),
            played_at: at(1_700_000_000 + record.entries.len() as i64),
        });
    }

    #[test]
    fn fools_mate_record_reports_the_winner() {
        let mut record = GameRecord::new(1, at(1_700_000_000));
        for (mover, text) in [("alice", "f3"), ("AI", "e5"), ("alice", "g4"), ("AI", "Qh4#")] {
            play(&mut record, mover, text);
        }
        record.closing = Closing::Finished(GameStatus::Checkmate);

        assert_eq!(record.winner(), Some(Color::Dark));
        assert_eq!(record.result_token(), "0-1");
        assert_eq!(record.player_of(Color::Light), Some("alice"));
        assert_eq!(record.player_of(Color::Dark), Some("AI"));
        assert_eq!(record.positions().count(), 5);
        assert_eq!(record.earlier_positions().len(), 4);
    }

    #[test]
    fn open_record_has_no_result() {
        let record = GameRecord::new(7, at(0));
        assert!(record.is_open());
        assert_eq!(record.current(), &Position::new_game());
        assert_eq!(record.winner(), None);
        assert_eq!(record.result_token(), "*");
        assert!(record.earlier_positions().is_empty());
    }

    #[test]
    fn record_serializes_positions_as_fen() {
        let mut record = GameRecord::new(3, at(1_700_000_000));
        play(&mut record, "bob", "e2e4");
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1\""));
        assert!(json.contains("\"state\":\"open\""));
        let back: GameRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
    }
}

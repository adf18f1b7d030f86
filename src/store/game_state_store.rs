//! Owner of the current game and the full game history.
//!
//! The store is the only place positions change between triggers. Every
//! transition goes through [`GameStateStore::commit_turn`] (or
//! [`GameStateStore::reset`]), which validates the whole batch of plies
//! against the running position before appending anything, so a rejected
//! turn leaves the store untouched.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::StoreError;
use crate::game_state::chess_types::Move;
use crate::game_state::position::Position;
use crate::move_generation::game_status::{status_in_game, GameStatus};
use crate::move_generation::legal_move_apply::apply;
use crate::move_generation::legal_move_generator::is_legal;
use crate::notation::long_algebraic::to_coordinate;
use crate::notation::san::format_san;
use crate::store::game_record::{Closing, GameRecord, RecordEntry};

/// One ply offered for commit: the move and the position it claims to
/// produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ply {
    pub mover: String,
    pub mv: Move,
    pub position: Position,
}

impl Ply {
    pub fn new(mover: impl Into<String>, mv: Move, position: Position) -> Self {
        Self {
            mover: mover.into(),
            mv,
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateStore {
    /// Oldest first. Never empty; the last record is the current game.
    records: Vec<GameRecord>,
}

impl Default for GameStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStateStore {
    pub fn new() -> Self {
        Self {
            records: vec![GameRecord::new(1, Utc::now())],
        }
    }

    /// A store whose first game starts from `initial` instead of the
    /// standard position. Later resets use the standard position.
    pub fn with_initial(initial: Position) -> Self {
        Self {
            records: vec![GameRecord::from_position(1, Utc::now(), initial)],
        }
    }

    /// Load the store from `path`, or start a fresh one when the file does
    /// not exist yet.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "no state file, starting a fresh store");
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Write the store to `path` atomically: a sibling temp file is written
    /// first and renamed over the target.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = self.to_json()?;
        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;
        debug!(path = %path.display(), records = self.records.len(), "saved game state");
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let mut store: Self = serde_json::from_str(text)?;
        if store.records.is_empty() {
            store.records.push(GameRecord::new(1, Utc::now()));
        }
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn current_record(&self) -> &GameRecord {
        // `records` is never empty.
        &self.records[self.records.len() - 1]
    }

    fn current_record_mut(&mut self) -> &mut GameRecord {
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    pub fn current(&self) -> &Position {
        self.current_record().current()
    }

    /// Status of the current position, repetition included.
    pub fn status(&self) -> GameStatus {
        let record = self.current_record();
        match record.closing {
            Closing::Finished(status) => status,
            Closing::Open | Closing::Abandoned => {
                status_in_game(record.current(), &record.earlier_positions())
            }
        }
    }

    /// Commit a single ply.
    pub fn commit(
        &mut self,
        position: Position,
        mv: Move,
        mover: &str,
    ) -> Result<&RecordEntry, StoreError> {
        self.commit_turn(&[Ply::new(mover, mv, position)])?;
        self.current_record()
            .entries
            .last()
            .ok_or_else(|| StoreError::Diverged("nothing was committed".to_owned()))
    }

    /// Commit several plies as one transaction and return the status after
    /// the last one. Nothing is appended unless every ply is legal in the
    /// position the previous one left, produces exactly the position it
    /// claims, and the game is still in progress when it is played.
    #[instrument(skip_all, fields(game = self.current_record().id, plies = plies.len()))]
    pub fn commit_turn(&mut self, plies: &[Ply]) -> Result<GameStatus, StoreError> {
        let record = self.current_record();
        if let Closing::Finished(status) = record.closing {
            return Err(StoreError::GameOver(status));
        }

        let mut history = record.earlier_positions();
        let mut running = record.current().clone();
        let mut entries = Vec::with_capacity(plies.len());

        for ply in plies {
            let before = status_in_game(&running, &history);
            if before.is_terminal() {
                return Err(StoreError::GameOver(before));
            }
            if !is_legal(&running, &ply.mv) {
                return Err(StoreError::Diverged(format!(
                    "{} is not legal in {}",
                    to_coordinate(&ply.mv),
                    running
                )));
            }
            let expected = apply(&running, &ply.mv);
            if expected != ply.position {
                return Err(StoreError::Diverged(format!(
                    "expected {expected} after the move, got {}",
                    ply.position
                )));
            }

            entries.push(RecordEntry {
                mover: ply.mover.clone(),
                color: running.side_to_move(),
                mv: ply.mv,
                san: format_san(&running, &ply.mv),
                position_after: expected.clone(),
                played_at: Utc::now(),
            });
            history.push(std::mem::replace(&mut running, expected));
        }

        let status = status_in_game(&running, &history);
        let record = self.current_record_mut();
        record.entries.extend(entries);
        if status.is_terminal() {
            record.closing = Closing::Finished(status);
            info!(game = record.id, %status, "game finished");
        }
        Ok(status)
    }

    /// Close the current game and start a new one from the standard initial
    /// position. Earlier records are kept.
    #[instrument(skip_all)]
    pub fn reset(&mut self) -> &GameRecord {
        let previous = self.current_record_mut();
        if previous.is_open() {
            previous.closing = Closing::Abandoned;
        }
        let id = previous.id + 1;
        self.records.push(GameRecord::new(id, Utc::now()));
        info!(game = id, "started a new game");
        self.current_record()
    }
}

//! Replay of the game history into per-player statistics.
//!
//! Nothing here is stored incrementally: [`recompute`] walks every record
//! from the beginning each time, so the output is a pure function of the
//! history.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::Color;
use crate::ledger::achievements::{unlocked_by, AchievementId};
use crate::ledger::move_quality::{classify, MoveQuality};
use crate::store::game_record::GameRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub identity: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub moves: u32,
    pub brilliant_moves: u32,
    pub blunders: u32,
    pub last_active: Option<DateTime<Utc>>,
    pub achievements: BTreeSet<AchievementId>,
}

impl PlayerStat {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            games: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            moves: 0,
            brilliant_moves: 0,
            blunders: 0,
            last_active: None,
            achievements: BTreeSet::new(),
        }
    }

    /// Three points per win, one per draw.
    pub fn score(&self) -> u32 {
        self.wins * 3 + self.draws
    }

    /// Games that reached a result. Open and abandoned games count towards
    /// `games` but not here.
    pub fn completed_games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Wins over decided and drawn games; zero before any result.
    pub fn win_rate(&self) -> f64 {
        let played = self.completed_games();
        if played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(played)
        }
    }
}

/// Statistics for every identity that appears in `records`, keyed by
/// identity.
pub fn recompute(records: &[GameRecord]) -> BTreeMap<String, PlayerStat> {
    let mut stats: BTreeMap<String, PlayerStat> = BTreeMap::new();

    for record in records {
        let mut colors: BTreeMap<&str, Color> = BTreeMap::new();

        for entry in &record.entries {
            let stat = stats
                .entry(entry.mover.clone())
                .or_insert_with(|| PlayerStat::new(entry.mover.clone()));
            stat.moves += 1;
            stat.last_active = stat.last_active.max(Some(entry.played_at));
            match classify(&entry.position_after, &entry.mv) {
                MoveQuality::Brilliant => stat.brilliant_moves += 1,
                MoveQuality::Blunder => stat.blunders += 1,
                MoveQuality::Good | MoveQuality::Normal => {}
            }
            colors.insert(entry.mover.as_str(), entry.color);
        }

        let winner = record.winner();
        let drawn = record.final_status().is_some_and(|status| status.is_draw());
        for (identity, color) in &colors {
            let Some(stat) = stats.get_mut(*identity) else {
                continue;
            };
            stat.games += 1;
            match winner {
                Some(winning) if winning == *color => stat.wins += 1,
                Some(_) => stat.losses += 1,
                None if drawn => stat.draws += 1,
                None => {}
            }
        }

        // Achievements are checked on the snapshot after every record and
        // never taken away.
        for stat in stats.values_mut() {
            let newly: Vec<AchievementId> = unlocked_by(stat).collect();
            stat.achievements.extend(newly);
        }
    }

    stats
}

//! Ranked leaderboard and whole-history summary.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ledger::player_stat::PlayerStat;
use crate::store::game_record::GameRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub identity: String,
    pub score: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: f64,
    pub moves: u32,
}

/// Rows sorted by score, then total moves (both descending), then identity.
pub fn leaderboard(stats: &BTreeMap<String, PlayerStat>) -> Vec<LeaderboardRow> {
    let mut ranked: Vec<&PlayerStat> = stats.values().collect();
    ranked.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| b.moves.cmp(&a.moves))
            .then_with(|| a.identity.cmp(&b.identity))
    });

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, stat)| LeaderboardRow {
            rank: index + 1,
            identity: stat.identity.clone(),
            score: stat.score(),
            wins: stat.wins,
            losses: stat.losses,
            draws: stat.draws,
            win_rate: stat.win_rate(),
            moves: stat.moves,
        })
        .collect()
}

/// Totals over the whole history. `ai_wins` and `human_wins` split decisive
/// games by whether the winning side was played by `ai_identity`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub total_games: usize,
    pub finished_games: usize,
    pub ai_wins: usize,
    pub human_wins: usize,
    pub draws: usize,
    pub total_moves: usize,
}

impl LedgerSummary {
    pub fn from_records(records: &[GameRecord], ai_identity: &str) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total_games += 1;
            summary.total_moves += record.entries.len();
            if let Some(status) = record.final_status() {
                summary.finished_games += 1;
                if status.is_draw() {
                    summary.draws += 1;
                }
            }
            if let Some(winner) = record.winner() {
                if record.player_of(winner) == Some(ai_identity) {
                    summary.ai_wins += 1;
                } else {
                    summary.human_wins += 1;
                }
            }
            summary
        })
    }
}

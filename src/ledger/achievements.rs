//! Achievement rules. Each rule is a predicate over a player snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::player_stat::PlayerStat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    CenturyPlayer,
    SpeedDemon,
    ChessMaster,
    RegularPlayer,
    ChessVeteran,
    BrilliantTactician,
    Winner,
    Champion,
    HighPerformer,
    ChessProdigy,
}

pub struct Achievement {
    pub id: AchievementId,
    pub label: &'static str,
    pub description: &'static str,
    pub unlocked: fn(&PlayerStat) -> bool,
}

pub const ACHIEVEMENTS: [Achievement; 10] = [
    Achievement {
        id: AchievementId::CenturyPlayer,
        label: "Century Player",
        description: "100+ moves",
        unlocked: |s| s.moves >= 100,
    },
    Achievement {
        id: AchievementId::SpeedDemon,
        label: "Speed Demon",
        description: "500+ moves",
        unlocked: |s| s.moves >= 500,
    },
    Achievement {
        id: AchievementId::ChessMaster,
        label: "Chess Master",
        description: "1000+ moves",
        unlocked: |s| s.moves >= 1000,
    },
    Achievement {
        id: AchievementId::RegularPlayer,
        label: "Regular Player",
        description: "10+ games",
        unlocked: |s| s.games >= 10,
    },
    Achievement {
        id: AchievementId::ChessVeteran,
        label: "Chess Veteran",
        description: "50+ games",
        unlocked: |s| s.games >= 50,
    },
    Achievement {
        id: AchievementId::BrilliantTactician,
        label: "Brilliant Tactician",
        description: "5+ brilliant moves",
        unlocked: |s| s.brilliant_moves >= 5,
    },
    Achievement {
        id: AchievementId::Winner,
        label: "Winner",
        description: "5+ victories",
        unlocked: |s| s.wins >= 5,
    },
    Achievement {
        id: AchievementId::Champion,
        label: "Champion",
        description: "10+ victories",
        unlocked: |s| s.wins >= 10,
    },
    Achievement {
        id: AchievementId::HighPerformer,
        label: "High Performer",
        description: "70%+ win rate over 5+ games",
        unlocked: |s| s.completed_games() >= 5 && s.win_rate() >= 0.7,
    },
    Achievement {
        id: AchievementId::ChessProdigy,
        label: "Chess Prodigy",
        description: "90%+ win rate over 10+ games",
        unlocked: |s| s.completed_games() >= 10 && s.win_rate() >= 0.9,
    },
];

impl AchievementId {
    pub fn rule(self) -> &'static Achievement {
        // ACHIEVEMENTS is declared in variant order.
        &ACHIEVEMENTS[self as usize]
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.rule();
        write!(f, "{} ({})", rule.label, rule.description)
    }
}

/// Achievements the snapshot satisfies right now.
pub fn unlocked_by(stat: &PlayerStat) -> impl Iterator<Item = AchievementId> + '_ {
    ACHIEVEMENTS
        .iter()
        .filter(move |achievement| (achievement.unlocked)(stat))
        .map(|achievement| achievement.id)
}

//! Error types for every boundary of the crate.
//!
//! Each layer owns one enum: input parsing and position decoding are
//! user-facing, delegate failures are recovered locally by the strategy, and
//! store/turn errors surface to the caller of a trigger.

use thiserror::Error;

use crate::move_generation::game_status::GameStatus;

/// Malformed position encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing {0} field in FEN")]
    MissingField(&'static str),

    #[error("FEN has extra trailing field '{0}'")]
    TrailingField(String),

    #[error("invalid board layout: {0}")]
    Board(String),

    #[error("invalid side-to-move field: {0}")]
    SideToMove(String),

    #[error("invalid castling rights field: {0}")]
    Castling(String),

    #[error("invalid en-passant square: {0}")]
    EnPassant(String),

    #[error("invalid {field}: {value}")]
    Counter { field: &'static str, value: String },

    #[error("{color} must have exactly one king, found {count}")]
    KingCount { color: &'static str, count: u32 },
}

/// Which input grammar a piece of move text resembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Grammar {
    Coordinate,
    Algebraic,
    Unrecognized,
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grammar::Coordinate => f.write_str("coordinate notation"),
            Grammar::Algebraic => f.write_str("algebraic notation"),
            Grammar::Unrecognized => f.write_str("unrecognized notation"),
        }
    }
}

/// Rejection of a human move string. Nothing is committed on any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("could not read '{text}' as a move ({grammar})")]
    Malformed { text: String, grammar: Grammar },

    #[error("'{text}' is ambiguous, it could mean any of: {}", candidates.join(", "))]
    Ambiguous {
        text: String,
        grammar: Grammar,
        candidates: Vec<String>,
    },

    #[error("'{text}' is not a legal move in this position ({grammar})")]
    Illegal { text: String, grammar: Grammar },
}

impl MoveParseError {
    pub fn grammar(&self) -> Grammar {
        match self {
            MoveParseError::Malformed { grammar, .. }
            | MoveParseError::Ambiguous { grammar, .. }
            | MoveParseError::Illegal { grammar, .. } => *grammar,
        }
    }
}

/// Reply selection failure. Only reachable when asked to move in a
/// terminal position, which the turn flow never does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("no legal moves available in position {fen}")]
    NoLegalMoves { fen: String },
}

/// External evaluator failure. Always recovered by falling through to the
/// local tiers.
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("failed to start evaluator '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("evaluator I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("evaluator did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("evaluator protocol error: {0}")]
    Protocol(String),

    #[error("evaluator reported no move")]
    NoMove,
}

/// Game state store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("commit diverges from the current position: {0}")]
    Diverged(String),

    #[error("game is over ({0}); submit 'reset' to start a new game")]
    GameOver(GameStatus),

    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Fen(#[from] FenError),
}

/// Failure of one trigger.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Parse(#[from] MoveParseError),

    #[error("game is over ({0}); submit 'reset' to start a new game")]
    GameOver(GameStatus),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

//! Capability interface for an external move evaluator.
//!
//! The reply strategy is fully functional without one; when configured, an
//! evaluator is consulted between the mating tier and the local heuristics.

use std::time::Duration;

use crate::errors::DelegateError;
use crate::game_state::position::Position;

/// Bounds for one evaluator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub movetime_ms: u64,
    pub depth: Option<u8>,
    /// Wall-clock budget for the whole exchange, including process start-up.
    pub timeout: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            movetime_ms: 5_000,
            depth: Some(15),
            timeout: Duration::from_millis(10_000),
        }
    }
}

pub trait DelegateEvaluator: Send {
    fn name(&self) -> &str;

    /// Best move for the side to move, in coordinate notation (`e2e4`,
    /// `e7e8q`). The caller validates the answer against the legal moves.
    fn best_move(&self, position: &Position, limits: &SearchLimits) -> Result<String, DelegateError>;
}

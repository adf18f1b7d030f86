//! Crate root module declarations for issue_chess.
//!
//! One game turn per external trigger: a human move is parsed and validated,
//! a reply is chosen by a tiered heuristic strategy (optionally backed by an
//! external UCI evaluator), and the result is committed to a persistent game
//! history from which the player ledger is derived.

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod position;
}

pub mod moves {
    pub mod attack_tables;
}

pub mod move_generation {
    pub mod game_status;
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
    pub mod pseudo_moves;
}

pub mod notation {
    pub mod algebraic;
    pub mod long_algebraic;
    pub mod move_parser;
    pub mod san;
}

pub mod search {
    pub mod zobrist;
}

pub mod engines {
    pub mod engine_trait;
    pub mod positional;
    pub mod strategy;
    pub mod tactics;
    pub mod uci_delegate;
}

pub mod store {
    pub mod game_record;
    pub mod game_state_store;
}

pub mod ledger {
    pub mod achievements;
    pub mod leaderboard;
    pub mod move_quality;
    pub mod player_stat;
}

pub mod utils {
    pub mod engine_match_harness;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod pgn;
    pub mod render_game_state;
}

pub mod config;
pub mod errors;
pub mod turn;

//! Command-line interface for issue_chess.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use issue_chess::config::DEFAULT_CONFIG_PATH;
use issue_chess::engines::strategy::Difficulty;

/// Turn-per-trigger chess against a heuristic AI
#[derive(Parser, Debug)]
#[command(name = "issue_chess", version, about, long_about = None)]
pub struct Cli {
    /// Config file; missing is fine, defaults apply
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Game state file, overriding the config
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// AI difficulty, overriding the config
    #[arg(long, global = true, value_enum)]
    pub difficulty: Option<Difficulty>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a move (SAN or coordinate notation) and let the AI reply
    Move {
        text: String,

        #[arg(short, long)]
        player: String,
    },

    /// Abandon the current game and start a new one
    Reset {
        #[arg(short, long)]
        player: String,
    },

    /// Show the board and game status
    Status,

    /// Print the ranked player table
    Leaderboard {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Export a game as PGN (the current game by default)
    Pgn {
        #[arg(short, long)]
        game: Option<u64>,
    },

    /// Play seeded random games against the AI into the state file
    Simulate {
        #[arg(short, long, default_value_t = 10)]
        games: u16,

        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
}

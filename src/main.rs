//! issue_chess binary: one trigger per invocation against a JSON state file.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use issue_chess::config::Config;
use issue_chess::engines::strategy::StrategyEngine;
use issue_chess::game_state::chess_types::Color;
use issue_chess::ledger::leaderboard::{leaderboard, LedgerSummary};
use issue_chess::ledger::player_stat::recompute;
use issue_chess::notation::move_parser::RESET_TOKEN;
use issue_chess::store::game_state_store::GameStateStore;
use issue_chess::turn::{process_turn, PlyReport, TurnOutcome, TurnSettings};
use issue_chess::utils::engine_match_harness::{play_match_series, MatchSeriesConfig};
use issue_chess::utils::pgn::write_pgn;
use issue_chess::utils::render_game_state::render_position;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(state) = cli.state {
        config.state_path = state;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }

    let mut store = GameStateStore::open(&config.state_path)
        .with_context(|| format!("loading {}", config.state_path.display()))?;
    let settings = config.turn_settings();

    match cli.command {
        Command::Move { text, player } => {
            let strategy = config.strategy_engine();
            let outcome = process_turn(&mut store, &strategy, &settings, &player, &text)?;
            save(&store, &config)?;
            print_outcome(&outcome);
            print_board(&store);
        }
        Command::Reset { player } => {
            let outcome = process_turn(&mut store, &StrategyEngine::new(), &settings, &player, RESET_TOKEN)?;
            save(&store, &config)?;
            print_outcome(&outcome);
            print_board(&store);
        }
        Command::Status => {
            print_board(&store);
            let record = store.current_record();
            println!("game {} ({} plies): {}", record.id, record.entries.len(), store.status());
        }
        Command::Leaderboard { limit } => print_leaderboard(&store, &settings, limit),
        Command::Pgn { game } => {
            let record = match game {
                Some(id) => match store.records().iter().find(|record| record.id == id) {
                    Some(record) => record,
                    None => bail!("no game with id {id}"),
                },
                None => store.current_record(),
            };
            print!("{}", write_pgn(record, &config.state_path.display().to_string()));
        }
        Command::Simulate { games, seed } => {
            let strategy = config.strategy_engine();
            let stats = play_match_series(
                &mut store,
                &strategy,
                &settings,
                &MatchSeriesConfig {
                    games,
                    base_seed: seed,
                    ..MatchSeriesConfig::default()
                },
            )?;
            save(&store, &config)?;
            info!(games, seed, "simulation finished");
            println!("{}", stats.report());
            print_leaderboard(&store, &settings, 10);
        }
    }
    Ok(())
}

fn save(store: &GameStateStore, config: &Config) -> Result<()> {
    store
        .save(&config.state_path)
        .with_context(|| format!("saving {}", config.state_path.display()))
}

fn print_outcome(outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::Reset { game_id } => println!("started game {game_id}"),
        TurnOutcome::Played { human, reply, status } => {
            print_ply(human);
            if let Some(reply) = reply {
                print_ply(reply);
            }
            println!("status: {status}");
        }
    }
}

fn print_ply(ply: &PlyReport) {
    match ply.tier {
        Some(tier) => println!("{}: {} ({}, {tier})", ply.mover, ply.san, ply.coordinate),
        None => println!("{}: {} ({})", ply.mover, ply.san, ply.coordinate),
    }
}

fn print_board(store: &GameStateStore) {
    println!("{}", render_position(store.current(), Color::Light));
}

fn print_leaderboard(store: &GameStateStore, settings: &TurnSettings, limit: usize) {
    let stats = recompute(store.records());
    println!("{:>4}  {:<20} {:>6} {:>4} {:>4} {:>4} {:>6} {:>6}", "rank", "player", "score", "W", "L", "D", "win%", "moves");
    for row in leaderboard(&stats).into_iter().take(limit) {
        println!(
            "{:>4}  {:<20} {:>6} {:>4} {:>4} {:>4} {:>5.1}% {:>6}",
            row.rank,
            row.identity,
            row.score,
            row.wins,
            row.losses,
            row.draws,
            row.win_rate * 100.0,
            row.moves
        );
    }

    let summary = LedgerSummary::from_records(store.records(), &settings.ai_identity);
    println!(
        "games {} (finished {}), AI wins {}, human wins {}, draws {}, moves {}",
        summary.total_games,
        summary.finished_games,
        summary.ai_wins,
        summary.human_wins,
        summary.draws,
        summary.total_moves
    );
    for stat in stats.values().filter(|stat| !stat.achievements.is_empty()) {
        let names: Vec<String> = stat.achievements.iter().map(ToString::to_string).collect();
        println!("{}: {}", stat.identity, names.join(", "));
    }
}

//! Seeded self-play harness: simulated humans against the reply strategy.
//!
//! Every simulated move goes through [`process_turn`] exactly like a real
//! trigger, so a series exercises parsing, the strategy, the store and (via
//! the resulting records) the ledger. Runs are reproducible for a given seed
//! as long as no external evaluator is configured.

use rand::seq::IndexedRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::engines::strategy::{Difficulty, StrategyEngine};
use crate::errors::TurnError;
use crate::move_generation::game_status::GameStatus;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::notation::long_algebraic::to_coordinate;
use crate::notation::move_parser::RESET_TOKEN;
use crate::store::game_state_store::GameStateStore;
use crate::turn::{process_turn, TurnOutcome, TurnSettings};

/// How the simulated human picks moves once the random opening is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedHuman {
    Random,
    Strategy(Difficulty),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOutcome {
    AiWin,
    HumanWin,
    Draw(GameStatus),
    /// Turn limit reached; the record is abandoned by the next reset.
    Unfinished,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Human moves per game, each followed by a reply.
    pub max_turns: u16,
    pub opening_min_plies: u8,
    pub opening_max_plies: u8,
    pub human: SimulatedHuman,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_turns: 150,
            opening_min_plies: 1,
            opening_max_plies: 4,
            human: SimulatedHuman::Random,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchSeriesConfig {
    pub games: u16,
    pub base_seed: u64,
    /// Identities the simulated humans play under; one is drawn per game.
    pub players: Vec<String>,
    pub per_game: MatchConfig,
}

impl Default for MatchSeriesConfig {
    fn default() -> Self {
        Self {
            games: 9,
            base_seed: 0,
            players: vec!["player".to_owned()],
            per_game: MatchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSeriesStats {
    pub games: u16,
    pub ai_wins: u16,
    pub human_wins: u16,
    pub draws: u16,
    pub unfinished: u16,
    pub outcomes: Vec<SeriesOutcome>,
    pub turns: u32,
}

impl MatchSeriesStats {
    pub fn report(&self) -> String {
        format!(
            "games={} ai_wins={} human_wins={} draws={} unfinished={} turns={}",
            self.games, self.ai_wins, self.human_wins, self.draws, self.unfinished, self.turns
        )
    }

    fn record(&mut self, outcome: SeriesOutcome, turns: u32) {
        self.games += 1;
        self.turns += turns;
        match outcome {
            SeriesOutcome::AiWin => self.ai_wins += 1,
            SeriesOutcome::HumanWin => self.human_wins += 1,
            SeriesOutcome::Draw(_) => self.draws += 1,
            SeriesOutcome::Unfinished => self.unfinished += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Play `config.games` games into `store`, starting each from a reset.
pub fn play_match_series(
    store: &mut GameStateStore,
    strategy: &StrategyEngine,
    settings: &TurnSettings,
    config: &MatchSeriesConfig,
) -> Result<MatchSeriesStats, TurnError> {
    let human_engine = StrategyEngine::new();
    let mut stats = MatchSeriesStats::default();

    for game in 0..config.games {
        let seed = config.base_seed ^ u64::from(game).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut rng = StdRng::seed_from_u64(seed);
        let player = config
            .players
            .choose(&mut rng)
            .map_or("player", String::as_str);

        if !store.current_record().entries.is_empty() || !store.current_record().is_open() {
            process_turn(store, strategy, settings, player, RESET_TOKEN)?;
        }

        let (outcome, turns) = play_one_game(
            store,
            strategy,
            &human_engine,
            settings,
            player,
            &mut rng,
            &config.per_game,
        )?;
        debug!(game, player, ?outcome, turns, "simulated game finished");
        stats.record(outcome, turns);
    }

    Ok(stats)
}

fn play_one_game(
    store: &mut GameStateStore,
    strategy: &StrategyEngine,
    human_engine: &StrategyEngine,
    settings: &TurnSettings,
    player: &str,
    rng: &mut StdRng,
    config: &MatchConfig,
) -> Result<(SeriesOutcome, u32), TurnError> {
    let low = config.opening_min_plies.min(config.opening_max_plies);
    let high = config.opening_min_plies.max(config.opening_max_plies);
    let opening_plies = u32::from(rng.random_range(low..=high));

    for turn in 0..u32::from(config.max_turns) {
        let position = store.current().clone();
        let mv = match config.human {
            SimulatedHuman::Strategy(difficulty) if turn >= opening_plies => {
                human_engine.select_move(&position, difficulty)?.mv
            }
            _ => {
                let moves = legal_moves(&position);
                match moves.choose(rng) {
                    Some(mv) => *mv,
                    // The store never leaves an open game without legal moves.
                    None => return Ok((SeriesOutcome::Unfinished, turn)),
                }
            }
        };

        let outcome = process_turn(store, strategy, settings, player, &to_coordinate(&mv))?;
        let TurnOutcome::Played { status, .. } = outcome else {
            continue;
        };
        if status.is_terminal() {
            return Ok((classify(store, settings, status), turn + 1));
        }
    }

    Ok((SeriesOutcome::Unfinished, u32::from(config.max_turns)))
}

fn classify(store: &GameStateStore, settings: &TurnSettings, status: GameStatus) -> SeriesOutcome {
    let record = store.current_record();
    match record.winner() {
        Some(color) if record.player_of(color) == Some(settings.ai_identity.as_str()) => {
            SeriesOutcome::AiWin
        }
        Some(_) => SeriesOutcome::HumanWin,
        None => SeriesOutcome::Draw(status),
    }
}

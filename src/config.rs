//! Runtime configuration, read from `issue_chess.toml`.
//!
//! Every field has a default, so an absent file or an empty one yields a
//! working setup: local heuristics only, state in `game_state.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::engines::engine_trait::SearchLimits;
use crate::engines::strategy::{Difficulty, StrategyEngine};
use crate::engines::uci_delegate::UciDelegate;
use crate::errors::ConfigError;
use crate::turn::{TurnSettings, DEFAULT_AI_IDENTITY};

pub const DEFAULT_CONFIG_PATH: &str = "issue_chess.toml";
pub const DEFAULT_STATE_PATH: &str = "game_state.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub state_path: PathBuf,
    pub ai_identity: String,
    pub difficulty: Difficulty,
    pub delegate: Option<DelegateConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            ai_identity: DEFAULT_AI_IDENTITY.to_owned(),
            difficulty: Difficulty::default(),
            delegate: None,
        }
    }
}

/// External UCI evaluator settings (`[delegate]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelegateConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_movetime_ms")]
    pub movetime_ms: u64,
    #[serde(default = "default_depth")]
    pub depth: Option<u8>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_skill_level")]
    pub skill_level: u8,
    #[serde(default = "default_threads")]
    pub threads: u16,
    #[serde(default = "default_hash_mb")]
    pub hash_mb: u32,
}

fn default_movetime_ms() -> u64 {
    SearchLimits::default().movetime_ms
}

fn default_depth() -> Option<u8> {
    SearchLimits::default().depth
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_skill_level() -> u8 {
    20
}

fn default_threads() -> u16 {
    2
}

fn default_hash_mb() -> u32 {
    128
}

impl DelegateConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            movetime_ms: self.movetime_ms,
            depth: self.depth,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn evaluator(&self) -> UciDelegate {
        UciDelegate::new(self.program.as_str())
            .with_args(self.args.clone())
            .with_skill_level(self.skill_level)
            .with_threads(self.threads)
            .with_hash_mb(self.hash_mb)
    }
}

impl Config {
    /// Read and parse a config file.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })?;
        info!(delegate = config.delegate.is_some(), "config loaded");
        Ok(config)
    }

    /// Like [`Config::from_file`], but a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            ai_identity: self.ai_identity.clone(),
            difficulty: self.difficulty,
        }
    }

    /// The reply strategy, wired to the external evaluator when one is
    /// configured.
    pub fn strategy_engine(&self) -> StrategyEngine {
        match &self.delegate {
            Some(delegate) => {
                StrategyEngine::with_delegate(Box::new(delegate.evaluator()), delegate.limits())
            }
            None => StrategyEngine::new(),
        }
    }
}
